// tests/integration/resources.rs
//! Resource services against a mocked Notion API.

use crate::common::*;
use notion_sdk::api::{
    BlockRequest, BlocksApi, CommentsApi, CreateComment, DatabaseQuery, DatabasesApi, ObjectKind,
    PageQuery, PagesApi, PropertyItem, SearchApi, SearchBuilder, SearchResult, UsersApi,
};
use notion_sdk::{BlockId, CancellationToken, DatabaseId, PageId, RequestExecutor};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_ID: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
const DATABASE_ID: &str = "d9824bdc-8445-4327-be8b-5b47500af6ce";
const BLOCK_ID: &str = "c02fc1d3-db8b-45c5-a222-27595b15aea7";

async fn setup() -> (MockServer, Arc<RequestExecutor>) {
    let server = MockServer::start().await;
    let config = test_config(2)
        .with_base_url(&format!("{}/v1", server.uri()))
        .expect("mock server uri is valid");
    let executor = Arc::new(RequestExecutor::new(config).expect("executor builds"));
    (server, executor)
}

fn page_json(id: &str, title: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "created_time": "2022-03-01T19:05:00.000Z",
        "last_edited_time": "2022-07-06T20:25:00.000Z",
        "parent": {"type": "database_id", "database_id": DATABASE_ID},
        "archived": false,
        "properties": {
            "Name": {"id": "title", "type": "title", "title": [
                {"type": "text", "text": {"content": title}, "plain_text": title}
            ]}
        },
        "url": format!("https://www.notion.so/{}", id.replace('-', ""))
    })
}

fn block_json(id: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "id": id,
        "parent": {"type": "page_id", "page_id": PAGE_ID},
        "created_time": "2022-03-01T19:05:00.000Z",
        "last_edited_time": "2022-03-01T19:05:00.000Z",
        "has_children": false,
        "archived": false,
        "type": "paragraph",
        "paragraph": {"rich_text": [{"type": "text", "text": {"content": text}, "plain_text": text}], "color": "default"}
    })
}

fn list_json(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": results,
        "next_cursor": next_cursor,
        "has_more": next_cursor.is_some()
    })
}

#[tokio::test]
async fn pages_retrieve_and_archive() {
    let (server, executor) = setup().await;
    let pages = PagesApi::new(executor);
    let id = PageId::parse(PAGE_ID).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{}", PAGE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(PAGE_ID, "Tuscan kale")))
        .expect(1)
        .mount(&server)
        .await;

    let mut archived = page_json(PAGE_ID, "Tuscan kale");
    archived["archived"] = json!(true);
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/pages/{}", PAGE_ID)))
        .and(body_json(json!({"archived": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(archived))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let page = pages.retrieve(&id, &cancel).await.unwrap();
    assert_eq!(page.id, id);
    assert_eq!(page.title(), "Tuscan kale");

    let page = pages.archive(&id, &cancel).await.unwrap();
    assert!(page.archived);
}

#[tokio::test]
async fn page_property_uses_cursor_query() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{}/properties/title", PAGE_ID)))
        .and(query_param("start_cursor", "next page"))
        .and(query_param("page_size", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "property_item", "type": "title", "title": {}}],
            "next_cursor": null,
            "has_more": false,
            "type": "property_item"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = PagesApi::new(executor)
        .retrieve_property(
            &PageId::parse(PAGE_ID).unwrap(),
            "title",
            &PageQuery::new().start_cursor("next page").page_size(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(matches!(item, PropertyItem::List(list) if list.results.len() == 1));
}

#[tokio::test]
async fn database_query_all_follows_cursors() {
    let (server, executor) = setup().await;
    let query_path = format!("/v1/databases/{}/query", DATABASE_ID);

    Mock::given(method("POST"))
        .and(path(query_path.clone()))
        .and(body_partial_json(json!({"start_cursor": "cursor-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![page_json("22222222-2222-4222-8222-222222222222", "Second")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(query_path))
        .and(body_json(json!({
            "filter": {"property": "Done", "checkbox": {"equals": false}},
            "page_size": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![page_json("11111111-1111-4111-8111-111111111111", "First")],
            Some("cursor-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let query =
        DatabaseQuery::default().filter(json!({"property": "Done", "checkbox": {"equals": false}}));
    let rows = DatabasesApi::new(executor)
        .query_all(
            &DatabaseId::parse(DATABASE_ID).unwrap(),
            &query,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let titles: Vec<String> = rows.iter().map(|p| p.title()).collect();
    assert_eq!(titles, vec!["First".to_string(), "Second".to_string()]);
}

#[tokio::test]
async fn blocks_children_all_and_append() {
    let (server, executor) = setup().await;
    let blocks = BlocksApi::new(executor);
    let id = BlockId::parse(BLOCK_ID).unwrap();
    let children_path = format!("/v1/blocks/{}/children", BLOCK_ID);

    Mock::given(method("GET"))
        .and(path(children_path.clone()))
        .and(query_param("start_cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![block_json("33333333-3333-4333-8333-333333333333", "two")],
            None,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(children_path.clone()))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![block_json("44444444-4444-4444-8444-444444444444", "one")],
            Some("c2"),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(children_path))
        .and(body_json(json!({"children": [BlockRequest::paragraph("hello")]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![block_json("55555555-5555-4555-8555-555555555555", "hello")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let children = blocks.children_all(&id, &cancel).await.unwrap();
    let texts: Vec<_> = children.iter().filter_map(|b| b.plain_text()).collect();
    assert_eq!(texts, vec!["one".to_string(), "two".to_string()]);

    let appended = blocks
        .append_children(&id, &[BlockRequest::paragraph("hello")], &cancel)
        .await
        .unwrap();
    assert_eq!(appended.results[0].plain_text().as_deref(), Some("hello"));
}

#[tokio::test]
async fn block_delete_returns_archived_block() {
    let (server, executor) = setup().await;
    let mut deleted = block_json(BLOCK_ID, "gone");
    deleted["archived"] = json!(true);

    Mock::given(method("DELETE"))
        .and(path(format!("/v1/blocks/{}", BLOCK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(deleted))
        .expect(1)
        .mount(&server)
        .await;

    let block = BlocksApi::new(executor)
        .delete(&BlockId::parse(BLOCK_ID).unwrap(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(block.archived);
}

#[tokio::test]
async fn search_with_builder() {
    let (server, executor) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_json(json!({
            "query": "kale",
            "filter": {"value": "page", "property": "object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![page_json(PAGE_ID, "Tuscan kale")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let request = SearchBuilder::new()
        .query("kale")
        .filter_object(ObjectKind::Page)
        .build();
    let results = SearchApi::new(executor)
        .search(&request, &CancellationToken::new())
        .await
        .unwrap();

    match &results.results[0] {
        SearchResult::Page(page) => assert_eq!(page.title(), "Tuscan kale"),
        other => panic!("expected a page, got {:?}", other),
    }
}

#[tokio::test]
async fn users_me_and_list() {
    let (server, executor) = setup().await;
    let users = UsersApi::new(executor);

    Mock::given(method("GET"))
        .and(path("/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "user",
            "id": "ee5f0f84-409a-440f-983a-a5315961c6e4",
            "type": "bot",
            "name": "Integration",
            "bot": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![json!({"object": "user", "id": "6794760a-1f15-45cd-9c65-0dfe42f5135a", "type": "person", "name": "Aman"})],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let me = users.me(&cancel).await.unwrap();
    assert_eq!(me.kind.as_deref(), Some("bot"));

    let everyone = users.list(&PageQuery::new(), &cancel).await.unwrap();
    assert_eq!(everyone.results[0].name.as_deref(), Some("Aman"));
}

#[tokio::test]
async fn comments_list_and_create() {
    let (server, executor) = setup().await;
    let comments = CommentsApi::new(executor);

    let comment = json!({
        "object": "comment",
        "id": "94cc56ab-9f02-409d-9f99-1037e9fe502f",
        "parent": {"type": "page_id", "page_id": PAGE_ID},
        "discussion_id": "f1407351-36f5-4c49-a13c-49f8ba11776d",
        "created_time": "2022-07-15T16:52:00.000Z",
        "last_edited_time": "2022-07-15T19:16:00.000Z",
        "created_by": {"object": "user", "id": "9b15170a-9941-4297-8ee6-83fa7649a87a"},
        "rich_text": [{"type": "text", "text": {"content": "Single comment"}, "plain_text": "Single comment"}]
    });

    Mock::given(method("GET"))
        .and(path("/v1/comments"))
        .and(query_param("block_id", PAGE_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![comment.clone()], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/comments"))
        .and(body_partial_json(json!({"parent": {"page_id": PAGE_ID}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let listed = comments
        .list(&BlockId::parse(PAGE_ID).unwrap(), &PageQuery::new(), &cancel)
        .await
        .unwrap();
    assert_eq!(listed.results.len(), 1);

    let created = comments
        .create(
            &CreateComment::on_page(PageId::parse(PAGE_ID).unwrap(), "Single comment"),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(created.rich_text[0].as_plain_text(), "Single comment");
}

#[tokio::test]
async fn not_found_surfaces_as_classified_error() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/databases/{}", DATABASE_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find database"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = DatabasesApi::new(executor)
        .retrieve(&DatabaseId::parse(DATABASE_ID).unwrap(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.disposition(), notion_sdk::Disposition::FixInput);
}
