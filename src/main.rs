// src/main.rs

mod cli;

use crate::cli::{id_or_default, Command, CommandLineInput};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_sdk::api::{
    BlockRequest, BlocksApi, CommentsApi, DatabaseQuery, DatabasesApi, PageQuery, PagesApi,
    SearchApi, SearchBuilder, UsersApi,
};
use notion_sdk::{
    AppError, BlockId, CancellationToken, ClientConfig, ClientError, DatabaseId, PageId,
    RequestExecutor,
};
use serde::Serialize;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_cli.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // Logs go to stderr; stdout carries the JSON output.
    let stderr_appender = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{}", text);
    Ok(())
}

/// Runs one command against the API, printing its result.
async fn run(
    command: &Command,
    executor: Arc<RequestExecutor>,
    defaults: Option<&notion_sdk::ConfigFile>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let default_page = defaults.and_then(|f| f.page_id.as_deref());
    let default_database = defaults.and_then(|f| f.database_id.as_deref());

    match command {
        Command::Page { id } => {
            let id = PageId::parse(&id_or_default(id.as_deref(), default_page, "page id")?)?;
            let page = PagesApi::new(executor).retrieve(&id, cancel).await?;
            log::info!("Retrieved page '{}'", page.title());
            print_json(&page)
        }
        Command::Database { id } => {
            let id = DatabaseId::parse(&id_or_default(
                id.as_deref(),
                default_database,
                "database id",
            )?)?;
            let database = DatabasesApi::new(executor).retrieve(&id, cancel).await?;
            log::info!("Retrieved database '{}'", database.title_text());
            print_json(&database)
        }
        Command::Query { id, all } => {
            let id = DatabaseId::parse(&id_or_default(
                id.as_deref(),
                default_database,
                "database id",
            )?)?;
            let databases = DatabasesApi::new(executor);
            let query = DatabaseQuery::default();
            if *all {
                let rows = databases.query_all(&id, &query, cancel).await?;
                log::info!("Fetched {} rows", rows.len());
                print_json(&rows)
            } else {
                print_json(&databases.query(&id, &query, cancel).await?)
            }
        }
        Command::Children { id, all } => {
            let id = BlockId::parse(id)?;
            let blocks = BlocksApi::new(executor);
            if *all {
                print_json(&blocks.children_all(&id, cancel).await?)
            } else {
                print_json(&blocks.children(&id, &PageQuery::new(), cancel).await?)
            }
        }
        Command::Search { query, object } => {
            let mut builder = SearchBuilder::new();
            if let Some(query) = query {
                builder = builder.query(query.clone());
            }
            if let Some(object) = object {
                builder = builder.filter_object((*object).into());
            }
            let results = SearchApi::new(executor)
                .search(&builder.build(), cancel)
                .await?;
            let rendered: Vec<serde_json::Value> = results
                .results
                .iter()
                .map(|hit| match hit {
                    notion_sdk::api::SearchResult::Page(page) => {
                        serde_json::json!({"object": "page", "id": page.id, "title": page.title(), "url": page.url})
                    }
                    notion_sdk::api::SearchResult::Database(db) => {
                        serde_json::json!({"object": "database", "id": db.id, "title": db.title_text(), "url": db.url})
                    }
                })
                .collect();
            print_json(&rendered)
        }
        Command::Me => print_json(&UsersApi::new(executor).me(cancel).await?),
        Command::Users => print_json(&UsersApi::new(executor).list(&PageQuery::new(), cancel).await?),
        Command::Comments { id } => {
            let id = BlockId::parse(id)?;
            print_json(
                &CommentsApi::new(executor)
                    .list(&id, &PageQuery::new(), cancel)
                    .await?,
            )
        }
        Command::Append { id, text } => {
            let id = BlockId::parse(id)?;
            let appended = BlocksApi::new(executor)
                .append_children(&id, &[BlockRequest::paragraph(text)], cancel)
                .await?;
            print_json(&appended)
        }
    }
}

/// Prints a failure with its HTTP-equivalent status.
fn report_failure(err: &anyhow::Error) {
    let client_error = err.downcast_ref::<ClientError>().or_else(|| {
        err.downcast_ref::<AppError>().and_then(|app| match app {
            AppError::Client(inner) => Some(inner),
            _ => None,
        })
    });

    match client_error {
        Some(client_error) => {
            eprintln!(
                "Error [{}] ({:?}): {}",
                client_error.http_equivalent_status().as_u16(),
                client_error.disposition(),
                client_error
            );
            if let ClientError::Api {
                request_id: Some(request_id),
                ..
            } = client_error
            {
                eprintln!("Request ID: {}", request_id);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}

async fn execute(cli: CommandLineInput) -> anyhow::Result<()> {
    let (config, file): (ClientConfig, _) = cli.resolve()?;
    log::debug!(
        "Using {} (version {}), up to {} attempts per call",
        config.base_url,
        config.api_version,
        config.backoff.max_attempts()
    );
    let executor = Arc::new(RequestExecutor::new(config)?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; canceling the in-flight request");
            on_interrupt.cancel();
        }
    });

    run(&cli.command, executor, file.as_ref(), &cancel).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CommandLineInput::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
