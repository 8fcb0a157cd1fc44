// tests/integration/mod.rs
//! Round trips through `ReqwestTransport` against a local wiremock server.


#[cfg(test)]
mod resources;
