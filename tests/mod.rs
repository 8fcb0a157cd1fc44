// tests/mod.rs
//! Test suite organization for notion-sdk
//!
//! Unit tests drive the executor through a scripted in-process transport;
//! integration tests go over real HTTP against a wiremock server.


#[cfg(test)]
pub mod unit;

#[cfg(test)]
pub mod integration;
