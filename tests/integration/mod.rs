//! Integration tests for the form analysis relay.

pub mod common;
pub mod server_test;
