//! Relays documents stored in Azure Blob Storage to a Form Recognizer
//! custom model.
//!
//! Every request carries its own storage and analysis credentials in headers.
//! The relay fetches the named blob, submits it for analysis when its content
//! type is supported and answers with a short status summary in which the
//! storage key is redacted.

pub mod analysis;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod relay;
pub mod startup;
pub mod storage;
pub mod telemetry;
