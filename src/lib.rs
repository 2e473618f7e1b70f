//! Component catalog: an in-memory store of UI snippets served over a small
//! REST API, plus the client-side gallery and upload flows that talk to it.

pub mod api;
pub mod client;
pub mod config;
pub mod events;
pub mod gallery;
pub mod models;
pub mod storage;
pub mod submission;
pub mod user_models;
pub mod user_storage;
pub mod validation;
