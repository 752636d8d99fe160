#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Boards, lists and tasks owned by users, served over HTTP with signed,"]
#![doc = "self-rotating session cookies. The binary (`main.rs`) loads configuration,"]
#![doc = "picks a store and mounts `routes::config`; integration tests build the same"]
#![doc = "app over `store::MemoryStore`."]

pub mod auth;
pub mod bootstrap;
pub mod cascade;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
