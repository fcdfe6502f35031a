pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod models;
pub mod views;
pub mod vote;

pub use api::{ApiClient, IdeaApi};
pub use board::Board;
pub use error::ClientError;
