//! Core translation engine module

pub mod client;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exclusion;
pub mod models;
pub mod prompts;
pub mod text;
pub mod tokens;
