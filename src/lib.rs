pub mod api;
pub mod config;
pub mod loader;
pub mod models;
pub mod parser;
pub mod source;
pub mod watcher;
