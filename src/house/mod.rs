// Public API - what other modules can use
pub use handlers::{create_house, delete_house, get_house, search_houses, update_house};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
