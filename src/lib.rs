pub mod api;
pub mod config;
pub mod errors;
pub mod gamelist;
pub mod recipe;

pub use api::{build_recipes, ResepError};
pub use gamelist::GameEntry;
