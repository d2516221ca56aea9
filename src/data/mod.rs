pub mod files;
pub mod models;
pub mod probe;
pub mod resolver;
