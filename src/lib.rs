pub mod config;
pub mod error;
pub mod model;
pub mod persist;
pub mod schema;
pub mod session;
pub mod types;
pub mod validate;
pub mod wasm;
