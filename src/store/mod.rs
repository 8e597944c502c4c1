pub mod history;
pub mod kv;
pub mod schema;
