// couchctl-api: Typed client for the hosted database admin API
// Depends only on couchctl-core.

pub mod auth;
pub mod client;
pub mod pool;
pub mod schema;

pub use auth::Credentials;
pub use client::ApiClient;
