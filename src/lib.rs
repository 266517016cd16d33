// Library exports for Scrawl
// This allows integration tests and external code to use Scrawl modules

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod store;
pub mod tags;
pub mod validate;
