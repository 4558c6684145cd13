pub mod api;
pub mod attendance;
pub mod auth;
pub mod backend;
pub mod config;
pub mod docs;
pub mod error;
pub mod model;
pub mod models;
pub mod routes;
pub mod utils;
