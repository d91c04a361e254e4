pub mod canvas;
pub mod config;
pub mod error;
pub mod models;
pub mod parse;
pub mod registry;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
