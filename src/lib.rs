// Public API for integration tests and potential library usage

pub mod api;
pub mod bank;
pub mod config;
pub mod error;
pub mod protocol;
pub mod run;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;
