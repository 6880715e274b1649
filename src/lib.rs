pub mod api;
pub mod config;
pub mod energy;
pub mod error;
pub mod models;
pub mod poller;
pub mod render;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
