pub mod commands;
pub mod dashboard;
pub mod health;
pub mod readings;
