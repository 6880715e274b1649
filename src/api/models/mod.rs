pub mod commands;
pub mod readings;

pub use commands::{CommandRequest, CommandResponse};
pub use readings::{ReadingsQuery, SentQuery};
