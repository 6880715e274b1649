use crate::models::Command;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command: Command,
    pub status: String,
}

impl CommandResponse {
    pub fn queued(command: Command) -> Self {
        Self {
            command,
            status: "queued".to_string(),
        }
    }
}
