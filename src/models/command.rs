use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction for the plug actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    On,
    Off,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::On => "ON",
            Command::Off => "OFF",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ON" => Ok(Command::On),
            "OFF" => Ok(Command::Off),
            other => Err(AppError::InvalidInput(format!(
                "unknown command '{}', expected ON or OFF",
                other
            ))),
        }
    }
}

/// Row inserted into the commands table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: Command,
}

impl From<Command> for CommandRecord {
    fn from(command: Command) -> Self {
        Self { command }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_uppercase() {
        let json = serde_json::to_string(&CommandRecord::from(Command::On)).unwrap();
        assert_eq!(json, r#"{"command":"ON"}"#);

        let json = serde_json::to_string(&CommandRecord::from(Command::Off)).unwrap();
        assert_eq!(json, r#"{"command":"OFF"}"#);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("on".parse::<Command>().unwrap(), Command::On);
        assert_eq!(" Off ".parse::<Command>().unwrap(), Command::Off);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "toggle".parse::<Command>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_lowercase_json_is_rejected() {
        assert!(serde_json::from_str::<CommandRecord>(r#"{"command":"on"}"#).is_err());
    }
}
