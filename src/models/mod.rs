pub mod command;
pub mod reading;

pub use command::{Command, CommandRecord};
pub use reading::Reading;
