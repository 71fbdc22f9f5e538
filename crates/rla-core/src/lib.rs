pub mod command;
pub mod config;
pub mod github;

pub use command::*;
pub use config::*;
pub use github::*;
