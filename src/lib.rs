pub mod audit;
pub mod config;
pub mod discord;
pub mod error;
pub mod logging;
pub mod presence;
pub mod state;

pub use error::{GuildLoggerError, Result};
