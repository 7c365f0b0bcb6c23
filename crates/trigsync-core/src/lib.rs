pub mod catalog;
pub mod config;
pub mod dependency;
pub mod error;
pub mod flow;
pub mod io;
pub mod paths;
pub mod prompt;
pub mod provision;
pub mod reconcile;
pub mod selection;
pub mod state;

pub use error::{Result, TriggerError};
