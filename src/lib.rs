pub mod charts;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metro;
pub mod output;
pub mod publish;
pub mod router;
pub mod series;
pub mod source;
pub mod store;

pub use error::{Error, Result};
