//! DENUE REGISTRY HARVESTER
//! Sweeps INEGI's establishment directory by region and size bracket, keeps
//! the industries of interest and accumulates them in CSV, XLSX and JSON.

pub mod config;
mod error;
pub mod export;
pub mod filter;
pub mod logger;
mod macros;
pub mod merge;
pub mod paginate;
pub mod process;
mod record;
pub mod request;

pub use config::{Config, OutputPaths};
pub use error::{Error, Result};
pub use record::{Dataset, Record, ID_FIELD, INDUSTRY_CLASS_FIELD};
