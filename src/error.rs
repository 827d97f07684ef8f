use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No access token configured. Set DENUE_TOKEN or the `token` field of the config file.")]
    ConfigMissingToken,
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    #[error("Couldn't read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: Box<Error>,
    },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Xlsx Error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
