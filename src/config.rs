//! Run configuration.
//!
//! Every knob of a harvest lives in [`Config`]. Defaults match the public DENUE
//! endpoint and the strategic-industry sweep this tool was written for; a JSON
//! file named by `DENUE_CONFIG` may override any subset of fields, and
//! `DENUE_TOKEN` overrides the access token.

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "DENUE_CONFIG";
pub const TOKEN_ENV: &str = "DENUE_TOKEN";

pub const DEFAULT_BASE_URL: &str =
    "https://www.inegi.org.mx/app/api/denue/v1/consulta/BuscarAreaActEstr";
/// "0" selects every municipality of a region.
pub const ALL_MUNICIPALITIES: &str = "0";
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 2;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_EMPTY_PAGES: usize = 2;
/// Brackets 6 and 7 cover establishments with more than 100 employees.
pub const DEFAULT_BRACKETS: [&str; 2] = ["6", "7"];
pub const DEFAULT_KEYWORDS: [&str; 5] = [
    "farmacéutica",
    "laboratorio",
    "manufactura",
    "fábrica",
    "transformación",
];
pub const REGION_COUNT: u8 = 32;

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub token: String,
    pub base_url: String,
    pub municipality: String,
    pub page_size: usize,
    pub request_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub max_empty_pages: usize,
    pub brackets: Vec<String>,
    pub keywords: Vec<String>,
    pub regions: Vec<String>,
    pub output: OutputPaths,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
    pub json: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            municipality: ALL_MUNICIPALITIES.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_delay_secs: DEFAULT_REQUEST_DELAY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_empty_pages: DEFAULT_MAX_EMPTY_PAGES,
            brackets: DEFAULT_BRACKETS.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            regions: all_regions(),
            output: OutputPaths::default(),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        OutputPaths::with_stem("pymes_giros_estrategicos")
    }
}

impl OutputPaths {
    /// `stem` plus the `.csv`, `.xlsx` and `.json` extensions.
    pub fn with_stem(stem: impl AsRef<Path>) -> Self {
        let stem = stem.as_ref();
        OutputPaths {
            csv: stem.with_extension("csv"),
            xlsx: stem.with_extension("xlsx"),
            json: stem.with_extension("json"),
        }
    }
}

/// Two-digit region codes "01" through "32".
pub fn all_regions() -> Vec<String> {
    (1..=REGION_COUNT).map(|i| format!("{i:02}")).collect()
}

impl Config {
    /// Reads the config file named by `DENUE_CONFIG` (defaults otherwise),
    /// applies `DENUE_TOKEN` and validates the result.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        if let Ok(token) = env::var(TOKEN_ENV) {
            config.token = token;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        File::open(path)
            .map_err(Error::from)
            .and_then(|file| Config::from_reader(BufReader::new(file)))
            .map_err(|e| Error::ConfigFile {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::ConfigMissingToken);
        }
        if self.page_size == 0 {
            return Err(Error::ConfigInvalid("page_size must be at least 1".into()));
        }
        if self.max_empty_pages == 0 {
            return Err(Error::ConfigInvalid(
                "max_empty_pages must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// The token is a credential, keep it out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("municipality", &self.municipality)
            .field("page_size", &self.page_size)
            .field("request_delay_secs", &self.request_delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_empty_pages", &self.max_empty_pages)
            .field("brackets", &self.brackets)
            .field("keywords", &self.keywords)
            .field("regions", &self.regions)
            .field("output", &self.output)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_region() {
        let config = Config::default();
        assert_eq!(config.regions.len(), 32);
        assert_eq!(config.regions.first().map(String::as_str), Some("01"));
        assert_eq!(config.regions.last().map(String::as_str), Some("32"));
        assert_eq!(config.brackets, vec!["6", "7"]);
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.request_delay(), Duration::from_secs(2));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.output.xlsx,
            PathBuf::from("pymes_giros_estrategicos.xlsx")
        );
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let json = r#"{
            "token": "abc",
            "page_size": 50,
            "regions": ["09"],
            "output": { "csv": "out/data.csv" }
        }"#;
        let config = Config::from_reader(json.as_bytes()).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.regions, vec!["09"]);
        assert_eq!(config.max_empty_pages, DEFAULT_MAX_EMPTY_PAGES);
        assert_eq!(config.output.csv, PathBuf::from("out/data.csv"));
        assert_eq!(
            config.output.json,
            PathBuf::from("pymes_giros_estrategicos.json")
        );
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{ "tokn": "abc" }"#;
        assert!(matches!(
            Config::from_reader(json.as_bytes()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn validation_catches_unusable_values() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(Error::ConfigMissingToken)));

        config.token = "secret".into();
        config.page_size = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid(_))));

        config.page_size = 10;
        config.max_empty_pages = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid(_))));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = Config::from_path("definitely/not/here.json").unwrap_err();
        match err {
            Error::ConfigFile { path, .. } => {
                assert_eq!(path, PathBuf::from("definitely/not/here.json"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn debug_output_hides_token() {
        let config = Config {
            token: "b0bad450-secret".into(),
            ..Config::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("b0bad450"));
        assert!(shown.contains("<redacted>"));
    }
}
