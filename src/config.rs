// src/config.rs
use anyhow::{Context, Result};
use chrono::Datelike;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::process::columns::ColumnRules;

pub const DEFAULT_REPORT_BASE: &str =
    "https://www.chittorgarh.com/report/ipo-performance-report-listing-current-gain/125/all/";
pub const DEFAULT_PRICE_API_BASE: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_OUTPUT_PATH: &str = "data_processed/ipo_tracker_cleaned.csv";
pub const DEFAULT_SETTLE_SECS: u64 = 10;
pub const DEFAULT_PRICE_LOOKUP_LIMIT: usize = 10;
pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".NS";

/// Everything the pipeline would otherwise hard-code.
///
/// The binary always runs with `Config::default()`; tests and library users
/// build their own (or load one with [`Config::from_yaml_str`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report page, without the `year` query parameter.
    pub report_base_url: String,
    /// Listing year requested from the report. Defaults to the current year.
    pub report_year: i32,
    /// Flat wait after navigation so client-side rendering can finish.
    pub settle_secs: u64,
    pub output_path: PathBuf,
    /// How many ticker rows get a live price lookup.
    pub price_lookup_limit: usize,
    pub exchange_suffix: String,
    pub price_api_base: String,
    pub browser: BrowserProfile,
    pub columns: ColumnRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_base_url: DEFAULT_REPORT_BASE.to_string(),
            report_year: chrono::Local::now().year(),
            settle_secs: DEFAULT_SETTLE_SECS,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            price_lookup_limit: DEFAULT_PRICE_LOOKUP_LIMIT,
            exchange_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
            price_api_base: DEFAULT_PRICE_API_BASE.to_string(),
            browser: BrowserProfile::default(),
            columns: ColumnRules::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("parsing pipeline config YAML")
    }

    /// Report URL with `?year=<report_year>` applied.
    pub fn report_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.report_base_url)
            .with_context(|| format!("invalid report URL {}", self.report_base_url))?;
        url.query_pairs_mut()
            .append_pair("year", &self.report_year.to_string());
        Ok(url)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

/// How the headless browser presents itself to the report site.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserProfile {
    pub headless: bool,
    pub user_agent: String,
    pub languages: Vec<String>,
    pub platform: String,
    /// Extra Chrome command-line switches.
    pub args: Vec<String>,
    /// Switches Chrome would get by default that must not be passed.
    pub suppressed_default_args: Vec<String>,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            platform: "Win32".to_string(),
            args: vec![
                "--disable-gpu".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
            ],
            suppressed_default_args: vec!["--enable-automation".to_string()],
        }
    }
}

impl BrowserProfile {
    /// `Accept-Language` value built from `languages`, e.g. `en-US,en`.
    pub fn accept_language(&self) -> String {
        self.languages.join(",")
    }
}
