//! EARTH911 FACILITY SCRAPER
//! Walks the paginated search results for one material/zipcode query,
//! extracts every facility listing and writes a cleaned CSV.

mod error;
pub mod export;
pub mod html;
pub mod log;
mod macros;
pub mod parse;
pub mod process;
pub mod request;

pub use error::{Error, Result};

use std::path::PathBuf;
use std::time::Duration;

const ORIGIN: &str = "https://search.earth911.com";
const MATERIAL: &str = "Electronics";
const ZIPCODE: &str = "10001";
const RADIUS: &str = "100";

const MAX_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const PAGE_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Safety limit, counts the first page.
const MAX_PAGES: usize = 20;

pub const OUTPUT_PATH: &str = "earth911_data_clean.csv";
pub const LOG_PATH: &str = "earth911_scraper.log";

/// Sentinel for a field that couldn't be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Every knob of a run. `Default` is the only configuration the binary uses.
#[derive(Debug, Clone)]
pub struct Settings {
    pub origin: String,
    pub material: String,
    pub zipcode: String,
    pub radius: String,
    pub max_attempts: usize,
    pub retry_delay: Duration,
    pub page_delay: Duration,
    pub request_timeout: Duration,
    pub max_pages: usize,
    pub output_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: ORIGIN.into(),
            material: MATERIAL.into(),
            zipcode: ZIPCODE.into(),
            radius: RADIUS.into(),
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            page_delay: PAGE_DELAY,
            request_timeout: REQUEST_TIMEOUT,
            max_pages: MAX_PAGES,
            output_path: PathBuf::from(OUTPUT_PATH),
        }
    }
}

impl Settings {
    /// `{origin}/?what={material}&where={zipcode}&radius={radius}`
    pub fn search_url(&self) -> String {
        format!(
            "{}/?what={}&where={}&radius={}",
            self.origin, self.material, self.zipcode, self.radius
        )
    }
}
