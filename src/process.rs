use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::task::spawn_blocking;

use crate::export::write_csv;
use crate::log::RunLog;
use crate::parse::{extract, FacilityRecord, PageResult};
use crate::request::{Fetcher, HttpTransport, Sleep, TokioSleep, Transport};
use crate::{info_time, log_error, log_info, Error, Result, Settings};

/// Every record of one run, in page-then-container order.
#[derive(Debug, Default)]
pub struct ResultSet {
    pub records: Vec<FacilityRecord>,
    /// Pages fetched successfully, the first one included.
    pub pages: usize,
}

/// Where a run ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The first page couldn't be fetched; nothing was written.
    Aborted,
    /// No facility on any page; nothing was written.
    ExportSkipped,
    /// Records were scraped but the file couldn't be written.
    ExportFailed,
    Exported {
        records: usize,
        pages: usize,
        path: PathBuf,
    },
}

/// Drives fetch -> extract -> follow next link, one page at a time.
pub struct Pipeline<T = HttpTransport, S = TokioSleep> {
    settings: Settings,
    fetcher: Fetcher<T, S>,
    log: Arc<RunLog>,
}

impl Pipeline {
    pub fn from_settings(settings: Settings, log: Arc<RunLog>) -> Result<Self> {
        let fetcher = Fetcher::from_settings(&settings, log.clone())?;
        Ok(Self::new(settings, fetcher, log))
    }
}

impl<T: Transport, S: Sleep> Pipeline<T, S> {
    pub fn new(settings: Settings, fetcher: Fetcher<T, S>, log: Arc<RunLog>) -> Self {
        Self {
            settings,
            fetcher,
            log,
        }
    }

    /// Full run: scrape, clean, export. Never fails; the outcome is logged and returned.
    pub async fn process_site(&self) -> RunOutcome {
        let start_time = Local::now();

        let mut result_set = match self.run().await {
            Ok(result_set) => result_set,
            Err(e) => {
                log_error!(self.log, "Failed to retrieve search results: {e}");
                return RunOutcome::Aborted;
            }
        };

        clean(&mut result_set.records);

        let path = &self.settings.output_path;
        match write_csv(&result_set.records, path).await {
            Ok(()) => {
                log_info!(
                    self.log,
                    "Success! Scraped {} facilities across {} pages",
                    result_set.records.len(),
                    result_set.pages
                );
                info_time!(self.log, start_time, "Data saved to {}", path.display());
                RunOutcome::Exported {
                    records: result_set.records.len(),
                    pages: result_set.pages,
                    path: path.clone(),
                }
            }
            Err(Error::EmptyResult) => {
                log_error!(self.log, "No facilities found!");
                RunOutcome::ExportSkipped
            }
            Err(e) => {
                log_error!(self.log, "Couldn't write {}: {e}", path.display());
                RunOutcome::ExportFailed
            }
        }
    }

    /// Scrapes every page. Only a failure on the first page is an `Err`;
    /// a later failure ends pagination and keeps what was gathered.
    pub async fn run(&self) -> Result<ResultSet> {
        let s = &self.settings;
        log_info!(
            self.log,
            "Searching for {} recycling centers near {} within {} miles...",
            s.material,
            s.zipcode,
            s.radius
        );

        let html = self.fetcher.fetch(&s.search_url()).await?;
        log_info!(self.log, "Successfully retrieved first page");
        let first = self.parse_page(html).await?;

        let mut result_set = ResultSet {
            records: first.records,
            pages: 1,
        };
        let mut next_page_url = first.next_page_url;

        while result_set.pages < s.max_pages {
            let Some(url) = next_page_url.take() else {
                log_info!(self.log, "No more pages available");
                break;
            };
            let page_num = result_set.pages + 1;
            log_info!(self.log, "Getting page {page_num}: {url}");

            // Be nice to their server.
            self.fetcher.sleeper().sleep(s.page_delay).await;

            let page = match self.fetch_and_parse(&url).await {
                Ok(page) => page,
                Err(e) => {
                    log_error!(self.log, "Error retrieving page {page_num}: {e}");
                    break;
                }
            };
            result_set.pages = page_num;
            result_set.records.extend(page.records);
            next_page_url = page.next_page_url;

            log_info!(
                self.log,
                "Retrieved page {page_num}, now have {} total facilities",
                result_set.records.len()
            );
        }

        if next_page_url.is_some() {
            log_info!(self.log, "Reached the limit of {} pages", s.max_pages);
        }

        Ok(result_set)
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<PageResult> {
        let html = self.fetcher.fetch(url).await?;
        self.parse_page(html).await
    }

    /// Parsing runs on the blocking pool; the `scraper` DOM never crosses an await.
    async fn parse_page(&self, html: String) -> Result<PageResult> {
        let origin = self.settings.origin.clone();
        let log = self.log.clone();
        let page = spawn_blocking(move || extract(&html, &origin, &log)).await?;
        Ok(page)
    }
}

/// One cleaning pass over every text field of every record.
pub fn clean(records: &mut [FacilityRecord]) {
    records.iter_mut().for_each(FacilityRecord::clean);
}
