use scraper::Html;
use serde::Serialize;

use crate::html::HtmlDocument;
use crate::log::RunLog;
use crate::{log_error, log_info, log_warn, Result, NOT_AVAILABLE};

const RESULT_ITEM: &str = "li.result-item";
const TITLE_LINK: &str = "h2.title a";
const CONTACT_LINES: &str = "div.contact p";
const MATERIALS_BLOCK: &str = "p.result-materials";
const MATERIAL_TAG: &str = "span.material";
const NEXT_LINK: &str = "a.next";

/// One facility listing. Column names and order are the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityRecord {
    #[serde(rename = "Business Name")]
    pub business_name: String,
    /// Never populated: the results markup carries no update date we know of.
    #[serde(rename = "Last Updated")]
    pub last_updated: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Materials Accepted")]
    pub materials_accepted: String,
}

impl FacilityRecord {
    /// Strips the mangled BOM and surrounding whitespace from every field.
    pub fn clean(&mut self) {
        for field in [
            &mut self.business_name,
            &mut self.last_updated,
            &mut self.address,
            &mut self.materials_accepted,
        ] {
            *field = clean_text(field);
        }
    }
}

/// Everything one results page yields.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<FacilityRecord>,
    /// Absolute; `None` means this was the last page.
    pub next_page_url: Option<String>,
}

/// Parses a results page. `origin` is prefixed to the relative next-page href.
pub fn extract(html: &str, origin: &str, log: &RunLog) -> PageResult {
    let doc = Html::parse_document(html);
    extract_from(&doc.root_element(), origin, log)
}

/// Same as `extract`, over any `HtmlDocument`.
/// A container that fails to extract is logged and skipped; its siblings are unaffected.
pub fn extract_from<D: HtmlDocument>(doc: &D, origin: &str, log: &RunLog) -> PageResult {
    let containers = match doc.find_all(RESULT_ITEM) {
        Ok(containers) => containers,
        Err(e) => {
            log_error!(log, "Error locating result items: {e}");
            Vec::new()
        }
    };
    log_info!(log, "Found {} result items", containers.len());

    let mut records = Vec::with_capacity(containers.len());
    for container in &containers {
        match extract_facility(container) {
            Ok(record) => {
                log_info!(log, "Added facility: {}", record.business_name);
                records.push(record);
            }
            Err(e) => log_error!(log, "Error extracting facility data: {e}"),
        }
    }

    PageResult {
        records,
        next_page_url: next_page_url(doc, origin, log),
    }
}

fn extract_facility<D: HtmlDocument>(container: &D) -> Result<FacilityRecord> {
    let business_name = container
        .select_one(TITLE_LINK)?
        .map(|a| a.text().trim().to_owned())
        .unwrap_or_else(|| NOT_AVAILABLE.into());

    let address_parts = non_empty_texts(container.find_all(CONTACT_LINES)?);

    let material_parts = match container.select_one(MATERIALS_BLOCK)? {
        Some(block) => non_empty_texts(block.find_all(MATERIAL_TAG)?)
            .into_iter()
            .filter(|m| !is_show_more(m))
            .collect(),
        None => Vec::new(),
    };

    Ok(FacilityRecord {
        business_name,
        last_updated: NOT_AVAILABLE.into(),
        address: join_or_sentinel(&address_parts),
        materials_accepted: join_or_sentinel(&material_parts),
    })
}

fn next_page_url<D: HtmlDocument>(doc: &D, origin: &str, log: &RunLog) -> Option<String> {
    let anchor = match doc.select_one(NEXT_LINK) {
        Ok(anchor) => anchor?,
        Err(e) => {
            log_error!(log, "Error locating next page link: {e}");
            return None;
        }
    };
    match anchor.attribute("href") {
        Some(href) => Some(format!("{origin}{href}")),
        None => {
            log_warn!(log, "Next page link has no href, treating as last page");
            None
        }
    }
}

fn non_empty_texts<D: HtmlDocument>(nodes: Vec<D>) -> Vec<String> {
    nodes
        .iter()
        .map(|n| n.text().trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

/// The "show more" toggle is rendered as a material tag.
#[inline]
fn is_show_more(text: &str) -> bool {
    text.to_lowercase().contains("more")
}

fn join_or_sentinel(parts: &[String]) -> String {
    if parts.is_empty() {
        NOT_AVAILABLE.into()
    } else {
        parts.join(", ")
    }
}

/// UTF-8 BOM bytes decoded as Latin-1.
const MANGLED_BOM: &str = "\u{EF}\u{BB}\u{BF}";
const BOM: char = '\u{FEFF}';

/// Removes BOM artifacts and trims. Idempotent: removal runs until nothing is left to remove,
/// so pieces that only line up after a removal are caught too.
pub fn clean_text(value: &str) -> String {
    let mut cleaned = value.replace(BOM, "");
    while cleaned.contains(MANGLED_BOM) {
        cleaned = cleaned.replace(MANGLED_BOM, "");
    }
    cleaned.trim().to_owned()
}
