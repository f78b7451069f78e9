//! Minimal DOM capability the extractor needs, so it isn't welded to one parser.

use scraper::{ElementRef, Selector};

use crate::{Error, Result};

/// A node of a parsed HTML document (the document root or any element in it).
pub trait HtmlDocument: Sized {
    /// Every descendant matching a CSS selector, in document order.
    fn find_all(&self, pattern: &str) -> Result<Vec<Self>>;

    /// First descendant matching a CSS selector.
    fn select_one(&self, selector: &str) -> Result<Option<Self>> {
        Ok(self.find_all(selector)?.into_iter().next())
    }

    fn attribute(&self, name: &str) -> Option<String>;

    /// All descendant text, concatenated, untrimmed.
    fn text(&self) -> String;
}

impl HtmlDocument for ElementRef<'_> {
    fn find_all(&self, pattern: &str) -> Result<Vec<Self>> {
        let selector = create_selector(pattern)?;
        Ok(self.select(&selector).collect())
    }

    fn select_one(&self, selector: &str) -> Result<Option<Self>> {
        let selector = create_selector(selector)?;
        Ok(self.select(&selector).next())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_owned)
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}
