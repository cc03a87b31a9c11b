use log::{debug, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::transport::HttpTransport;

/// Content area lookups, tried in order.
const CONTENT_SELECTORS: [&str; 2] = ["#mw-content-text", ".rt-commentedText.nowrap"];
const PARAGRAPH_SELECTOR: &str = "p";

/// Placeholder the API uses for leaders without a last name.
const NO_LAST_NAME: &str = "None";

/// Names a paragraph has to mention to count as the biography intro.
#[derive(Debug, Clone, Copy)]
pub struct NameQuery<'a> {
    first: &'a str,
    last: Option<&'a str>,
}

impl<'a> NameQuery<'a> {
    pub fn new(first: &'a str, last: Option<&'a str>) -> Self {
        let last = last.filter(|l| !l.is_empty() && *l != NO_LAST_NAME);
        NameQuery { first, last }
    }

    /// Plain case-sensitive substring checks.
    pub fn matches(&self, text: &str) -> bool {
        match self.last {
            Some(last) => text.contains(self.first) && text.contains(last),
            None => text.contains(self.first),
        }
    }
}

pub struct ParagraphExtractor {
    citation_regex: Regex,
}

impl Default for ParagraphExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ParagraphExtractor {
    pub fn new() -> Self {
        ParagraphExtractor {
            citation_regex: Regex::new(r"\[\d+\]").expect("citation pattern is a valid regex"),
        }
    }

    /// Trims the paragraph text, then drops citation markers like `[12]`.
    pub fn clean_text(&self, raw: &str) -> String {
        self.citation_regex.replace_all(raw.trim(), "").into_owned()
    }

    /// Picks the intro paragraph out of a page: the first one naming the
    /// leader, else the first non-empty one. `None` when the page has no
    /// usable paragraph at all.
    pub fn select_paragraph(&self, html: &str, names: NameQuery<'_>) -> ScrapeResult<Option<String>> {
        let document = Html::parse_document(html);
        let Some(content) = find_content(&document)? else {
            return Ok(None);
        };

        let paragraph_selector =
            Selector::parse(PARAGRAPH_SELECTOR).map_err(|e| ScrapeError::parse("paragraph selector", e))?;

        let mut fallback = None;
        for paragraph in content.select(&paragraph_selector) {
            let text = self.clean_text(&paragraph.text().collect::<String>());
            if text.is_empty() {
                continue;
            }
            if names.matches(&text) {
                return Ok(Some(text));
            }
            if fallback.is_none() {
                fallback = Some(text);
            }
        }
        Ok(fallback)
    }

    /// Fetches `url` and selects its intro paragraph. Fetch and HTTP errors
    /// come back as `Err`; a page without paragraphs gives an empty string.
    pub fn try_extract(
        &self,
        transport: &dyn HttpTransport,
        url: &str,
        first_name: &str,
        last_name: Option<&str>,
    ) -> ScrapeResult<String> {
        let page_url = Url::parse(url).map_err(|e| ScrapeError::parse(format!("wikipedia URL '{}'", url), e))?;
        let resp = transport.get(&page_url, None)?.error_for_status(&page_url)?;

        let names = NameQuery::new(first_name, last_name);
        match self.select_paragraph(&resp.body, names)? {
            Some(paragraph) => Ok(paragraph),
            None => {
                warn!("No non-empty paragraph found for URL: {}", url);
                Ok(String::new())
            }
        }
    }
}

fn find_content(document: &Html) -> ScrapeResult<Option<ElementRef<'_>>> {
    for sel_str in CONTENT_SELECTORS {
        let selector = Selector::parse(sel_str).map_err(|e| ScrapeError::parse("content selector", e))?;
        if let Some(element) = document.select(&selector).next() {
            debug!("Content area found with selector '{}'", sel_str);
            return Ok(Some(element));
        }
    }
    Ok(None)
}
