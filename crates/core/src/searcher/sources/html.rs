//! HTML helpers shared by the scraping adapters.

use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};

use super::super::magnet::is_magnet;
use super::super::size::parse_size;
use super::super::SourceError;

pub(crate) fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css)
        .map_err(|e| SourceError::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

/// Text content of an element with whitespace collapsed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `href` under `element` matching `selector` that is a magnet URI.
pub(crate) fn magnet_in(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| is_magnet(href))
        .map(|href| href.trim().to_string())
}

/// Parse a page and return its first magnet link matching `css`.
pub(crate) fn find_magnet(page: &str, css: &str) -> Result<Option<String>, SourceError> {
    let selector = selector(css)?;
    let document = Html::parse_document(page);
    Ok(magnet_in(document.root_element(), &selector))
}

/// First size `pattern` finds in a page's text. The pattern's first group
/// is the size when it has one, else the whole match. Unparsable sizes
/// count as not found.
pub(crate) fn find_size(page: &str, pattern: &Regex) -> Option<u64> {
    let document = Html::parse_document(page);
    let text = text_of(document.root_element());
    pattern
        .captures(&text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| parse_size(m.as_str()))
        .filter(|&size| size > 0)
}
