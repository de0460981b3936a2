//! Lenient HTML document with first-match lookups

use scraper::{Html, Selector};

use crate::scrape::error::ExtractError;

/// Parsed page markup, owned by a single pipeline run
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    /// Parse markup with browser-style error recovery.
    ///
    /// Unclosed tags, stray end tags and missing `<head>`/`<body>` sections
    /// never fail; the parser keeps whatever tree it can recover.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Attribute `attr` of the first element matching `css`
    pub fn first_attr(&self, css: &str, attr: &str) -> Result<Option<&str>, ExtractError> {
        let selector = compile(css)?;
        Ok(self
            .html
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attr)))
    }

    /// Text content of the first element matching `css`
    pub fn first_text(&self, css: &str) -> Result<Option<String>, ExtractError> {
        let selector = compile(css)?;
        Ok(self
            .html
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>()))
    }

    /// Text content of every element matching `css`, in document order
    pub fn texts(&self, css: &str) -> Result<Vec<String>, ExtractError> {
        let selector = compile(css)?;
        Ok(self
            .html
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect())
    }
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}
