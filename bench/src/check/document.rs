//! Small assertion DSL over a parsed HTML document
//!
//! `Document` wraps a `scraper::Html`, which is not `Send`. Inspect pages in
//! synchronous code and never keep a `Document` alive across an `.await`.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::failure::Failure;

pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a response body. Bodies that are not UTF-8 are a parse failure.
    pub fn parse(body: &[u8]) -> Result<Self, Failure> {
        let text =
            std::str::from_utf8(body).map_err(|_| Failure::structure("html parse error"))?;
        Ok(Self {
            html: Html::parse_document(text),
        })
    }

    fn selector(selector: &str) -> Result<Selector, Failure> {
        Selector::parse(selector)
            .map_err(|_| Failure::structure(format!("element search error: {selector}")))
    }

    fn elements<'a>(&'a self, selector: &str) -> Result<Vec<ElementRef<'a>>, Failure> {
        let selector = Self::selector(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Number of nodes matching `selector`
    pub fn count(&self, selector: &str) -> Result<usize, Failure> {
        Ok(self.elements(selector)?.len())
    }

    /// Fail unless exactly `expected` nodes match
    pub fn expect_count(&self, selector: &str, expected: usize) -> Result<(), Failure> {
        let found = self.count(selector)?;
        if found == expected {
            Ok(())
        } else if found == 0 {
            Err(Failure::structure(format!("element is not found: {selector}")))
        } else {
            Err(Failure::structure(format!(
                "{found} elements match {selector}, expected {expected}"
            )))
        }
    }

    /// Concatenated text of the first matching node
    pub fn first_text(&self, selector: &str) -> Result<Option<String>, Failure> {
        Ok(self
            .elements(selector)?
            .first()
            .map(|el| el.text().collect::<String>()))
    }

    /// Text of every matching node
    pub fn texts(&self, selector: &str) -> Result<Vec<String>, Failure> {
        Ok(self
            .elements(selector)?
            .iter()
            .map(|el| el.text().collect::<String>())
            .collect())
    }

    /// Value of `attr` on every matching node that carries it
    pub fn attrs(&self, selector: &str, attr: &str) -> Result<Vec<String>, Failure> {
        Ok(self
            .elements(selector)?
            .iter()
            .filter_map(|el| el.value().attr(attr))
            .map(str::to_string)
            .collect())
    }

    /// Fail unless the first matching node's text matches `pattern`
    pub fn expect_match(&self, selector: &str, pattern: &Regex) -> Result<(), Failure> {
        let text = self
            .first_text(selector)?
            .ok_or_else(|| Failure::structure(format!("element is not found: {selector}")))?;
        if pattern.is_match(&text) {
            Ok(())
        } else {
            Err(Failure::structure(format!("{selector} match {pattern}")))
        }
    }

    /// Fail unless the first matching node's markup matches `pattern`.
    /// Used for void elements such as `<input>`, which carry no text.
    pub fn expect_markup_match(&self, selector: &str, pattern: &Regex) -> Result<(), Failure> {
        let elements = self.elements(selector)?;
        let first = elements
            .first()
            .ok_or_else(|| Failure::structure(format!("element is not found: {selector}")))?;
        if pattern.is_match(&first.html()) {
            Ok(())
        } else {
            Err(Failure::structure(format!("{selector} match {pattern}")))
        }
    }
}
