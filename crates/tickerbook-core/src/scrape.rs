//! HTML and embedded-JSON extraction from rendered provider pages.
//!
//! Every function takes the page body and returns owned data. Parsed
//! documents are never held across an `.await`.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::source_error::SourceError;

/// A `<table>` flattened to header cells and body rows of cell text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Lowercased text of the whole table, used for keyword detection.
    pub fn search_text(&self) -> String {
        let mut text = self.headers.join(" ");
        for row in &self.rows {
            text.push(' ');
            text.push_str(&row.join(" "));
        }
        text.to_lowercase()
    }
}

/// A `/quote/<TICKER>` link found inside a page section, with the cell texts
/// of the row that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLinkRow {
    pub ticker: String,
    pub label: String,
    pub cells: Vec<String>,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn app_main_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?s)root\.App\.main\s*=\s*(\{.*?\});\s*\(function\(root\)",
            r"(?s)root\.App\.main\s*=\s*(\{.*\})\s*;",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// The `root.App.main = {...};` bootstrap object embedded in older pages.
pub fn app_main_json(html: &str) -> Result<Value, SourceError> {
    if !html.contains("root.App.main") {
        return Err(SourceError::parse("page has no embedded root.App.main json"));
    }

    for pattern in app_main_patterns() {
        for captures in pattern.captures_iter(html) {
            if let Some(body) = captures.get(1) {
                if let Ok(value) = serde_json::from_str::<Value>(body.as_str()) {
                    return Ok(value);
                }
            }
        }
    }

    Err(SourceError::parse("embedded root.App.main json is malformed"))
}

/// `context.dispatcher.stores.QuoteSummaryStore` from the embedded json.
pub fn quote_summary_store(html: &str) -> Result<Value, SourceError> {
    let root = app_main_json(html)?;
    root.pointer("/context/dispatcher/stores/QuoteSummaryStore")
        .cloned()
        .ok_or_else(|| SourceError::parse("embedded json has no QuoteSummaryStore"))
}

/// All tables on the page. Headers come from the last `thead` row (or the
/// first row made of `th` cells), rows from `td` cells.
pub fn tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    let (Some(table_sel), Some(head_row_sel), Some(th_sel), Some(row_sel), Some(td_sel)) = (
        selector("table"),
        selector("thead tr"),
        selector("th"),
        selector("tr"),
        selector("td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .map(|table| {
            let mut headers: Vec<String> = table
                .select(&head_row_sel)
                .last()
                .map(|row| row.select(&th_sel).map(clean_text).collect())
                .unwrap_or_default();

            let mut rows = Vec::new();
            for row in table.select(&row_sel) {
                let cells: Vec<String> = row.select(&td_sel).map(clean_text).collect();
                if cells.is_empty() {
                    if headers.is_empty() {
                        headers = row.select(&th_sel).map(clean_text).collect();
                    }
                    continue;
                }
                rows.push(cells);
            }

            HtmlTable { headers, rows }
        })
        .collect()
}

/// `(label, value)` pairs from two-cell table rows, optionally limited to the
/// element matching `scope` (falls back to the whole page when absent).
pub fn label_value_rows(html: &str, scope: Option<&str>) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let (Some(row_sel), Some(td_sel)) = (selector("tr"), selector("td")) else {
        return Vec::new();
    };

    let scoped = scope
        .and_then(selector)
        .and_then(|scope_sel| document.select(&scope_sel).next());

    let rows: Vec<ElementRef<'_>> = match scoped {
        Some(container) => container.select(&row_sel).collect(),
        None => document.select(&row_sel).collect(),
    };

    rows.into_iter()
        .filter_map(|row| {
            let mut cells = row.select(&td_sel).map(clean_text);
            let label = cells.next()?;
            let value = cells.next()?;
            (!label.is_empty()).then_some((label, value))
        })
        .collect()
}

/// Text of every element matching `css`.
pub fn select_texts(html: &str, css: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .map(clean_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// For each text node containing `needle`, the texts of up to `lookahead`
/// following siblings of its parent element.
pub fn texts_following(html: &str, needle: &str, lookahead: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut found = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if !text.contains(needle) {
            continue;
        }
        let Some(parent) = node.parent() else {
            continue;
        };
        for sibling in parent
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take(lookahead)
        {
            let sibling_text = clean_text(sibling);
            if !sibling_text.is_empty() {
                found.push(sibling_text);
            }
        }
    }

    found
}

/// Texts of the `span` elements inside the nearest `section`/`div` that
/// encloses the first occurrence of `heading`.
pub fn section_span_texts(html: &str, heading: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(span_sel) = selector("span") else {
        return Vec::new();
    };

    let Some(section) = document
        .root_element()
        .descendants()
        .find(|node| node.value().as_text().is_some_and(|text| text.contains(heading)))
        .and_then(|node| {
            node.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|element| matches!(element.value().name(), "section" | "div"))
        })
    else {
        return Vec::new();
    };

    section
        .select(&span_sel)
        .map(clean_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// `/quote/<TICKER>` links inside the section introduced by `heading`.
///
/// The section is the closest ancestor of the heading text that contains
/// table rows or more than five nested `div`s, searching at most three levels.
pub fn quote_links_in_section(html: &str, heading: &str) -> Vec<QuoteLinkRow> {
    let document = Html::parse_document(html);
    let (Some(anchor_sel), Some(row_sel), Some(div_sel), Some(cell_sel)) = (
        selector("a[href*='/quote/']"),
        selector("tr"),
        selector("div"),
        selector("td, div, span"),
    ) else {
        return Vec::new();
    };

    let Some(heading_parent) = document
        .root_element()
        .descendants()
        .find(|node| node.value().as_text().is_some_and(|text| text.contains(heading)))
        .and_then(|node| node.parent())
        .and_then(ElementRef::wrap)
    else {
        return Vec::new();
    };

    let mut section = heading_parent;
    for _ in 0..3 {
        if section.select(&row_sel).next().is_some() || section.select(&div_sel).count() > 5 {
            break;
        }
        match section.parent().and_then(ElementRef::wrap) {
            Some(parent) => section = parent,
            None => break,
        }
    }

    let mut rows = Vec::new();
    for anchor in section.select(&anchor_sel) {
        let Some(ticker) = anchor.attr("href").and_then(ticker_from_href) else {
            continue;
        };

        let mut row = anchor;
        for _ in 0..3 {
            let is_row = matches!(row.value().name(), "tr" | "li" | "div");
            if is_row && row.select(&cell_sel).count() >= 3 {
                break;
            }
            match row.parent().and_then(ElementRef::wrap) {
                Some(parent) => row = parent,
                None => break,
            }
        }

        let label = clean_text(anchor);
        let cells = row
            .select(&cell_sel)
            .filter(|cell| cell.child_elements().next().is_none())
            .map(clean_text)
            .filter(|text| !text.is_empty())
            .collect();

        rows.push(QuoteLinkRow {
            ticker,
            label,
            cells,
        });
    }

    rows
}

fn ticker_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/quote/")?;
    let ticker = rest.split(['?', '/', '#']).next()?.trim();
    let decoded = urlencoding::decode(ticker).ok()?;
    (!decoded.is_empty()).then(|| decoded.to_ascii_uppercase())
}

fn peers_object_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?s)\{[^{]*"peers"\s*:\s*\[[^\]]*\][^}]*\}"#).ok())
        .as_ref()
}

fn peers_array_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?s)"peers"\s*:\s*(\[.*?\])\s*[,}]"#).ok())
        .as_ref()
}

/// Peer objects from a `"peers": [...]` array in any inline script.
pub fn script_peer_objects(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let Some(script_sel) = selector("script") else {
        return Vec::new();
    };

    for script in document.select(&script_sel) {
        let text: String = script.text().collect();
        if !text.contains("\"peers\"") {
            continue;
        }

        if let Some(pattern) = peers_object_pattern() {
            for found in pattern.find_iter(&text) {
                if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(found.as_str()) {
                    if let Some(Value::Array(peers)) = object.get("peers") {
                        return peers.clone();
                    }
                }
            }
        }

        if let Some(pattern) = peers_array_pattern() {
            for captures in pattern.captures_iter(&text) {
                if let Some(array) = captures.get(1) {
                    if let Ok(Value::Array(peers)) = serde_json::from_str::<Value>(array.as_str()) {
                        return peers;
                    }
                }
            }
        }
    }

    Vec::new()
}
