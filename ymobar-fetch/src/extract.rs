//! HTML extraction for portal pages.
//!
//! The portal's markup has no stable identifiers, so values are located by
//! position: the first hidden inputs of a page, and the first four tables of
//! the usage content container. All functions are total over arbitrary
//! input; structural failures come back as [`ExtractError`] and unparsable
//! numbers become `0.0`.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use ymobar_core::UsageSnapshot;

use crate::error::ExtractError;

// ============================================================================
// Selectors
// ============================================================================

/// Content container holding the usage tables.
pub const USAGE_CONTAINER_SELECTOR: &str = ".list-toggle-content.js-toggle-content.m-top-20";

/// Minimum number of tables the usage container must hold.
const REQUIRED_TABLES: usize = 4;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

static HIDDEN_INPUT: LazyLock<Selector> = LazyLock::new(|| selector("input[type=hidden]"));
static USAGE_CONTAINER: LazyLock<Selector> = LazyLock::new(|| selector(USAGE_CONTAINER_SELECTOR));
static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static BODY_CELL: LazyLock<Selector> = LazyLock::new(|| selector("tbody td"));
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr"));
static BODY_ROW_CELL: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr td"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

// ============================================================================
// Hidden Inputs
// ============================================================================

fn hidden_inputs(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&HIDDEN_INPUT).collect()
}

fn value_of(input: &ElementRef<'_>) -> String {
    input.value().attr("value").unwrap_or_default().to_string()
}

/// Returns the `value` of the first hidden input in the document.
///
/// An input without a `value` attribute yields an empty string.
///
/// # Errors
///
/// Returns [`ExtractError::NotFound`] if the document has no hidden input.
pub fn extract_first_hidden_input_value(html: &str) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);
    document
        .select(&HIDDEN_INPUT)
        .next()
        .map(|input| value_of(&input))
        .ok_or(ExtractError::NotFound)
}

/// Returns the values of the first two hidden inputs, in document order.
///
/// Position, not name, decides which input is which.
///
/// # Errors
///
/// Returns [`ExtractError::InsufficientTokens`] with the count and names of
/// the inputs found when fewer than two exist.
pub fn extract_hidden_token_pair(html: &str) -> Result<(String, String), ExtractError> {
    let document = Html::parse_document(html);
    let inputs = hidden_inputs(&document);

    match inputs.as_slice() {
        [first, second, ..] => Ok((value_of(first), value_of(second))),
        found => Err(ExtractError::InsufficientTokens {
            found: found.len(),
            names: found
                .iter()
                .map(|input| input.value().attr("name").unwrap_or_default().to_string())
                .collect(),
        }),
    }
}

// ============================================================================
// Usage Tables
// ============================================================================

/// Parses a gigabyte figure as shown on the portal.
///
/// Tabs, newlines and the `GB` suffix are removed before parsing. Anything
/// that still fails to parse, or parses to a non-finite value, is `0.0`.
pub fn parse_gb(text: &str) -> f64 {
    let cleaned = text.replace(['\t', '\n'], "").replace("GB", "");
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            trace!(text = %text, "Unparsable figure, using 0.0");
            0.0
        }
    }
}

/// Joins the text of each element with a single space.
fn joined_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts a usage snapshot stamped with the current time.
///
/// # Errors
///
/// See [`extract_usage_snapshot_at`].
pub fn extract_usage_snapshot(html: &str) -> Result<UsageSnapshot, ExtractError> {
    extract_usage_snapshot_at(html, Utc::now())
}

/// Extracts a usage snapshot from the usage summary page.
///
/// Table roles are fixed by position inside the content container:
/// carry-over, base allowance (second body row), purchased extra, used.
///
/// # Errors
///
/// - [`ExtractError::ContainerNotFound`] if the content container is absent
/// - [`ExtractError::InsufficientTables`] if it holds fewer than four tables
pub fn extract_usage_snapshot_at(
    html: &str,
    observed_at: DateTime<Utc>,
) -> Result<UsageSnapshot, ExtractError> {
    let document = Html::parse_document(html);

    let container = document
        .select(&USAGE_CONTAINER)
        .next()
        .ok_or_else(|| ExtractError::ContainerNotFound {
            selector: USAGE_CONTAINER_SELECTOR.to_string(),
        })?;

    let tables: Vec<ElementRef<'_>> = container.select(&TABLE).collect();
    if tables.len() < REQUIRED_TABLES {
        return Err(ExtractError::InsufficientTables {
            found: tables.len(),
        });
    }

    let carry_over = parse_gb(&joined_text(tables[0].select(&BODY_CELL)));

    let rows: Vec<ElementRef<'_>> = tables[1].select(&BODY_ROW).collect();
    let base = rows
        .get(1)
        .map_or(0.0, |row| parse_gb(&joined_text(row.select(&CELL))));

    let extra = parse_gb(&joined_text(tables[2].select(&BODY_ROW_CELL)));
    let used = parse_gb(&joined_text(tables[3].select(&BODY_ROW_CELL)));

    debug!(
        tables = tables.len(),
        carry_over, base, extra, used, "Extracted usage figures"
    );

    Ok(UsageSnapshot::new(carry_over, base, extra, used, observed_at))
}

// ============================================================================
// Tests
// ============================================================================
