//! Turns one positional upstream row into a [`NewCourse`].
//!
//! Cell layout: `[title markup, location markup, "MM/DD/YYYY", time, price, seats]`.
//! Sub-fields that are missing or oddly formatted degrade to defaults; only a
//! structurally broken row (not an array, too short, markup cells not strings)
//! is rejected with a [`ParseError`].

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::constants::{DEFAULT_COURSE_TITLE, MAX_SEAT_COUNT, RAW_ROW_CELLS, WAIT_LIST_MARKER};
use crate::course::{NewCourse, RawRow};
use crate::error::{ParseError, json_kind};
use crate::markup::{first_link, flatten_text};

const TITLE_CELL: usize = 0;
const LOCATION_CELL: usize = 1;
const DATE_CELL: usize = 2;
const TIME_CELL: usize = 3;
const PRICE_CELL: usize = 4;
const SEATS_CELL: usize = 5;

const UPSTREAM_DATE_FORMAT: &str = "%m/%d/%Y";

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static SECTION_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/section/(\d+)").unwrap());

/// Per-institution values stamped on every course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    /// Base origin used to absolutize relative registration paths.
    pub origin: String,
    pub course_code: String,
    pub seats_total: u32,
}

/// Decoded seats cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Seats {
    pub available: u32,
    pub waitlist: bool,
}

/// Normalize one upstream row.
///
/// The title falls back to [`DEFAULT_COURSE_TITLE`] both when the title cell
/// has no anchor and when the anchor's text is blank, so a stored title is
/// never empty.
///
/// # Errors
/// Returns [`ParseError`] when the row is structurally unusable.
pub fn normalize_row(row: &RawRow, ctx: &RowContext) -> Result<NewCourse, ParseError> {
    let cells = row.0.as_array().ok_or(ParseError::NotARow(json_kind(&row.0)))?;
    if cells.len() < RAW_ROW_CELLS {
        return Err(ParseError::TooFewCells { found: cells.len(), expected: RAW_ROW_CELLS });
    }

    let title_markup = markup_cell(cells, TITLE_CELL)?;
    let location_markup = markup_cell(cells, LOCATION_CELL)?;

    let link = first_link(title_markup);
    let (title, path) = match link {
        Some(link) if !link.text.is_empty() => (link.text, link.href),
        Some(link) => (DEFAULT_COURSE_TITLE.to_owned(), link.href),
        None => (DEFAULT_COURSE_TITLE.to_owned(), String::new()),
    };

    let date_cell = cell(cells, DATE_CELL);
    let start_date = parse_start_date(date_cell);
    if start_date.is_none() {
        tracing::debug!(value = %date_cell, "unparsable start date, storing as absent");
    }

    let seats = decode_seats(cell(cells, SEATS_CELL));

    Ok(NewCourse {
        section_id: section_id(&path),
        course_code: ctx.course_code.clone(),
        title,
        start_date,
        start_time: opaque_text(cell(cells, TIME_CELL)),
        location: flatten_text(location_markup),
        seats_available: seats.available,
        seats_total: ctx.seats_total,
        price: opaque_text(cell(cells, PRICE_CELL)),
        waitlist_available: seats.waitlist,
        registration_url: resolve_registration_url(&ctx.origin, &path),
    })
}

/// Parse an upstream `MM/DD/YYYY` date. Anything else yields `None`.
#[must_use]
pub fn parse_start_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?;
    NaiveDate::parse_from_str(raw.trim(), UPSTREAM_DATE_FORMAT).ok()
}

/// Numeric id following `/section/` in a registration path, or empty.
#[must_use]
pub fn section_id(path: &str) -> String {
    SECTION_ID_REGEX
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}

/// Decode the seats cell.
///
/// A non-negative JSON integer is the open seat count, clamped to
/// [`MAX_SEAT_COUNT`]. Anything else means no open seats; a wait list is
/// flagged only when the text contains `"Wait List"`.
#[must_use]
pub fn decode_seats(value: &Value) -> Seats {
    if let Some(n) = value.as_u64() {
        let available = u32::try_from(n).map_or(MAX_SEAT_COUNT, |n| n.min(MAX_SEAT_COUNT));
        return Seats { available, waitlist: false };
    }
    let waitlist = match value {
        Value::String(s) => s.contains(WAIT_LIST_MARKER),
        Value::Null | Value::Number(_) | Value::Bool(_) => false,
        other => other.to_string().contains(WAIT_LIST_MARKER),
    };
    Seats { available: 0, waitlist }
}

/// Absolute registration URL: `path` as-is if it already has a scheme,
/// otherwise prefixed with the institution's origin.
#[must_use]
pub fn resolve_registration_url(origin: &str, path: &str) -> String {
    if path.starts_with("http") {
        path.to_owned()
    } else {
        format!("{origin}{path}")
    }
}

static MISSING_CELL: Value = Value::Null;

fn cell(cells: &[Value], index: usize) -> &Value {
    cells.get(index).unwrap_or(&MISSING_CELL)
}

fn markup_cell(cells: &[Value], index: usize) -> Result<&str, ParseError> {
    let value = cell(cells, index);
    value.as_str().ok_or(ParseError::NotMarkup { cell: index, kind: json_kind(value) })
}

fn opaque_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
