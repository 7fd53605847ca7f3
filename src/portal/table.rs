//! Normalization of the portal's list-view tables.
//!
//! The portal renders curriculum data as SharePoint list views whose
//! markup is inconsistent: header cells carry one of several classes,
//! some tables lead each row with a decorative icon column that has no
//! header, and column names vary between pages. This module aligns rows
//! with headers and re-keys them onto a fixed semantic schema.

use html_scraper::{ElementRef, Html, Selector};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::portal::clean_text;

static LIST_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.ms-listviewtable").unwrap());
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class*='ms-vh']").unwrap());
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

static HEADER_ROW_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ms-viewheadertr|ms-headerrow|ms-viewheader").unwrap());
static LAB_PRACTICE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*/\s*(\d+)\s*$").unwrap());

/// One list-view table reduced to headers plus header → value rows.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

/// A data row re-keyed onto the fixed curriculum schema. Every field is
/// optional; pages expose different column subsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectRow {
    pub semester: Option<String>,
    pub lectures: Option<String>,
    pub lab_practice: Option<String>,
    pub lab: Option<String>,
    pub practice: Option<String>,
    pub eval_method: Option<String>,
    pub lecturer: Option<String>,
    pub assistants: Option<String>,
}

/// Parses and normalizes a program or subject page.
///
/// Returns an empty vec when the page has no list-view tables; callers
/// treat that as "no data", never as an error.
pub fn normalize_page(html: &str) -> Vec<SubjectRow> {
    let document = Html::parse_document(html);
    let tables = parse_tables(&document);
    match select_table(tables) {
        Some(table) => table.rows.iter().map(normalize_row).collect(),
        None => Vec::new(),
    }
}

/// Extracts every list-view table on the page into aligned rows.
pub fn parse_tables(document: &Html) -> Vec<RawTable> {
    let mut parsed = Vec::new();

    for table in document.select(&LIST_TABLE) {
        let header_row = table
            .select(&TR)
            .find(|tr| class_matches(*tr, &HEADER_ROW_CLASS));
        let headers = extract_headers(table, header_row);

        let rows = match header_row {
            Some(header_tr) => data_rows_after(header_tr, &headers),
            None => generic_rows(table),
        };

        if !rows.is_empty() {
            parsed.push(RawTable { headers, rows });
        }
    }

    parsed
}

fn class_matches(el: ElementRef, pattern: &Regex) -> bool {
    el.attr("class").is_some_and(|c| pattern.is_match(c))
}

/// Header texts for a table: cells with an `ms-vh*` class, deduped in
/// order; when a table has none, the detected header row's cells.
fn extract_headers(table: ElementRef, header_row: Option<ElementRef>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for cell in table.select(&HEADER_CELL) {
        let text = clean_text(&cell.text().collect::<String>());
        if !text.is_empty() && !headers.contains(&text) {
            headers.push(text);
        }
    }
    if headers.is_empty()
        && let Some(row) = header_row
    {
        for cell in row.child_elements() {
            if !matches!(cell.value().name(), "th" | "td") {
                continue;
            }
            let text = clean_text(&cell.text().collect::<String>());
            if !text.is_empty() {
                headers.push(text);
            }
        }
    }
    headers
}

/// Walks the rows following the header row, aligning each to the headers:
/// leading icon-only cells (decorative columns without a header) are
/// dropped, short rows padded with "", long rows truncated.
fn data_rows_after(header_tr: ElementRef, headers: &[String]) -> Vec<HashMap<String, String>> {
    let mut rows = Vec::new();

    for sibling in header_tr.next_siblings() {
        let Some(tr) = ElementRef::wrap(sibling) else {
            continue;
        };
        if tr.value().name() != "tr" {
            continue;
        }
        let cells: Vec<ElementRef> = tr.select(&TD).collect();
        if cells.is_empty() {
            continue;
        }
        let mut values: Vec<String> = cells
            .iter()
            .map(|td| clean_text(&td.text().collect::<String>()))
            .collect();

        if !headers.is_empty() {
            let mut lead = 0;
            while values.len() - lead > headers.len()
                && lead < cells.len()
                && is_icon_cell(cells[lead])
            {
                lead += 1;
            }
            values.drain(..lead);
            values.resize(headers.len(), String::new());
            rows.push(headers.iter().cloned().zip(values).collect());
        }
    }

    rows
}

/// Tables without a recognizable header row keep their cell order under
/// generated `col_N` keys.
fn generic_rows(table: ElementRef) -> Vec<HashMap<String, String>> {
    let mut rows = Vec::new();
    for tr in table.select(&TR) {
        let values: Vec<String> = tr
            .select(&TD)
            .map(|td| clean_text(&td.text().collect::<String>()))
            .collect();
        if values.is_empty() {
            continue;
        }
        rows.push(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("col_{}", i + 1), v))
                .collect(),
        );
    }
    rows
}

/// A decorative cell: no visible text, but an image (optionally wrapped
/// in a textless link).
fn is_icon_cell(td: ElementRef) -> bool {
    if !clean_text(&td.text().collect::<String>()).is_empty() {
        return false;
    }
    td.select(&IMG).next().is_some()
}

/// Picks the table that looks like a curriculum: headers mentioning
/// "семестр" or "курс"; failing that, the first table with any rows.
pub fn select_table(tables: Vec<RawTable>) -> Option<RawTable> {
    let position = tables.iter().position(|t| {
        let joined = t.headers.join(" ").to_lowercase();
        joined.contains("семестр") || joined.contains("курс")
    });
    match position {
        Some(i) => tables.into_iter().nth(i),
        None => tables.into_iter().next(),
    }
}

/// First value whose header contains `needle` (lowercased substring).
fn find_value<'a>(row: &'a HashMap<String, String>, needle: &str) -> Option<&'a str> {
    row.iter()
        .find(|(header, _)| header.to_lowercase().contains(needle))
        .map(|(_, value)| value.as_str())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::to_owned).filter(|v| !v.is_empty())
}

/// Re-keys a raw row onto the fixed schema and splits "N/M" shaped
/// lab/practice counts into the two numeric fields.
pub fn normalize_row(row: &HashMap<String, String>) -> SubjectRow {
    let lab_practice = non_empty(find_value(row, "лаборат").or_else(|| find_value(row, "практическ")));
    let (lab, practice) = match lab_practice
        .as_deref()
        .and_then(|v| LAB_PRACTICE_SPLIT.captures(v))
    {
        Some(caps) => (Some(caps[1].to_owned()), Some(caps[2].to_owned())),
        None => (None, None),
    };

    SubjectRow {
        semester: non_empty(find_value(row, "семестр")),
        lectures: non_empty(find_value(row, "количество лек")),
        lab_practice,
        lab,
        practice,
        eval_method: non_empty(find_value(row, "отчетност").or_else(|| find_value(row, "форма"))),
        lecturer: non_empty(find_value(row, "лектор")),
        assistants: non_empty(find_value(row, "ассистент")),
    }
}
