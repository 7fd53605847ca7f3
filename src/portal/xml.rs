//! The portal's XML list export.
//!
//! Program pages embed a link to a SharePoint XML export (an
//! `o:webquerysourcehref` attribute pointing at an `XMLDATA` URL). The
//! export is flat: one `z:row` element per record with values stored as
//! attributes under encoded field names.

use html_scraper::{Html, Selector};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::sync::LazyLock;
use tracing::warn;

/// Encoded SharePoint field that holds "URL, Name" pairs for subjects.
pub const SUBJECT_FIELD: &str = "ows__x041d__x0430__x0438__x043c__x04";

static ANY_ELEMENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());

/// Finds the XML export link embedded in a program page, if any.
pub fn find_export_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for element in document.select(&ANY_ELEMENT) {
        if let Some(href) = element.attr("o:webquerysourcehref")
            && href.contains("XMLDATA")
        {
            return Some(href.to_owned());
        }
    }
    None
}

/// Collects the values of attribute `key` across all `z:row` elements.
pub fn row_values(xml: &str, key: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut values = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"z:row"
                    && let Some(value) = attribute_value(&e, key)
                {
                    values.push(value);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "malformed XML export, stopping scan");
                break;
            }
            Ok(_) => {}
        }
    }

    values
}

fn attribute_value(element: &BytesStart, key: &str) -> Option<String> {
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == key.as_bytes() {
            return attr
                .unescape_value()
                .ok()
                .map(|v| v.into_owned())
                .filter(|v| !v.is_empty());
        }
    }
    None
}

/// Splits raw "URL, Name" pairs into (name, url) tuples.
///
/// The split is on the *first* comma only: subject names legitimately
/// contain commas. Names are trimmed of trailing slashes and whitespace.
pub fn subject_pairs(raw_values: &[String]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for raw in raw_values {
        let Some((url, name)) = raw.split_once(',') else {
            warn!(raw, "export value without a comma separator, skipping");
            continue;
        };
        let name = name.trim_matches([' ', '/']).to_owned();
        let url = url.trim().to_owned();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        pairs.push((name, url));
    }
    pairs
}
