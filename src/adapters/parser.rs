use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::model::{ParsedRow, NOT_AVAILABLE, UNKNOWN_PHYSICIAN};

/// Marker every physician detail link carries in its `href`.
pub const DETAIL_LINK_MARKER: &str = "CentralPagamento";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Row {row} has no cell {cell}")]
    MissingCell { row: usize, cell: usize },
    #[error("Failed to resolve link '{href}': {reason}")]
    InvalidLink { href: String, reason: String },
}

static DETAIL_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("a[href*='{}']", DETAIL_LINK_MARKER))
        .expect("invalid selector: detail link")
});

static PHYSICIAN_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("strong#retnomemedico").expect("invalid selector: physician name")
});

static RESULT_TABLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table#tb_lista_dias").expect("invalid selector: result table")
});

static RESULT_ROWS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table#tb_lista_dias > tbody > tr").expect("invalid selector: result rows")
});

static STRONG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("invalid selector: strong"));

/// Physician header and table rows of one detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub name: String,
    pub specialty: String,
    pub rows: Vec<Result<ParsedRow, ParseError>>,
    pub has_table: bool,
}

/// First non-blank text node that is a direct child of `element`.
fn own_text(element: ElementRef) -> Option<String> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn count_in(cell: ElementRef) -> u32 {
    let raw = cell
        .select(&STRONG)
        .next()
        .map(|strong| strong.text().collect::<String>())
        .unwrap_or_default()
        .replace('-', "");
    let raw = raw.trim();

    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        raw.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Absolute URLs of every physician detail link on a listing page, in page order.
pub fn parse_listing_links(html: &str, base: &Url) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);

    document
        .select(&DETAIL_LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| {
            base.join(href.trim())
                .map(String::from)
                .map_err(|e| ParseError::InvalidLink {
                    href: href.to_string(),
                    reason: e.to_string(),
                })
        })
        .collect()
}

fn parse_specialty(name_element: ElementRef) -> Option<String> {
    let label = name_element
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|parent| parent.value().name() == "label")?;

    label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "label")
        .and_then(own_text)
}

fn parse_row(index: usize, row: ElementRef) -> Result<ParsedRow, ParseError> {
    let mut cells = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td");

    let first = cells
        .next()
        .ok_or(ParseError::MissingCell { row: index, cell: 1 })?;
    let second = cells
        .next()
        .ok_or(ParseError::MissingCell { row: index, cell: 2 })?;

    Ok(ParsedRow {
        date_label: own_text(first),
        work_hours: own_text(second).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        slot_count: count_in(first),
        attended_count: count_in(second),
    })
}

/// Reads a physician detail page. Broken rows are returned as errors so the
/// caller can log and skip them.
pub fn parse_detail_page(html: &str) -> DetailPage {
    let document = Html::parse_document(html);

    let name_element = document.select(&PHYSICIAN_NAME).next();
    let name = name_element
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_PHYSICIAN.to_string());
    let specialty = name_element
        .and_then(parse_specialty)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let has_table = document.select(&RESULT_TABLE).next().is_some();

    let rows = document
        .select(&RESULT_ROWS)
        .enumerate()
        .map(|(i, row)| parse_row(i + 1, row))
        .collect();

    DetailPage {
        name,
        specialty,
        rows,
        has_table,
    }
}
