use crate::error::{PageError, PageResult};
use crate::models::Row;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

// ── Listing path ──────────────────────────────────────────────────────────────

/// One hop of a positional walk: the `index`-th descendant matching `tag`.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub tag: &'static str,
    pub index: usize,
}

impl Step {
    pub const fn nth(tag: &'static str, index: usize) -> Self {
        Self { tag, index }
    }

    fn label(&self) -> String {
        format!("{}[{}]", self.tag, self.index)
    }
}

/// Where the ranking table lives on a suburbtop page: the seventh table in
/// document order, its third row, that row's first cell, and the table
/// nested inside it.
pub const LISTING_PATH: [Step; 4] = [
    Step::nth("table", 6),
    Step::nth("tr", 2),
    Step::nth("td", 0),
    Step::nth("table", 0),
];

fn selector(tag: &str) -> PageResult<Selector> {
    Selector::parse(tag).map_err(|e| PageError::Parse(format!("selector `{}`: {:?}", tag, e)))
}

/// Walk `path` from the document root. Each hop searches all descendants of
/// the previous hop, so nested tables count towards indices.
pub fn locate<'a>(doc: &'a Html, path: &[Step]) -> PageResult<ElementRef<'a>> {
    let mut current = doc.root_element();
    let mut walked = String::new();

    for step in path {
        if !walked.is_empty() {
            walked.push_str(" > ");
        }
        walked.push_str(&step.label());

        let sel = selector(step.tag)?;
        let candidates: Vec<ElementRef<'a>> = current.select(&sel).collect();
        let found = candidates.len();

        current = candidates
            .into_iter()
            .nth(step.index)
            .ok_or_else(|| PageError::MissingElement { step: walked.clone(), found })?;
    }

    Ok(current)
}

// ── Ranking page ──────────────────────────────────────────────────────────────

/// Extract every non-header row of the ranking table. A blank body is a
/// parse failure rather than a missing table.
pub fn parse_listing_page(html: &str) -> PageResult<Vec<Row>> {
    if html.trim().is_empty() {
        return Err(PageError::Parse("empty response body".into()));
    }

    let doc = Html::parse_document(html);
    let table = locate(&doc, &LISTING_PATH)?;

    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;

    let rows = table
        .select(&tr_sel)
        .enumerate()
        .skip(1)
        .map(|(i, tr)| {
            let cells: Vec<String> = tr
                .select(&td_sel)
                .map(|td| td.text().collect::<String>())
                .collect();
            Row::from_cells(i, cells)
        })
        .collect::<PageResult<Vec<Row>>>()?;

    debug!("{} rows in ranking table", rows.len());
    Ok(rows)
}
