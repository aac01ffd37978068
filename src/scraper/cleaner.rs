use crate::models::Row;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse a dollar figure: keep digits only.
/// "$1,234,000" → 1234000 | "AUD 950000" → 950000
pub fn parse_aud(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }
    // Cents are never listed; a decimal point would break the digit join.
    let whole = s.split('.').next()?;
    let cleaned: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    cleaned.parse().ok()
}

pub fn parse_rank(s: &str) -> Option<u32> {
    s.trim().trim_end_matches('.').parse().ok()
}

pub fn normalise_suburb(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Median value of a row, if it reads as a number.
pub fn row_value(row: &Row) -> Option<u64> {
    parse_aud(&row.median_value_aud)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
