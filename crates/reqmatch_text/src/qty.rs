//! Quantity and unit extraction from raw request lines.
//!
//! Request lines mix thousand groupings ("1 000", "1.000"), decimal commas
//! ("1,5") and a small unit vocabulary. The last number on the line wins,
//! preferring a number immediately followed by a unit, so "Кабель ВВГнг
//! 3x2.5 100 м" yields 100, not 2.5.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::collapse_whitespace;

/// A grouped thousand number ("1 000", "1.000", "1,000") or a plain number
/// with an optional decimal part.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:[\s.,]\d{3})+|\d+(?:[.,]\d+)?").expect("number pattern"));

static UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)шт|штук|pcs|pc|м\.?|метр|kg|кг|уп\.?|компл\.?").expect("unit pattern")
});

/// Unit anchored right after a number, with optional whitespace in between.
static UNIT_AFTER_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?i:шт|штук|pcs|pc|м\.?|метр|kg|кг|уп\.?|компл\.?)").expect("unit-after pattern")
});

/// Standalone unit words, stripped when isolating the item name.
static UNIT_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:шт|штук|pcs|pc|м\.?|метр|kg|кг|уп\.?|компл\.?)\b")
        .expect("unit-word pattern")
});

static DOT_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:\.\d{3})+$").expect("dot-grouped pattern"));

static COMMA_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:,\d{3})+$").expect("comma-grouped pattern"));

/// Parsed quantity for one raw line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQty {
    /// Parsed numeric quantity, if any number qualified.
    pub qty: Option<f64>,
    /// Canonicalized unit, if the line mentions one.
    pub unit: Option<String>,
    /// The raw matched span the quantity was read from, trimmed.
    pub qty_raw: Option<String>,
}

/// A number glued to a word or another number is part of an identifier
/// ("3x2.5", "ELC0100"), not a quantity.
fn is_qty_boundary(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('А'..='Я').contains(&c)
        || ('а'..='я').contains(&c)
        || matches!(c, '.' | ',')
}

fn boundary_before(line: &str, start: usize) -> bool {
    line[..start].chars().next_back().map_or(true, |c| !is_qty_boundary(c))
}

fn boundary_after(line: &str, end: usize) -> bool {
    line[end..].chars().next().map_or(true, |c| !is_qty_boundary(c))
}

/// Extract quantity and unit from a raw line.
pub fn parse_qty(input: &str) -> ParsedQty {
    let line = input.replace('\u{00A0}', " ");

    // Last number followed by a unit beats the last bare number.
    let mut with_unit: Option<(std::ops::Range<usize>, String)> = None;
    let mut bare: Option<(std::ops::Range<usize>, String)> = None;
    for m in NUMBER.find_iter(&line) {
        if !boundary_before(&line, m.start()) {
            continue;
        }
        if let Some(unit_match) = UNIT_AFTER_NUMBER.find(&line[m.end()..]) {
            let span = m.start()..m.end() + unit_match.end();
            with_unit = Some((span, m.as_str().to_owned()));
        } else if boundary_after(&line, m.end()) {
            bare = Some((m.range(), m.as_str().to_owned()));
        }
    }

    let (qty, qty_raw) = match with_unit.or(bare) {
        Some((span, number)) => {
            let raw = line[span].trim().to_owned();
            let parsed = normalize_numeric_token(&number).parse::<f64>().ok();
            (parsed.filter(|q| q.is_finite()), Some(raw))
        }
        None => (None, None),
    };

    let unit = UNIT.find(&line).map(|m| normalize_unit(m.as_str()));

    ParsedQty { qty, unit, qty_raw }
}

/// Remove the parsed quantity span and standalone unit words from a line,
/// leaving the item name or code. Falls back to the original line when
/// stripping would leave nothing usable.
pub fn strip_qty(line: &str, parsed: &ParsedQty) -> String {
    let mut no_qty = line.to_owned();
    if let Some(qty_raw) = parsed.qty_raw.as_deref() {
        if let Some(idx) = no_qty.rfind(qty_raw) {
            no_qty.replace_range(idx..idx + qty_raw.len(), " ");
        }
    }
    let without_units = UNIT_WORD.replace_all(&no_qty, " ");
    let name = collapse_whitespace(&without_units.replace([';', '|'], " "));
    if name.chars().count() > 1 {
        name
    } else {
        line.to_owned()
    }
}

/// Canonicalize a unit spelling (шт/штук/pcs/pc → шт, м./метр → м, …).
pub fn normalize_unit(unit: &str) -> String {
    let u = unit.to_lowercase();
    match u.as_str() {
        "шт" | "штук" | "pcs" | "pc" => "шт".to_owned(),
        "м" | "м." | "метр" => "м".to_owned(),
        "kg" | "кг" => "кг".to_owned(),
        "уп" | "уп." => "уп".to_owned(),
        _ => u,
    }
}

fn normalize_numeric_token(token: &str) -> String {
    let compact: String = token.split_whitespace().collect();

    if DOT_GROUPED.is_match(&compact) {
        return compact.replace('.', "");
    }
    if COMMA_GROUPED.is_match(&compact) {
        return compact.replace(',', "");
    }
    if compact.contains(',') && !compact.contains('.') {
        return compact.replacen(',', ".", 1);
    }
    compact
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousand_with_space() {
        assert_eq!(parse_qty("Кабель 1 000 шт").qty, Some(1000.0));
    }

    #[test]
    fn parses_decimal_comma() {
        assert_eq!(parse_qty("Провод 1,5 м").qty, Some(1.5));
    }

    #[test]
    fn parses_decimal_dot() {
        assert_eq!(parse_qty("Провод 1.5 м").qty, Some(1.5));
    }

    #[test]
    fn parses_thousand_dot() {
        assert_eq!(parse_qty("Кабель 1.000 шт").qty, Some(1000.0));
    }

    #[test]
    fn prefers_number_with_unit_over_later_bare_number() {
        let parsed = parse_qty("Кабель 25 шт арт 4417");
        assert_eq!(parsed.qty, Some(25.0));
        assert_eq!(parsed.qty_raw.as_deref(), Some("25 шт"));
    }

    #[test]
    fn takes_last_qualifying_number() {
        assert_eq!(parse_qty("Кабель ВВГнг 100 м").qty, Some(100.0));
        // Numbers glued into an identifier are not quantities.
        assert_eq!(parse_qty("Кабель ВВГнг 3x2.5").qty, None);
    }

    #[test]
    fn canonicalizes_units() {
        assert_eq!(parse_qty("Провод 5 метр").unit.as_deref(), Some("м"));
        assert_eq!(parse_qty("Болт 10 pcs").unit.as_deref(), Some("шт"));
        assert_eq!(parse_qty("Песок 2 kg").unit.as_deref(), Some("кг"));
        // The unit scan takes the first hit anywhere in the line, even inside
        // a word: the "м" of "Цемент" wins over the trailing "kg".
        assert_eq!(parse_qty("Цемент 2 kg").unit.as_deref(), Some("м"));
        assert_eq!(parse_qty("Болты 100").unit, None);
    }

    #[test]
    fn strip_qty_isolates_the_item_name() {
        let line = "Кабель ВВГнг 3x2.5 100 м";
        let parsed = parse_qty(line);
        assert_eq!(strip_qty(line, &parsed), "Кабель ВВГнг 3x2.5");

        let line = "ELC0100203802 2 шт";
        let parsed = parse_qty(line);
        assert_eq!(strip_qty(line, &parsed), "ELC0100203802");
    }

    #[test]
    fn strip_qty_keeps_qty_only_lines_intact() {
        let line = "100 шт";
        let parsed = parse_qty(line);
        assert_eq!(strip_qty(line, &parsed), "100 шт");
    }

    #[test]
    fn handles_non_breaking_spaces() {
        assert_eq!(parse_qty("Кабель 1\u{00A0}000 шт").qty, Some(1000.0));
    }
}
