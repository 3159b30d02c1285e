//! Canonical string forms for headers and vendor codes.
//!
//! The kept alphabet is ASCII Latin plus Russian Cyrillic А–Я; `Ё` folds to
//! `Е` before the charset filter so both spellings land on one key. Visual
//! multiplication signs (`×`, Latin `x`, Cyrillic `х`, `*`) collapse to a
//! single canonical `X` because cable cross-sections are written every which
//! way in the wild.

use std::sync::LazyLock;

use regex::Regex;

/// Area-unit spellings folded to one canonical token. The `²` sign sits
/// outside the kept charset, so this fold must run before the charset filter.
static AREA_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ММ²|MM²|КВ\.\s*ММ|КВММ|MM2").expect("area-unit pattern"));

fn is_header_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || ('А'..='Я').contains(&c)
        || matches!(c, '-' | '/' | '.')
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || ('А'..='Я').contains(&c)
        || matches!(c, '-' | '_' | '/')
}

/// Uppercase the input and fold the per-character variants that both
/// normalizers share: `Ё` → `Е`, multiplication signs → `X`.
fn fold_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        for up in ch.to_uppercase() {
            out.push(match up {
                'Ё' => 'Е',
                '×' | 'Х' | '*' => 'X',
                other => other,
            });
        }
    }
    out
}

/// Collapse repeated whitespace (including newlines and non-breaking
/// spaces) to single ASCII spaces and trim the edges.
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// Canonical form of a product display name.
///
/// Uppercases, folds `Ё`/multiplication-sign/area-unit variants, strips
/// quotes and guillemets, replaces anything outside the kept charset with a
/// space, and collapses whitespace runs. Idempotent: applying it twice gives
/// the same string as applying it once.
pub fn normalize_header(input: &str) -> String {
    let folded = fold_chars(input);
    let folded = AREA_UNIT.replace_all(&folded, "MM2");

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for ch in folded.chars() {
        let keep = match ch {
            '"' | '\'' | '`' | '«' | '»' => None,
            c if is_header_char(c) => Some(c),
            _ => None,
        };
        match keep {
            Some(c) => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push(c);
            }
            // Dropped chars and whitespace both become a single separator;
            // leading/trailing runs vanish because the space is only flushed
            // in front of a kept char.
            None => {
                if !out.is_empty() {
                    pending_space = true;
                }
            }
        }
    }
    out
}

/// Canonical form of a vendor/alternate code.
///
/// Uppercases, removes all whitespace, folds multiplication signs to `X`,
/// and deletes anything outside letters/digits/`-`/`_`/`/`. Idempotent.
pub fn normalize_code(input: &str) -> String {
    fold_chars(input)
        .chars()
        .filter(|c| is_code_char(*c))
        .collect()
}

/// Split a header into comparable tokens: normalize, split on spaces, and
/// drop tokens shorter than two characters. Order is left-to-right occurrence
/// and duplicates are preserved; callers needing a set must dedupe.
pub fn tokenize(input: &str) -> Vec<String> {
    normalize_header(input)
        .split(' ')
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_owned)
        .collect()
}

/// Heuristic: does this line look like a vendor code rather than a name?
///
/// True iff the trimmed input contains at least one ASCII letter and one
/// digit, is at least three characters long, and consists only of letters
/// (either alphabet), digits, `-`, `_`, `/`, `.`, and whitespace. Used to
/// decide whether a code lookup is attempted before the header lookup.
pub fn looks_like_code(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.chars().count() < 3 {
        return false;
    }
    let mut has_letter = false;
    let mut has_digit = false;
    for c in trimmed.chars() {
        has_letter |= c.is_ascii_alphabetic();
        has_digit |= c.is_ascii_digit();
        let allowed = c.is_ascii_alphanumeric()
            || ('А'..='Я').contains(&c)
            || ('а'..='я').contains(&c)
            || matches!(c, '-' | '_' | '/' | '.')
            || c.is_whitespace();
        if !allowed {
            return false;
        }
    }
    has_letter && has_digit
}
