//! Hunt summary table parsing from OCR text.
//!
//! Real OCR output (English model over a Portuguese screen):
//!   Detahes Recargas Novo grupo
//!   Item Contagem Valor
//!   ey Potion 5 1200
//!   | Super Potion 2 35,5
//!   Ganho total 190 dl
//!   Página 1/2 Redefinir
//!
//! Rows are split on whitespace and read with three strategies, tried in
//! order. The first that yields a count and a value decides the row.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use loot_types::ExtractedItem;

use crate::noise::{line_has_role, NoiseRole, CURRENCY_MARKER, TOTAL_WORD};
use crate::sanitize::sanitize_item_name;

/// Counts at or above this are misread prices, not stack sizes.
const MAX_COUNT: u32 = 10_000;

/// Values above this are assumed to have lost their decimal separator.
/// Approximate: a genuine price above 1000 is also divided by 10.
const MAGNITUDE_LIMIT: f64 = 1000.0;

static RE_FLOAT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*(?:\.[0-9]*)?").unwrap());

// ── Numeric token readers ────────────────────────────────────────────────

/// Read a price-like token: keep digits, '.' and ',', treat the first ','
/// as a decimal point and parse the leading number.
pub fn parse_value_token(token: &str) -> Option<f64> {
    let kept: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let normalized = kept.replacen(',', ".", 1);
    let prefix = RE_FLOAT_PREFIX.find(&normalized)?.as_str();
    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let prefix = prefix.trim_end_matches('.');
    let prefix = if prefix.starts_with('.') {
        format!("0{prefix}")
    } else {
        prefix.to_string()
    };
    prefix.parse().ok()
}

/// Read a count-like token: keep only its digits.
pub fn parse_count_token(token: &str) -> Option<u32> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn valid_count(count: u32) -> bool {
    count > 0 && count < MAX_COUNT
}

// ── Row strategies ───────────────────────────────────────────────────────

/// A row split into its raw name and numbers, before name cleanup.
#[derive(Debug, Clone, PartialEq)]
struct RawRow {
    name: String,
    count: u32,
    value: f64,
}

/// Strategy a: from the right, first positive number is the value, the next
/// positive integer below the count limit is the count.
fn scan_from_right(tokens: &[&str]) -> Option<RawRow> {
    let mut value: Option<f64> = None;
    for (j, token) in tokens.iter().enumerate().rev() {
        let Some(num) = parse_value_token(token) else {
            continue;
        };
        if num <= 0.0 {
            continue;
        }
        match value {
            None => value = Some(num),
            Some(v) => {
                if num < MAX_COUNT as f64 && num.fract() == 0.0 {
                    let name = tokens[..j].join(" ");
                    if name.is_empty() {
                        return None;
                    }
                    return Some(RawRow {
                        name,
                        count: num as u32,
                        value: v,
                    });
                }
            }
        }
    }
    None
}

/// Strategy b: last token is the value, the one before it the count.
fn last_two_columns(tokens: &[&str]) -> Option<RawRow> {
    if tokens.len() < 3 {
        return None;
    }
    let n = tokens.len();
    let value = parse_value_token(tokens[n - 1]).filter(|v| *v > 0.0)?;
    let count = parse_count_token(tokens[n - 2]).filter(|c| valid_count(*c))?;
    Some(RawRow {
        name: tokens[..n - 2].join(" "),
        count,
        value,
    })
}

/// Strategy c: a bare "count value" pair, where the count token doubles as name.
fn count_value_pair(tokens: &[&str]) -> Option<RawRow> {
    if tokens.len() != 2 {
        return None;
    }
    let value = parse_value_token(tokens[1]).filter(|v| *v > 0.0)?;
    let count = parse_count_token(tokens[0]).filter(|c| valid_count(*c))?;
    Some(RawRow {
        name: tokens[0].to_string(),
        count,
        value,
    })
}

fn finish_row(raw: RawRow) -> Option<ExtractedItem> {
    let item = sanitize_item_name(&raw.name);
    if item.is_empty() {
        debug!(raw = %raw.name, "row dropped: no item name left");
        return None;
    }
    let value = if raw.value > MAGNITUDE_LIMIT {
        debug!(item = %item, value = raw.value, "value looks like a lost decimal, dividing by 10");
        raw.value / 10.0
    } else {
        raw.value
    };
    Some(ExtractedItem::new(item, raw.count, value))
}

/// Parse one table row. `None` when no strategy yields a usable row.
pub fn parse_row(line: &str) -> Option<ExtractedItem> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    // An accepted right-to-left read settles the row, even when its name
    // sanitizes to nothing.
    if let Some(raw) = scan_from_right(&tokens) {
        return finish_row(raw);
    }
    if let Some(raw) = last_two_columns(&tokens) {
        return finish_row(raw);
    }
    let raw = count_value_pair(&tokens)?;
    finish_row(raw).filter(|item| !item.item.chars().all(|c| c.is_ascii_digit()))
}

// ── Table scanning ───────────────────────────────────────────────────────

fn is_header(lower: &str) -> bool {
    line_has_role(lower, NoiseRole::Header)
}

fn is_footer(lower: &str) -> bool {
    line_has_role(lower, NoiseRole::Footer)
        || (lower.contains(TOTAL_WORD) && lower.contains(CURRENCY_MARKER))
}

/// Parse every item row of a hunt summary table out of raw OCR text.
///
/// Lines before the column header are ignored; parsing stops at the grand
/// total or pagination footer.
pub fn parse_table(text: &str) -> Vec<ExtractedItem> {
    let mut items = Vec::new();
    let mut in_table = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();

        if is_header(&lower) {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        if is_footer(&lower) {
            break;
        }

        match parse_row(line) {
            Some(item) => items.push(item),
            None => debug!(line, "skipped table line"),
        }
    }

    items
}
