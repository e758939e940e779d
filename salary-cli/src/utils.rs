use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use salary_core::calculations::common::round_half_up;

static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)€|eur").expect("currency pattern is valid"));

// `\s` is Unicode-aware, so this also covers no-break and narrow no-break spaces.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d*,\d{1,2}$").expect("decimal comma pattern is valid"));

/// Normalizes a typed amount for decimal parsing.
///
/// Strips `€`/`EUR` and all whitespace, then settles the separators:
/// when both `,` and `.` appear the later one is the decimal point; a lone
/// comma followed by one or two digits is a decimal comma; any other comma
/// separates thousands.
fn normalize_decimal_input(s: &str) -> String {
    let stripped = CURRENCY.replace_all(s, "");
    let compact = WHITESPACE.replace_all(&stripped, "");

    match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), None) if DECIMAL_COMMA.is_match(&compact) => compact.replace(',', "."),
        _ => compact.replace(',', ""),
    }
}

/// Parses a typed amount into an optional [`Decimal`].
///
/// Accepts `"1,234.56"`, `"1 234,56"`, `"€2000"` and `"2000 EUR"`.
/// Returns `None` for empty or whitespace-only input, or when parsing fails
/// (logs a warning on parse failure).
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        None
    } else {
        normalized.parse().map_or_else(
            |e| {
                tracing::warn!(input = %s, "invalid optional decimal: {}", e);
                None
            },
            Some,
        )
    }
}

/// Formats an amount as euros with two decimals, e.g. `€1642.00`.
pub fn format_eur(amount: Decimal) -> String {
    format!("€{}", round_half_up(amount))
}

/// Formats a percentage value (`5` for 5%) with two decimals.
pub fn format_percent(percent: Decimal) -> String {
    format!("{}%", round_half_up(percent))
}
