use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Reads a commission field the way a form input is read: leading whitespace is
/// skipped, the longest numeric prefix is taken, anything else counts as zero.
/// The result is rounded to two decimals.
pub fn parse_commission(input: &str) -> Decimal {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return Decimal::ZERO;
    }

    let prefix = trimmed[..end].trim_end_matches('.');
    Decimal::from_str(prefix).map(round_commission).unwrap_or(Decimal::ZERO)
}

pub fn round_commission(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal display form
pub fn format_commission(value: Decimal) -> String {
    format!("{:.2}", round_commission(value))
}
