//! Brazilian-locale formatting and parsing helpers
//!
//! Presentation only: the calculation core works on raw `Decimal`s and dates
//! and never formats anything.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Format with `.` thousands and `,` decimal separators, two decimals:
/// `1234.5` -> `"1.234,50"`.
///
/// # Examples
/// ```
/// use rendimento::utils::format_decimal_br;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal_br(dec!(1234567.891)), "1.234.567,89");
/// assert_eq!(format_decimal_br(dec!(-0.5)), "-0,50");
/// ```
pub fn format_decimal_br(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("{}{},{}", sign, grouped, decimal_part)
}

/// Format as Brazilian Real: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use rendimento::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_decimal_br(value))
}

/// Format a percentage with up to four decimals: "12,3456%"
pub fn format_percent(value: Decimal) -> String {
    let normalized = value
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = normalized.to_string().replace('.', ",");
    format!("{}%", text)
}

/// Parse a Brazilian-formatted number ("1.234,56", "12,5%").
pub fn parse_decimal_br(input: &str) -> Result<Decimal> {
    let cleaned = input
        .trim()
        .replace('.', "")
        .replace(',', ".")
        .replace('%', "");
    if cleaned.is_empty() {
        return Err(anyhow!("Empty decimal input"));
    }
    Decimal::from_str(&cleaned).map_err(|err| anyhow!("Invalid decimal '{}': {}", input, err))
}

/// Parse an amount written either as `1234.56` or in Brazilian notation.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim().trim_start_matches("R$").trim();
    if trimmed.contains(',') {
        return parse_decimal_br(trimmed);
    }
    Decimal::from_str(trimmed.trim_end_matches('%'))
        .map_err(|err| anyhow!("Invalid amount '{}': {}", input, err))
}

/// Parse a date as `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| anyhow!("Invalid date '{}': expected YYYY-MM-DD or DD/MM/YYYY", input))
}
