//! Swedish display formatting for amounts and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// `33813` → `33 813,00 SEK`.
pub fn money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{fraction} {currency}")
}

pub fn percent(rate: Decimal) -> String {
    format!("{} %", rate.normalize().to_string().replace('.', ","))
}

pub fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_comma_decimals() {
        assert_eq!(money(Decimal::from(33813), "SEK"), "33 813,00 SEK");
        assert_eq!(money(Decimal::new(22375, 2), "SEK"), "223,75 SEK");
        assert_eq!(money(Decimal::from(1_234_567), "EUR"), "1 234 567,00 EUR");
        assert_eq!(money(Decimal::new(-5050, 2), "SEK"), "-50,50 SEK");
        assert_eq!(money(Decimal::ZERO, "SEK"), "0,00 SEK");
    }

    #[test]
    fn vat_rate_drops_trailing_zeros() {
        assert_eq!(percent(Decimal::new(2500, 2)), "25 %");
        assert_eq!(percent(Decimal::new(125, 1)), "12,5 %");
    }
}
