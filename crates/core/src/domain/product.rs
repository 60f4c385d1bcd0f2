use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::purchase::pricing::bounded_unit_price;
use crate::purchase::quantity::parse_leading_integer;

const MAX_FRACTION_DIGITS: usize = 28;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Raw product parameters as they arrive from navigation (query string or form).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub available_stock: u32,
}

impl PurchaseRequest {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: Decimal,
        available_stock: u32,
    ) -> Self {
        Self {
            product_id: ProductId(product_id.into()),
            product_name: product_name.into(),
            unit_price: bounded_unit_price(unit_price),
            available_stock,
        }
    }

    /// Builds a request from untyped navigation parameters.
    ///
    /// Missing or unparseable prices and stock counts fall back to zero; negative
    /// values are treated the same way. Prices above [`MAX_UNIT_PRICE`] are capped.
    ///
    /// [`MAX_UNIT_PRICE`]: crate::purchase::MAX_UNIT_PRICE
    pub fn from_navigation(params: &NavigationParams) -> Self {
        Self {
            product_id: ProductId(trimmed_or_empty(params.id.as_deref())),
            product_name: trimmed_or_empty(params.name.as_deref()),
            unit_price: parse_unit_price(params.price.as_deref()),
            available_stock: parse_available_stock(params.quantity.as_deref()),
        }
    }
}

impl From<&NavigationParams> for PurchaseRequest {
    fn from(params: &NavigationParams) -> Self {
        Self::from_navigation(params)
    }
}

pub fn parse_unit_price(raw: Option<&str>) -> Decimal {
    raw.and_then(parse_leading_decimal).map(bounded_unit_price).unwrap_or(Decimal::ZERO)
}

/// Decimal-prefix parsing: leading whitespace and an optional sign, then digits
/// with an optional fraction and exponent (`"12.50 USD"` → 12.50, `"3.5kg"` →
/// 3.5, `"1.5e1"` → 15). Returns `None` when no digit leads. Magnitudes beyond
/// the decimal range saturate; exponents too small to represent give zero.
pub fn parse_leading_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let integer = &rest[..digit_run(rest)];
    let mut consumed = integer.len();
    let mut fraction = "";
    if rest[consumed..].starts_with('.') {
        let start = consumed + 1;
        fraction = &rest[start..start + digit_run(&rest[start..])];
        consumed = start + fraction.len();
    }
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let integer = match integer.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    let fraction = match &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)] {
        "" => "0",
        digits => digits,
    };
    let sign = if negative { "-" } else { "" };
    let mantissa = format!("{sign}{integer}.{fraction}");

    let exponent = parse_exponent(&rest[consumed..]);
    let parsed = match exponent {
        0 => Decimal::from_str(&mantissa),
        exponent => Decimal::from_scientific(&format!("{mantissa}e{exponent}")),
    };

    Some(parsed.unwrap_or(match (exponent < 0, negative) {
        (true, _) => Decimal::ZERO,
        (false, true) => Decimal::MIN,
        (false, false) => Decimal::MAX,
    }))
}

/// `e`/`E`, an optional sign and at least one digit; anything else is no exponent.
fn parse_exponent(raw: &str) -> i64 {
    let Some(after_marker) = raw.strip_prefix(['e', 'E']) else {
        return 0;
    };
    let unsigned = after_marker.strip_prefix(['+', '-']).unwrap_or(after_marker);
    if digit_run(unsigned) == 0 {
        return 0;
    }
    parse_leading_integer(after_marker).unwrap_or(0)
}

fn digit_run(raw: &str) -> usize {
    raw.bytes().take_while(u8::is_ascii_digit).count()
}

pub fn parse_available_stock(raw: Option<&str>) -> u32 {
    match raw.and_then(parse_leading_integer) {
        Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 0,
    }
}

fn trimmed_or_empty(raw: Option<&str>) -> String {
    raw.map(|value| value.trim().to_string()).unwrap_or_default()
}
