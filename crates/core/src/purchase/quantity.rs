use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::PurchaseRequest;
use crate::purchase::pricing::{compute_total, format_money};

pub const MIN_QUANTITY: u32 = 1;

/// Inline validation problem with the requested quantity. The display text is
/// what the storefront shows next to the quantity input.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuantityError {
    #[error("Quantity must be at least 1")]
    BelowMinimum,
    #[error("Quantity cannot exceed available stock of {available}")]
    ExceedsStock { available: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub requested_quantity: u32,
    pub computed_total: Decimal,
    pub validation_error: Option<QuantityError>,
}

impl PurchaseDraft {
    pub fn is_valid(&self) -> bool {
        self.validation_error.is_none()
    }

    /// The inline message, or an empty string when the quantity is acceptable.
    pub fn validation_message(&self) -> String {
        self.validation_error.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    pub fn total_display(&self) -> String {
        format_money(self.computed_total)
    }
}

/// The draft shown before the buyer touches the quantity input.
pub fn initial_draft(request: &PurchaseRequest) -> PurchaseDraft {
    draft_for(request, Some(i64::from(MIN_QUANTITY)))
}

/// Validates raw quantity input against the request and recomputes the total.
///
/// Unparseable input and values below one clamp to one; values above the
/// available stock clamp to the stock. The total always reflects the clamped
/// quantity.
pub fn set_quantity(request: &PurchaseRequest, raw: &str) -> PurchaseDraft {
    draft_for(request, parse_leading_integer(raw))
}

fn draft_for(request: &PurchaseRequest, value: Option<i64>) -> PurchaseDraft {
    let available = request.available_stock;
    let (quantity, validation_error) = match value {
        Some(value) if value >= i64::from(MIN_QUANTITY) && value <= i64::from(available) => {
            (u32::try_from(value).unwrap_or(available), None)
        }
        Some(value) if value > i64::from(available) => {
            (available, Some(QuantityError::ExceedsStock { available }))
        }
        _ => (MIN_QUANTITY, Some(QuantityError::BelowMinimum)),
    };

    PurchaseDraft {
        requested_quantity: quantity,
        computed_total: compute_total(request.unit_price, quantity),
        validation_error,
    }
}

/// Integer-prefix parsing: leading whitespace and an optional sign, then as many
/// digits as are present (`"12abc"` → 12, `"3.7"` → 3). Returns `None` when no
/// digit follows. Values beyond the `i64` range saturate.
pub fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }

    seen_digit.then_some(value)
}
