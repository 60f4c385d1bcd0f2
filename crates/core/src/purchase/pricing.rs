use rust_decimal::{Decimal, RoundingStrategy};

pub const MONEY_SCALE: u32 = 2;

/// Highest accepted unit price (100 trillion). Any `u32` quantity times this
/// still fits the decimal range at two decimal places.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0x107A_4000, 0x5AF3, 0, false, 0);

/// Clamps a unit price into `0..=MAX_UNIT_PRICE`.
pub fn bounded_unit_price(unit_price: Decimal) -> Decimal {
    unit_price.clamp(Decimal::ZERO, MAX_UNIT_PRICE)
}

/// `unit_price × quantity`, rounded half away from zero to cents. The unit
/// price is bounded first, so the product never overflows.
pub fn compute_total(unit_price: Decimal, quantity: u32) -> Decimal {
    to_money(bounded_unit_price(unit_price) * Decimal::from(quantity))
}

/// Renders an amount with exactly two decimal places (`30` → `"30.00"`).
pub fn format_money(amount: Decimal) -> String {
    to_money(amount).to_string()
}

fn to_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}
