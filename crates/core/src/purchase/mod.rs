pub mod pricing;
pub mod quantity;

pub use pricing::{bounded_unit_price, compute_total, format_money, MAX_UNIT_PRICE};
pub use quantity::{initial_draft, set_quantity, PurchaseDraft, QuantityError};
