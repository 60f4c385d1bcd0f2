pub mod product;
pub mod registration;
