//! Binary Craft Domain Concerns

pub mod carts;
pub mod orders;
pub mod users;
pub mod validation;
