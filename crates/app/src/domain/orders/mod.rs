//! Orders

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use repository::{MockOrdersRepository, OrdersRepository, PgOrdersRepository};
pub use service::*;
