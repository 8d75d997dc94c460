//! Shared application services and persistence modules.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;
pub mod retry;
pub mod settings;

#[cfg(test)]
mod test;

mod uuids;
