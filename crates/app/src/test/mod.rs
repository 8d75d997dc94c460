//! Test utilities


pub use db::TestDb;
