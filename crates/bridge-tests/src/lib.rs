//! End-to-end tests for the SQL facade
//!
//! This crate ships the in-memory [`engine::TestEngine`] and exercises the
//! whole path: DDL through both initialization passes, client statements
//! through the DML dispatcher, commit change streams into materialized
//! views, and property-based checks on the value codec.

pub mod engine;

#[cfg(test)]
mod dml_scenarios;
#[cfg(test)]
mod proptest_codec;
