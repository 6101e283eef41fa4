//! Configuration-form test suite
//!
//! Scenario data for the monitored application's configuration pages, built
//! on the `webcheck-harness` crate. The suite contributes three things:
//!
//! - `options`: typed dropdown option sets (check types, graph types)
//! - `targets`: locators, banners, and backing-table queries per form
//! - `providers`: the data tables, one scenario row per record
//!
//! The live sweep lives in `tests/sweep.rs` and only runs when a target
//! application is configured; everything in this library is testable offline.

pub mod options;
pub mod providers;
pub mod targets;
