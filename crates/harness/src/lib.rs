//! webcheck harness
//!
//! A data-driven UI-assertion harness for form-heavy web applications:
//! named data providers feed one scenario runner that drives an
//! authenticated browser session through navigate → fill → submit, then
//! verifies either a success banner plus persisted state or a failure
//! banner plus its listed field errors. A content-hash guard proves that
//! no-op flows leave the backing store byte-identical.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                           │
//! │   ProviderRegistry ──▶ one invocation per TestCase row       │
//! │        │                                                     │
//! │        ▼                                                     │
//! │   Session (WebDriver wire) ──▶ Page (click/type/select/wait) │
//! │        │                                                     │
//! │        ▼                                                     │
//! │   Verifier (accumulating assertions)                         │
//! │   Store (read-only SQL: counts, projections, digests)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows run strictly sequentially; isolation between rows comes from
//! distinct entity names in the data tables, not from locking. A row-scoped
//! failure (`ElementNotReady`, `AssertionFailed`) fails its row only; a
//! `Session` or `DataProvider` failure aborts the sweep.

pub mod check;
pub mod config;
pub mod driver;
pub mod error;
pub mod page;
pub mod record;
pub mod runner;
pub mod session;
pub mod store;
pub mod target;

pub use check::Verifier;
pub use config::{Credentials, DriverConfig, HarnessConfig};
pub use error::{Error, Result};
pub use page::{Locator, Page};
pub use record::{FieldValue, Outcome, PostChecks, ProviderRegistry, SubRow, TestCase};
pub use runner::{Phase, RowResult, ScenarioRunner, SweepSummary};
pub use store::{Digest, Store};
pub use target::{Control, DeleteFlow, FormTarget, RepeatSection, TableQueries};
