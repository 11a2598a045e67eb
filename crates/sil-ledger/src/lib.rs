//! Append-mostly audit ledger for the School-records Integrity Ledger (SIL).
//!
//! This crate is the heart of SIL. It provides:
//! - [`LedgerTransaction`]: one row per fingerprinting event
//! - [`LedgerStore`] trait boundary with an in-memory implementation
//! - [`InitiatorResolver`]: the ordered fallback chain that attributes a
//!   transaction to an actor
//! - [`LedgerRecorder`]: the fire-and-log append path driven by domain
//!   writes — a ledger failure never fails the originating write
//! - [`RetryCoordinator`]: advances non-terminal transactions toward
//!   `Confirmed`, idempotently, with per-row compare-and-swap
//! - Listing filters, pagination, and aggregate stats

pub mod error;
pub mod filter;
pub mod initiator;
pub mod memory;
pub mod recorder;
pub mod retry;
pub mod traits;
pub mod transaction;

pub use error::LedgerError;
pub use filter::{TransactionFilter, TxSortKey};
pub use initiator::{CallerContext, InitiatorResolver, Provenance};
pub use memory::InMemoryLedger;
pub use recorder::{ConfirmMode, LedgerRecorder, RecordOutcome};
pub use retry::{ConfirmationBackend, LocalConfirmation, RetryCoordinator};
pub use traits::{CasOutcome, LedgerStats, LedgerStore, NewTransaction};
pub use transaction::LedgerTransaction;
