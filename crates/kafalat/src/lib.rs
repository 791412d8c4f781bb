//! Kafalat ledger and violation tracking for sponsored foreign-worker records.

pub mod config;
pub mod error;
pub mod import;
pub mod sponsorship;
pub mod storage;
pub mod telemetry;
