//! Kafalat status engine and violation classifier.
//!
//! Status and classification are pure functions of a record and a reference
//! date. All ledger mutation goes through the writer in [`ledger`], which keeps
//! at most one entry per calendar month and restricts edits to the selection
//! window; [`service`] composes both with a [`repository::RecordRepository`].

pub mod domain;
pub mod ledger;
pub mod policy;
pub mod report;
pub mod repository;
pub mod service;
pub mod status;
pub mod violations;

#[cfg(test)]
mod tests;

pub use domain::{
    KafalatPayment, MonthKey, MonthKeyError, Organization, OrganizationId, Worker, WorkerId,
};
pub use ledger::{LedgerChange, LedgerError, SelectionWindow};
pub use policy::ViolationPolicy;
pub use report::{DashboardSnapshot, KafalatMetrics, ViolationReport};
pub use repository::{RecordRepository, RepositoryError};
pub use service::{ServiceError, SponsorshipService};
pub use status::{
    compute_status, compute_status_with_policy, exempt_months, latest_advance_month,
    pending_months, KafalatStanding, KafalatStatus,
};
pub use violations::{
    classify_iqama_expiry, rank_iqama_violations, rank_kafalat_violations, ExpiryClassification,
    ExpiryTier, IqamaViolation, KafalatViolation, OrganizationExpiry, ViolationClassifier,
    ViolationFilter, ViolationKind,
};
