use super::super::status::KafalatStanding;
use super::super::violations::ExpiryTier;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViolationCounts {
    pub kafalat: usize,
    pub iqama_expired: usize,
    pub iqama_critical: usize,
    pub iqama_warning: usize,
    pub organizations_expiring: usize,
}

impl ViolationCounts {
    pub fn iqama_total(&self) -> usize {
        self.iqama_expired + self.iqama_critical + self.iqama_warning
    }

    pub fn total(&self) -> usize {
        self.kafalat + self.iqama_total() + self.organizations_expiring
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KafalatViolationView {
    pub worker_id: String,
    pub worker_name: String,
    pub organization: String,
    pub standing: KafalatStanding,
    pub standing_label: &'static str,
    pub unpaid_months: u32,
    pub paid_months: u32,
    pub total_months_required: u32,
    pub pending_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiryViolationView {
    pub id: String,
    pub name: String,
    /// Sponsoring organization for workers, commercial number for organizations.
    pub detail: String,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub tier: ExpiryTier,
    pub tier_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolationReportSummary {
    pub reference_date: NaiveDate,
    pub counts: ViolationCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kafalat: Vec<KafalatViolationView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iqama: Vec<ExpiryViolationView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<ExpiryViolationView>,
}
