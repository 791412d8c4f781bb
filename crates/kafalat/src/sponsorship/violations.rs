use super::domain::{Organization, OrganizationId, Worker, WorkerId};
use super::policy::ViolationPolicy;
use super::status::{compute_status_with_policy, KafalatStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    Expired,
    Critical,
    Warning,
    Valid,
}

impl ExpiryTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Valid => "Valid",
        }
    }

    pub fn classify(days_remaining: i64, policy: &ViolationPolicy) -> Self {
        if days_remaining < 0 {
            Self::Expired
        } else if days_remaining <= policy.critical_within_days() {
            Self::Critical
        } else if days_remaining <= policy.warning_within_days() {
            Self::Warning
        } else {
            Self::Valid
        }
    }

    pub const fn is_violation(self) -> bool {
        !matches!(self, Self::Valid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryClassification {
    /// Signed; negative once the document has expired.
    pub days_remaining: i64,
    pub tier: ExpiryTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KafalatViolation {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub organization: String,
    pub status: KafalatStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IqamaViolation {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub organization: String,
    pub expiry_date: NaiveDate,
    pub classification: ExpiryClassification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationExpiry {
    pub organization_id: OrganizationId,
    pub name: String,
    pub commercial_number: String,
    pub expiry_date: NaiveDate,
    pub classification: ExpiryClassification,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    #[default]
    All,
    Iqama,
    Kafalat,
    Organization,
}

impl ViolationKind {
    pub fn includes(self, section: ViolationKind) -> bool {
        self == Self::All || self == section
    }
}

/// Narrows a violation report by section and sponsoring organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationFilter {
    pub kind: ViolationKind,
    pub organization: Option<String>,
}

impl ViolationFilter {
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::All,
            organization: Some(name.into()),
        }
    }

    fn matches_name(&self, candidate: &str) -> bool {
        match self.organization.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => candidate.trim().eq_ignore_ascii_case(wanted),
        }
    }

    pub fn matches_worker(&self, worker: &Worker) -> bool {
        self.matches_name(&worker.organization)
    }

    pub fn matches_organization(&self, organization: &Organization) -> bool {
        self.matches_name(&organization.name)
    }
}

/// Applies a [`ViolationPolicy`] across worker and organization collections.
///
/// Every method is a read-only projection of its inputs.
#[derive(Debug, Clone, Default)]
pub struct ViolationClassifier {
    policy: ViolationPolicy,
}

impl ViolationClassifier {
    pub fn new(policy: ViolationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ViolationPolicy {
        &self.policy
    }

    pub fn classify_expiry(
        &self,
        expiry: NaiveDate,
        reference_date: NaiveDate,
    ) -> ExpiryClassification {
        let days_remaining = (expiry - reference_date).num_days();
        ExpiryClassification {
            days_remaining,
            tier: ExpiryTier::classify(days_remaining, &self.policy),
        }
    }

    pub fn classify_iqama_expiry(
        &self,
        worker: &Worker,
        reference_date: NaiveDate,
    ) -> Option<ExpiryClassification> {
        worker
            .iqama_expiry_date
            .map(|expiry| self.classify_expiry(expiry, reference_date))
    }

    pub fn classify_organization_expiry(
        &self,
        organization: &Organization,
        reference_date: NaiveDate,
    ) -> Option<ExpiryClassification> {
        organization
            .expiry_date
            .map(|expiry| self.classify_expiry(expiry, reference_date))
    }

    /// Workers in arrears, most unpaid months first, then by name.
    pub fn rank_kafalat_violations<'a, I>(
        &self,
        workers: I,
        reference_date: NaiveDate,
    ) -> Vec<KafalatViolation>
    where
        I: IntoIterator<Item = &'a Worker>,
    {
        let mut violations: Vec<KafalatViolation> = workers
            .into_iter()
            .filter_map(|worker| {
                let status = compute_status_with_policy(worker, reference_date, &self.policy);
                status.is_in_arrears().then(|| KafalatViolation {
                    worker_id: worker.id.clone(),
                    worker_name: worker.name.clone(),
                    organization: worker.organization.clone(),
                    status,
                })
            })
            .collect();

        violations.sort_by(|a, b| {
            b.status
                .unpaid_months
                .cmp(&a.status.unpaid_months)
                .then_with(|| a.worker_name.cmp(&b.worker_name))
                .then_with(|| a.worker_id.cmp(&b.worker_id))
        });
        violations
    }

    /// Iqamas expired or expiring inside the warning window, most urgent first.
    pub fn rank_iqama_violations<'a, I>(
        &self,
        workers: I,
        reference_date: NaiveDate,
    ) -> Vec<IqamaViolation>
    where
        I: IntoIterator<Item = &'a Worker>,
    {
        let mut violations: Vec<IqamaViolation> = workers
            .into_iter()
            .filter_map(|worker| {
                let expiry_date = worker.iqama_expiry_date?;
                let classification = self.classify_expiry(expiry_date, reference_date);
                classification.tier.is_violation().then(|| IqamaViolation {
                    worker_id: worker.id.clone(),
                    worker_name: worker.name.clone(),
                    organization: worker.organization.clone(),
                    expiry_date,
                    classification,
                })
            })
            .collect();

        violations.sort_by(|a, b| {
            a.classification
                .days_remaining
                .cmp(&b.classification.days_remaining)
                .then_with(|| a.worker_name.cmp(&b.worker_name))
                .then_with(|| a.worker_id.cmp(&b.worker_id))
        });
        violations
    }

    pub fn rank_organization_expiries<'a, I>(
        &self,
        organizations: I,
        reference_date: NaiveDate,
    ) -> Vec<OrganizationExpiry>
    where
        I: IntoIterator<Item = &'a Organization>,
    {
        let mut expiries: Vec<OrganizationExpiry> = organizations
            .into_iter()
            .filter_map(|organization| {
                let expiry_date = organization.expiry_date?;
                let classification = self.classify_expiry(expiry_date, reference_date);
                classification.tier.is_violation().then(|| OrganizationExpiry {
                    organization_id: organization.id.clone(),
                    name: organization.name.clone(),
                    commercial_number: organization.commercial_number.clone(),
                    expiry_date,
                    classification,
                })
            })
            .collect();

        expiries.sort_by(|a, b| {
            a.classification
                .days_remaining
                .cmp(&b.classification.days_remaining)
                .then_with(|| a.name.cmp(&b.name))
        });
        expiries
    }
}

pub fn classify_iqama_expiry(
    worker: &Worker,
    reference_date: NaiveDate,
) -> Option<ExpiryClassification> {
    ViolationClassifier::default().classify_iqama_expiry(worker, reference_date)
}

pub fn rank_kafalat_violations(
    workers: &[Worker],
    reference_date: NaiveDate,
) -> Vec<KafalatViolation> {
    ViolationClassifier::default().rank_kafalat_violations(workers, reference_date)
}

pub fn rank_iqama_violations(workers: &[Worker], reference_date: NaiveDate) -> Vec<IqamaViolation> {
    ViolationClassifier::default().rank_iqama_violations(workers, reference_date)
}
