use super::super::domain::{Organization, Worker};
use super::super::violations::{
    ExpiryTier, IqamaViolation, KafalatViolation, OrganizationExpiry, ViolationClassifier,
    ViolationFilter, ViolationKind,
};
use super::views::{
    ExpiryViolationView, KafalatViolationView, ViolationCounts, ViolationReportSummary,
};
use chrono::NaiveDate;

/// Ranked violation lists for one reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationReport {
    pub reference_date: NaiveDate,
    pub kafalat: Vec<KafalatViolation>,
    pub iqama: Vec<IqamaViolation>,
    pub organizations: Vec<OrganizationExpiry>,
}

impl ViolationReport {
    pub fn build(
        classifier: &ViolationClassifier,
        workers: &[Worker],
        organizations: &[Organization],
        reference_date: NaiveDate,
        filter: &ViolationFilter,
    ) -> Self {
        let scoped_workers: Vec<&Worker> = workers
            .iter()
            .filter(|worker| filter.matches_worker(worker))
            .collect();

        let kafalat = if filter.kind.includes(ViolationKind::Kafalat) {
            classifier.rank_kafalat_violations(scoped_workers.iter().copied(), reference_date)
        } else {
            Vec::new()
        };

        let iqama = if filter.kind.includes(ViolationKind::Iqama) {
            classifier.rank_iqama_violations(scoped_workers.iter().copied(), reference_date)
        } else {
            Vec::new()
        };

        let organizations = if filter.kind.includes(ViolationKind::Organization) {
            classifier.rank_organization_expiries(
                organizations
                    .iter()
                    .filter(|organization| filter.matches_organization(organization)),
                reference_date,
            )
        } else {
            Vec::new()
        };

        Self {
            reference_date,
            kafalat,
            iqama,
            organizations,
        }
    }

    pub fn counts(&self) -> ViolationCounts {
        let mut counts = ViolationCounts {
            kafalat: self.kafalat.len(),
            organizations_expiring: self.organizations.len(),
            ..ViolationCounts::default()
        };
        for violation in &self.iqama {
            match violation.classification.tier {
                ExpiryTier::Expired => counts.iqama_expired += 1,
                ExpiryTier::Critical => counts.iqama_critical += 1,
                ExpiryTier::Warning => counts.iqama_warning += 1,
                ExpiryTier::Valid => {}
            }
        }
        counts
    }

    pub fn summary(&self) -> ViolationReportSummary {
        let kafalat = self
            .kafalat
            .iter()
            .map(|violation| KafalatViolationView {
                worker_id: violation.worker_id.0.clone(),
                worker_name: violation.worker_name.clone(),
                organization: violation.organization.clone(),
                standing: violation.status.standing,
                standing_label: violation.status.standing.label(),
                unpaid_months: violation.status.unpaid_months,
                paid_months: violation.status.paid_months,
                total_months_required: violation.status.total_months_required,
                pending_amount: violation.status.pending_amount,
            })
            .collect();

        let iqama = self
            .iqama
            .iter()
            .map(|violation| ExpiryViolationView {
                id: violation.worker_id.0.clone(),
                name: violation.worker_name.clone(),
                detail: violation.organization.clone(),
                expiry_date: violation.expiry_date,
                days_remaining: violation.classification.days_remaining,
                tier: violation.classification.tier,
                tier_label: violation.classification.tier.label(),
            })
            .collect();

        let organizations = self
            .organizations
            .iter()
            .map(|expiry| ExpiryViolationView {
                id: expiry.organization_id.0.clone(),
                name: expiry.name.clone(),
                detail: expiry.commercial_number.clone(),
                expiry_date: expiry.expiry_date,
                days_remaining: expiry.classification.days_remaining,
                tier: expiry.classification.tier,
                tier_label: expiry.classification.tier.label(),
            })
            .collect();

        ViolationReportSummary {
            reference_date: self.reference_date,
            counts: self.counts(),
            kafalat,
            iqama,
            organizations,
        }
    }
}
