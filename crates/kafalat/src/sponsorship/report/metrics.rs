use super::super::domain::Worker;
use super::super::policy::ViolationPolicy;
use super::super::status::{compute_status_with_policy, KafalatStanding};
use super::views::ViolationCounts;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Kafalat totals across the whole workforce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KafalatMetrics {
    /// Sum of amounts on non-exempt ledger records.
    pub total_collected: Decimal,
    pub pending_amount: Decimal,
    pub workers_up_to_date: usize,
    pub workers_pending: usize,
    pub workers_overdue: usize,
    pub workers_not_started: usize,
}

impl KafalatMetrics {
    pub fn collect<'a, I>(workers: I, reference_date: NaiveDate, policy: &ViolationPolicy) -> Self
    where
        I: IntoIterator<Item = &'a Worker>,
    {
        workers.into_iter().fold(Self::default(), |mut metrics, worker| {
            let status = compute_status_with_policy(worker, reference_date, policy);
            let collected: Decimal = worker
                .kafalat_payments
                .iter()
                .filter(|payment| !payment.is_exempt)
                .map(|payment| payment.amount.max(Decimal::ZERO))
                .fold(Decimal::ZERO, |sum, amount| sum.saturating_add(amount));

            metrics.total_collected = metrics.total_collected.saturating_add(collected);
            metrics.pending_amount = metrics.pending_amount.saturating_add(status.pending_amount);
            match status.standing {
                KafalatStanding::UpToDate => metrics.workers_up_to_date += 1,
                KafalatStanding::Pending => metrics.workers_pending += 1,
                KafalatStanding::Overdue => metrics.workers_overdue += 1,
                KafalatStanding::NotStarted => metrics.workers_not_started += 1,
            }
            metrics
        })
    }

    pub fn workers_in_arrears(&self) -> usize {
        self.workers_pending + self.workers_overdue
    }
}

/// Figures backing the dashboard landing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub reference_date: NaiveDate,
    pub total_workers: usize,
    pub total_organizations: usize,
    pub kafalat: KafalatMetrics,
    pub violations: ViolationCounts,
}
