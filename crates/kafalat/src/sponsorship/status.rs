use super::domain::{KafalatPayment, MonthKey, Worker};
use super::policy::ViolationPolicy;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KafalatStanding {
    UpToDate,
    Pending,
    Overdue,
    NotStarted,
}

impl KafalatStanding {
    pub const fn ordered() -> [Self; 4] {
        [Self::Overdue, Self::Pending, Self::UpToDate, Self::NotStarted]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UpToDate => "Up to Date",
            Self::Pending => "Pending",
            Self::Overdue => "Overdue",
            Self::NotStarted => "Not Started",
        }
    }

    pub fn classify(unpaid_months: u32, policy: &ViolationPolicy) -> Self {
        if unpaid_months == 0 {
            Self::UpToDate
        } else if unpaid_months < policy.overdue_after_months() {
            Self::Pending
        } else {
            Self::Overdue
        }
    }
}

/// Arrears position of one worker as of a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KafalatStatus {
    pub standing: KafalatStanding,
    pub unpaid_months: u32,
    pub pending_amount: Decimal,
    pub total_months_required: u32,
    pub paid_months: u32,
}

impl KafalatStatus {
    pub fn not_started() -> Self {
        Self {
            standing: KafalatStanding::NotStarted,
            unpaid_months: 0,
            pending_amount: Decimal::ZERO,
            total_months_required: 0,
            paid_months: 0,
        }
    }

    pub fn is_in_arrears(&self) -> bool {
        self.unpaid_months > 0
    }
}

/// Compute kafalat status with the default thresholds.
pub fn compute_status(worker: &Worker, reference_date: NaiveDate) -> KafalatStatus {
    compute_status_with_policy(worker, reference_date, &ViolationPolicy::default())
}

pub fn compute_status_with_policy(
    worker: &Worker,
    reference_date: NaiveDate,
    policy: &ViolationPolicy,
) -> KafalatStatus {
    let Some(start) = worker.kafalat_start_date else {
        return KafalatStatus::not_started();
    };

    let elapsed = MonthKey::from_date(start).months_until(MonthKey::from_date(reference_date));
    if elapsed < 0 {
        return KafalatStatus::not_started();
    }

    let total_months_required = u32::try_from(elapsed + 1).unwrap_or(u32::MAX);
    let tally = MonthTally::from_payments(&worker.kafalat_payments);
    let effective_required = total_months_required.saturating_sub(tally.exempt);
    let unpaid_months = effective_required.saturating_sub(tally.paid);
    let pending_amount = Decimal::from(unpaid_months)
        .checked_mul(worker.monthly_amount())
        .unwrap_or(Decimal::MAX);

    KafalatStatus {
        standing: KafalatStanding::classify(unpaid_months, policy),
        unpaid_months,
        pending_amount,
        total_months_required,
        paid_months: tally.paid,
    }
}

/// Months from the start month through the reference month with no ledger
/// record at all, oldest first.
pub fn pending_months(worker: &Worker, reference_date: NaiveDate) -> Vec<MonthKey> {
    let Some(start) = worker.kafalat_start_date else {
        return Vec::new();
    };

    let recorded = distinct_months(&worker.kafalat_payments);
    MonthKey::from_date(start)
        .through(MonthKey::from_date(reference_date))
        .filter(|month| !recorded.contains_key(month))
        .collect()
}

/// Latest paid (non-exempt) month strictly after the reference month.
pub fn latest_advance_month(worker: &Worker, reference_date: NaiveDate) -> Option<MonthKey> {
    let current = MonthKey::from_date(reference_date);
    distinct_months(&worker.kafalat_payments)
        .into_iter()
        .filter(|(month, exempt)| !exempt && *month > current)
        .map(|(month, _)| month)
        .max()
}

pub fn exempt_months(worker: &Worker) -> Vec<MonthKey> {
    distinct_months(&worker.kafalat_payments)
        .into_iter()
        .filter_map(|(month, exempt)| exempt.then_some(month))
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
struct MonthTally {
    paid: u32,
    exempt: u32,
}

impl MonthTally {
    fn from_payments(payments: &[KafalatPayment]) -> Self {
        distinct_months(payments)
            .values()
            .fold(Self::default(), |mut tally, exempt| {
                if *exempt {
                    tally.exempt = tally.exempt.saturating_add(1);
                } else {
                    tally.paid = tally.paid.saturating_add(1);
                }
                tally
            })
    }
}

/// Distinct ledger months mapped to whether any record for that month is exempt.
fn distinct_months(payments: &[KafalatPayment]) -> BTreeMap<MonthKey, bool> {
    let mut months = BTreeMap::new();
    for payment in payments {
        let exempt = months.entry(payment.month).or_insert(false);
        *exempt |= payment.is_exempt;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn month(raw: &str) -> MonthKey {
        raw.parse().expect("valid month")
    }

    fn worker_with(months: &[&str]) -> Worker {
        let mut worker = Worker::new("w-1", "Ahmed");
        worker.kafalat_start_date = Some(date(2023, 1, 1));
        worker.kafalat_amount = Some(Decimal::from(500));
        worker.kafalat_payments = months
            .iter()
            .map(|raw| KafalatPayment::paid(month(raw), Decimal::from(500), date(2023, 1, 1)))
            .collect();
        worker
    }

    #[test]
    fn missing_start_date_is_not_started() {
        let mut worker = worker_with(&["2023-01"]);
        worker.kafalat_start_date = None;

        assert_eq!(compute_status(&worker, date(2023, 6, 1)), KafalatStatus::not_started());
        assert!(pending_months(&worker, date(2023, 6, 1)).is_empty());
    }

    #[test]
    fn future_start_date_has_no_obligation() {
        let worker = worker_with(&[]);
        let status = compute_status(&worker, date(2022, 12, 31));
        assert_eq!(status.standing, KafalatStanding::NotStarted);
        assert_eq!(status.total_months_required, 0);
        assert_eq!(status.pending_amount, Decimal::ZERO);
    }

    #[test]
    fn day_of_month_does_not_skew_month_count() {
        let mut worker = worker_with(&[]);
        worker.kafalat_start_date = Some(date(2023, 1, 31));
        let status = compute_status(&worker, date(2023, 2, 1));
        assert_eq!(status.total_months_required, 2);
        assert_eq!(status.unpaid_months, 2);
        assert_eq!(status.standing, KafalatStanding::Pending);
    }

    #[test]
    fn duplicate_month_records_count_once() {
        let worker = worker_with(&["2023-01", "2023-01", "2023-02"]);
        let status = compute_status(&worker, date(2023, 3, 10));
        assert_eq!(status.paid_months, 2);
        assert_eq!(status.unpaid_months, 1);
    }

    #[test]
    fn exempt_months_shrink_the_requirement() {
        let mut worker = worker_with(&["2023-01"]);
        worker
            .kafalat_payments
            .push(KafalatPayment::exempt(month("2023-02"), date(2023, 2, 1)));

        let status = compute_status(&worker, date(2023, 3, 1));
        assert_eq!(status.total_months_required, 3);
        assert_eq!(status.paid_months, 1);
        assert_eq!(status.unpaid_months, 1);
        assert_eq!(status.pending_amount, Decimal::from(500));
        assert_eq!(exempt_months(&worker), vec![month("2023-02")]);
    }

    #[test]
    fn pending_months_lists_gaps_in_order() {
        let worker = worker_with(&["2023-02", "2023-04"]);
        let pending = pending_months(&worker, date(2023, 5, 20));
        assert_eq!(
            pending,
            vec![month("2023-01"), month("2023-03"), month("2023-05")]
        );
    }

    #[test]
    fn advance_payments_are_reported() {
        let worker = worker_with(&["2023-01", "2023-02", "2023-03", "2023-04"]);
        let status = compute_status(&worker, date(2023, 2, 15));
        assert_eq!(status.unpaid_months, 0);
        assert_eq!(status.standing, KafalatStanding::UpToDate);
        assert_eq!(
            latest_advance_month(&worker, date(2023, 2, 15)),
            Some(month("2023-04"))
        );
        assert_eq!(latest_advance_month(&worker, date(2023, 4, 1)), None);
    }

    #[test]
    fn custom_policy_moves_the_overdue_threshold() {
        let worker = worker_with(&["2023-01"]);
        let policy = ViolationPolicy::new(6, 10, 30);
        let status = compute_status_with_policy(&worker, date(2023, 6, 1), &policy);
        assert_eq!(status.unpaid_months, 5);
        assert_eq!(status.standing, KafalatStanding::Pending);
    }
}
