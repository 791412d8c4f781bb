//! Writer-side operations on a worker's kafalat ledger.
//!
//! Every write keeps at most one record per month and leaves the ledger
//! sorted by month.

use super::domain::{KafalatPayment, MonthKey, Worker};
use super::policy::ViolationPolicy;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("a kafalat record for {0} already exists")]
    DuplicateMonth(MonthKey),
    #[error("{month} is outside the selectable range {earliest} to {latest}")]
    OutsideWindow {
        month: MonthKey,
        earliest: MonthKey,
        latest: MonthKey,
    },
    #[error("kafalat start date is not set")]
    NotStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    Added,
    Removed,
}

/// Range of months the ledger accepts writes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    earliest: MonthKey,
    latest: MonthKey,
}

impl SelectionWindow {
    /// January of the earlier of the start year and `history_years` before the
    /// reference year, through `advance_years` after the reference month.
    pub fn new(
        reference_date: NaiveDate,
        start: Option<NaiveDate>,
        policy: &ViolationPolicy,
    ) -> Self {
        let current = MonthKey::from_date(reference_date);
        let history_floor = reference_date
            .year()
            .saturating_sub(i32::try_from(policy.history_years()).unwrap_or(i32::MAX));
        let floor_year = start
            .map(|start| start.year().min(history_floor))
            .unwrap_or(history_floor);

        let earliest = MonthKey::new(floor_year, 1).unwrap_or(current);
        let latest = policy
            .advance_years()
            .checked_mul(12)
            .and_then(|months| current.add_months(months))
            .unwrap_or(current);

        Self { earliest, latest }
    }

    pub fn for_worker(
        worker: &Worker,
        reference_date: NaiveDate,
        policy: &ViolationPolicy,
    ) -> Self {
        Self::new(reference_date, worker.kafalat_start_date, policy)
    }

    pub fn earliest(&self) -> MonthKey {
        self.earliest
    }

    pub fn latest(&self) -> MonthKey {
        self.latest
    }

    pub fn contains(&self, month: MonthKey) -> bool {
        self.earliest <= month && month <= self.latest
    }

    fn check(&self, month: MonthKey) -> Result<(), LedgerError> {
        if self.contains(month) {
            Ok(())
        } else {
            Err(LedgerError::OutsideWindow {
                month,
                earliest: self.earliest,
                latest: self.latest,
            })
        }
    }
}

impl Worker {
    pub fn record_payment(
        &mut self,
        payment: KafalatPayment,
        window: &SelectionWindow,
    ) -> Result<(), LedgerError> {
        window.check(payment.month)?;
        if self.payment_for(payment.month).is_some() {
            return Err(LedgerError::DuplicateMonth(payment.month));
        }
        self.kafalat_payments.push(payment);
        self.sort_payments();
        Ok(())
    }

    /// Remove the month's record if one exists, otherwise record it as paid
    /// at the worker's monthly amount.
    pub fn toggle_month(
        &mut self,
        month: MonthKey,
        recorded_on: NaiveDate,
        window: &SelectionWindow,
    ) -> Result<LedgerChange, LedgerError> {
        window.check(month)?;
        if self.remove_payment(month).is_some() {
            return Ok(LedgerChange::Removed);
        }
        let payment = KafalatPayment::paid(month, self.monthly_amount(), recorded_on);
        self.record_payment(payment, window)?;
        Ok(LedgerChange::Added)
    }

    /// Flip the exempt flag for a month, creating an exempt record when the
    /// month has none. Un-exempting a record that never carried money removes
    /// it, so the month goes back to unpaid. Returns the month's new exempt
    /// state.
    pub fn toggle_exempt(
        &mut self,
        month: MonthKey,
        recorded_on: NaiveDate,
        window: &SelectionWindow,
    ) -> Result<bool, LedgerError> {
        window.check(month)?;
        let Some(index) = self
            .kafalat_payments
            .iter()
            .position(|payment| payment.month == month)
        else {
            self.record_payment(KafalatPayment::exempt(month, recorded_on), window)?;
            return Ok(true);
        };

        let existing = &mut self.kafalat_payments[index];
        if !existing.is_exempt {
            existing.is_exempt = true;
            return Ok(true);
        }
        if existing.amount.is_zero() {
            self.kafalat_payments.remove(index);
        } else {
            existing.is_exempt = false;
        }
        Ok(false)
    }

    /// Record every month from the kafalat start through `through` that has no
    /// record yet. Returns how many records were added.
    pub fn fill_through(
        &mut self,
        through: MonthKey,
        recorded_on: NaiveDate,
        window: &SelectionWindow,
    ) -> Result<usize, LedgerError> {
        let start = self.kafalat_start_date.ok_or(LedgerError::NotStarted)?;
        window.check(through)?;

        let amount = self.monthly_amount();
        let first = MonthKey::from_date(start).max(window.earliest());
        let missing: Vec<MonthKey> = first
            .through(through)
            .filter(|month| self.payment_for(*month).is_none())
            .collect();

        self.kafalat_payments.extend(
            missing
                .iter()
                .map(|month| KafalatPayment::paid(*month, amount, recorded_on)),
        );
        self.sort_payments();
        Ok(missing.len())
    }

    pub fn remove_payment(&mut self, month: MonthKey) -> Option<KafalatPayment> {
        let index = self
            .kafalat_payments
            .iter()
            .position(|payment| payment.month == month)?;
        Some(self.kafalat_payments.remove(index))
    }

    pub fn clear_payments(&mut self) -> usize {
        let cleared = self.kafalat_payments.len();
        self.kafalat_payments.clear();
        cleared
    }

    /// Collapse duplicate month records left by older writers. The surviving
    /// record is the first one seen, exempt if any duplicate was. Returns the
    /// number of records dropped.
    pub fn normalize_payments(&mut self) -> usize {
        let before = self.kafalat_payments.len();
        let mut by_month: BTreeMap<MonthKey, KafalatPayment> = BTreeMap::new();
        for payment in self.kafalat_payments.drain(..) {
            let exempt = payment.is_exempt;
            by_month
                .entry(payment.month)
                .and_modify(|kept| kept.is_exempt |= exempt)
                .or_insert(payment);
        }
        self.kafalat_payments = by_month.into_values().collect();
        before - self.kafalat_payments.len()
    }

    fn sort_payments(&mut self) {
        self.kafalat_payments.sort_by_key(|payment| payment.month);
    }
}
