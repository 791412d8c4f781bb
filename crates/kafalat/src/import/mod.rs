//! Bulk kafalat payment entry from CSV sheets.

mod parser;

use crate::sponsorship::domain::{
    parse_record_amount, parse_record_date, KafalatPayment, MonthKey, Worker,
};
use crate::sponsorship::ledger::{LedgerError, SelectionWindow};
use crate::sponsorship::policy::ViolationPolicy;
use crate::sponsorship::repository::RepositoryError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

pub(crate) use parser::{parse_rows, PaymentRow};

#[derive(Debug)]
pub enum PaymentImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repository(RepositoryError),
}

impl std::fmt::Display for PaymentImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentImportError::Io(err) => write!(f, "failed to read payment sheet: {}", err),
            PaymentImportError::Csv(err) => write!(f, "invalid payment CSV data: {}", err),
            PaymentImportError::Repository(err) => {
                write!(f, "could not store imported payments: {}", err)
            }
        }
    }
}

impl std::error::Error for PaymentImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaymentImportError::Io(err) => Some(err),
            PaymentImportError::Csv(err) => Some(err),
            PaymentImportError::Repository(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PaymentImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PaymentImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for PaymentImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

/// Outcome counts of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub applied: usize,
    pub duplicates: usize,
    pub outside_window: usize,
    pub unknown_workers: usize,
    pub invalid_rows: usize,
}

impl ImportSummary {
    pub fn skipped(&self) -> usize {
        self.duplicates + self.outside_window + self.unknown_workers + self.invalid_rows
    }
}

/// Apply parsed rows to the given workers. Returns the summary and the
/// workers whose ledgers changed.
pub(crate) fn apply_rows(
    rows: Vec<PaymentRow>,
    mut workers: Vec<Worker>,
    reference_date: NaiveDate,
    policy: &ViolationPolicy,
) -> (ImportSummary, Vec<Worker>) {
    let mut summary = ImportSummary::default();
    let mut touched = BTreeSet::new();

    for row in rows {
        let Some(index) = workers
            .iter()
            .position(|worker| worker.is_identified_by(&row.worker))
        else {
            warn!(line = row.line, worker = %row.worker, "payment row names an unknown worker");
            summary.unknown_workers += 1;
            continue;
        };

        let worker = &mut workers[index];
        let Some(payment) = payment_from_row(&row, worker, reference_date) else {
            warn!(line = row.line, month = %row.month, "payment row could not be parsed");
            summary.invalid_rows += 1;
            continue;
        };

        let window = SelectionWindow::for_worker(worker, reference_date, policy);
        match worker.record_payment(payment, &window) {
            Ok(()) => {
                summary.applied += 1;
                touched.insert(index);
            }
            Err(LedgerError::DuplicateMonth(_)) => summary.duplicates += 1,
            Err(LedgerError::OutsideWindow { .. }) => summary.outside_window += 1,
            Err(LedgerError::NotStarted) => summary.invalid_rows += 1,
        }
    }

    let changed = workers
        .into_iter()
        .enumerate()
        .filter_map(|(index, worker)| touched.contains(&index).then_some(worker))
        .collect();
    (summary, changed)
}

fn payment_from_row(
    row: &PaymentRow,
    worker: &Worker,
    reference_date: NaiveDate,
) -> Option<KafalatPayment> {
    let month: MonthKey = row.month.parse().ok()?;
    let recorded_on = match row.date.as_deref() {
        Some(raw) => parse_record_date(raw)?,
        None => reference_date,
    };

    let mut payment = if row.is_exempt() {
        KafalatPayment::exempt(month, recorded_on)
    } else {
        let amount = match row.amount.as_deref() {
            Some(raw) => parse_record_amount(raw)?,
            None => worker.monthly_amount(),
        };
        KafalatPayment::paid(month, amount, recorded_on)
    };
    payment.reference = row.reference.clone();
    payment.notes = row.notes.clone();
    Some(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Cursor;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn workers() -> Vec<Worker> {
        let mut ahmed = Worker::new("w-1", "Ahmed");
        ahmed.worker_number = "2400000001".to_string();
        ahmed.kafalat_start_date = Some(date(2023, 1, 1));
        ahmed.kafalat_amount = Some(Decimal::from(500));

        let mut bilal = Worker::new("w-2", "Bilal");
        bilal.kafalat_start_date = Some(date(2023, 1, 1));
        bilal.kafalat_amount = Some(Decimal::from(300));
        vec![ahmed, bilal]
    }

    #[test]
    fn rows_are_applied_and_skips_are_counted() {
        let csv = "\
Worker ID,Month,Amount,Exempt,Reference,Notes,Date
2400000001,2023-01,,,RCPT-1,,2023-01-05
2400000001,2023-01,500,,,,
w-2,2023-02,250.5,,,,
w-2,2023-03,,yes,,Ramadan leave,
w-9,2023-01,500,,,,
w-1,2023-13,500,,,,
w-1,2029-01,500,,,,
";
        let rows = parse_rows(Cursor::new(csv)).expect("rows parse");
        let (summary, changed) =
            apply_rows(rows, workers(), date(2023, 6, 1), &ViolationPolicy::default());

        assert_eq!(
            summary,
            ImportSummary {
                applied: 3,
                duplicates: 1,
                outside_window: 1,
                unknown_workers: 1,
                invalid_rows: 1,
            }
        );
        assert_eq!(summary.skipped(), 4);
        assert_eq!(changed.len(), 2);

        let ahmed = &changed[0];
        let january = ahmed
            .payment_for("2023-01".parse().expect("month"))
            .expect("january recorded");
        assert_eq!(january.amount, Decimal::from(500));
        assert_eq!(january.reference.as_deref(), Some("RCPT-1"));
        assert_eq!(january.recorded_on, Some(date(2023, 1, 5)));

        let bilal = &changed[1];
        let march = bilal
            .payment_for("2023-03".parse().expect("month"))
            .expect("march recorded");
        assert!(march.is_exempt);
        assert_eq!(march.notes.as_deref(), Some("Ramadan leave"));
        assert_eq!(
            bilal
                .payment_for("2023-02".parse().expect("month"))
                .map(|payment| payment.amount),
            Some(Decimal::new(2505, 1))
        );
    }
}
