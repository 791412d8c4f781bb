use std::io::Read;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::domain::{KafalatPayment, MonthKey, Worker, WorkerId};
use super::ledger::{LedgerChange, LedgerError, SelectionWindow};
use super::policy::ViolationPolicy;
use super::report::{DashboardSnapshot, KafalatMetrics, ViolationReport};
use super::repository::{RecordRepository, RepositoryError};
use super::status::{compute_status_with_policy, pending_months, KafalatStatus};
use super::violations::{ViolationClassifier, ViolationFilter};
use crate::import::{self, ImportSummary, PaymentImportError};

/// Service composing the record repository, the ledger writer, and the classifier.
pub struct SponsorshipService<R> {
    repository: Arc<R>,
    classifier: ViolationClassifier,
}

impl<R> SponsorshipService<R>
where
    R: RecordRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: ViolationPolicy) -> Self {
        Self {
            repository,
            classifier: ViolationClassifier::new(policy),
        }
    }

    pub fn policy(&self) -> &ViolationPolicy {
        self.classifier.policy()
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Look a worker up by record id, falling back to the government worker number.
    pub fn find_worker(&self, key: &str) -> Result<Worker, ServiceError> {
        if let Some(worker) = self.repository.get_worker(&WorkerId(key.trim().to_string()))? {
            return Ok(worker);
        }
        self.repository
            .list_workers()?
            .into_iter()
            .find(|worker| worker.is_identified_by(key))
            .ok_or_else(|| ServiceError::UnknownWorker(key.to_string()))
    }

    pub fn worker_status(
        &self,
        key: &str,
        reference_date: NaiveDate,
    ) -> Result<KafalatStatus, ServiceError> {
        let worker = self.find_worker(key)?;
        Ok(compute_status_with_policy(&worker, reference_date, self.policy()))
    }

    pub fn pending_months(
        &self,
        key: &str,
        reference_date: NaiveDate,
    ) -> Result<Vec<MonthKey>, ServiceError> {
        let worker = self.find_worker(key)?;
        Ok(pending_months(&worker, reference_date))
    }

    pub fn record_payment(
        &self,
        key: &str,
        payment: KafalatPayment,
        reference_date: NaiveDate,
    ) -> Result<KafalatStatus, ServiceError> {
        let month = payment.month;
        let worker = self.write_ledger(key, reference_date, |worker, window| {
            worker.record_payment(payment, window)
        })?;
        info!(worker = %worker.id, %month, "kafalat payment recorded");
        Ok(compute_status_with_policy(&worker, reference_date, self.policy()))
    }

    pub fn toggle_payment(
        &self,
        key: &str,
        month: MonthKey,
        reference_date: NaiveDate,
    ) -> Result<LedgerChange, ServiceError> {
        let mut change = LedgerChange::Added;
        let worker = self.write_ledger(key, reference_date, |worker, window| {
            change = worker.toggle_month(month, reference_date, window)?;
            Ok(())
        })?;
        info!(worker = %worker.id, %month, ?change, "kafalat month toggled");
        Ok(change)
    }

    pub fn toggle_exempt(
        &self,
        key: &str,
        month: MonthKey,
        reference_date: NaiveDate,
    ) -> Result<bool, ServiceError> {
        let mut exempt = false;
        let worker = self.write_ledger(key, reference_date, |worker, window| {
            exempt = worker.toggle_exempt(month, reference_date, window)?;
            Ok(())
        })?;
        info!(worker = %worker.id, %month, exempt, "kafalat exemption toggled");
        Ok(exempt)
    }

    pub fn fill_through(
        &self,
        key: &str,
        through: MonthKey,
        reference_date: NaiveDate,
    ) -> Result<usize, ServiceError> {
        let mut added = 0;
        let worker = self.write_ledger(key, reference_date, |worker, window| {
            added = worker.fill_through(through, reference_date, window)?;
            Ok(())
        })?;
        info!(worker = %worker.id, %through, added, "kafalat ledger filled");
        Ok(added)
    }

    pub fn clear_payments(&self, key: &str) -> Result<usize, ServiceError> {
        let mut worker = self.find_worker(key)?;
        let cleared = worker.clear_payments();
        info!(worker = %worker.id, cleared, "kafalat ledger cleared");
        self.repository.upsert_worker(worker)?;
        Ok(cleared)
    }

    pub fn violation_report(
        &self,
        reference_date: NaiveDate,
        filter: &ViolationFilter,
    ) -> Result<ViolationReport, ServiceError> {
        let workers = self.repository.list_workers()?;
        let organizations = self.repository.list_organizations()?;
        let report = ViolationReport::build(
            &self.classifier,
            &workers,
            &organizations,
            reference_date,
            filter,
        );
        debug!(
            %reference_date,
            kafalat = report.kafalat.len(),
            iqama = report.iqama.len(),
            organizations = report.organizations.len(),
            "violation report built"
        );
        Ok(report)
    }

    pub fn dashboard(&self, reference_date: NaiveDate) -> Result<DashboardSnapshot, ServiceError> {
        let workers = self.repository.list_workers()?;
        let organizations = self.repository.list_organizations()?;
        let report = ViolationReport::build(
            &self.classifier,
            &workers,
            &organizations,
            reference_date,
            &ViolationFilter::default(),
        );

        Ok(DashboardSnapshot {
            reference_date,
            total_workers: workers.len(),
            total_organizations: organizations.len(),
            kafalat: KafalatMetrics::collect(&workers, reference_date, self.policy()),
            violations: report.counts(),
        })
    }

    /// Apply a CSV of payment rows through the ledger writer.
    pub fn import_payments<Rd: Read>(
        &self,
        reader: Rd,
        reference_date: NaiveDate,
    ) -> Result<ImportSummary, PaymentImportError> {
        let rows = import::parse_rows(reader)?;
        let workers = self.repository.list_workers()?;
        let (summary, changed) = import::apply_rows(rows, workers, reference_date, self.policy());

        for worker in changed {
            self.repository.upsert_worker(worker)?;
        }
        info!(
            applied = summary.applied,
            duplicates = summary.duplicates,
            unknown_workers = summary.unknown_workers,
            "kafalat payments imported"
        );
        Ok(summary)
    }

    fn write_ledger<F>(
        &self,
        key: &str,
        reference_date: NaiveDate,
        mutate: F,
    ) -> Result<Worker, ServiceError>
    where
        F: FnOnce(&mut Worker, &SelectionWindow) -> Result<(), LedgerError>,
    {
        let mut worker = self.find_worker(key)?;
        let window = SelectionWindow::for_worker(&worker, reference_date, self.policy());
        mutate(&mut worker, &window)?;
        self.repository.upsert_worker(worker.clone())?;
        Ok(worker)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("worker '{0}' not found")]
    UnknownWorker(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
