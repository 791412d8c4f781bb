use chrono::NaiveDate;
use kafalat::import::ImportSummary;
use kafalat::sponsorship::report::views::{ExpiryViolationView, ViolationReportSummary};
use kafalat::sponsorship::{DashboardSnapshot, KafalatStatus, LedgerChange, MonthKey, Worker};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

pub(crate) fn json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    Ok(body)
}

fn finish(lines: Vec<String>) -> String {
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn status_line(status: &KafalatStatus) -> String {
    format!(
        "{}: {} of {} months unpaid ({} paid) | pending {}",
        status.standing.label(),
        status.unpaid_months,
        status.total_months_required,
        status.paid_months,
        status.pending_amount.normalize()
    )
}

fn list_months(months: &[MonthKey]) -> String {
    months
        .iter()
        .map(MonthKey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn worker_status(
    worker: &Worker,
    status: &KafalatStatus,
    today: NaiveDate,
    advance: Option<MonthKey>,
    exempt: &[MonthKey],
) -> String {
    let mut lines = vec![format!("{} ({}) as of {today}", worker.name, worker.id)];
    if !worker.organization.is_empty() {
        lines.push(format!("Sponsor: {}", worker.organization));
    }
    match worker.kafalat_start_date {
        Some(start) => lines.push(format!(
            "Kafalat since {start} at {} per month",
            worker.monthly_amount().normalize()
        )),
        None => lines.push("Kafalat start date not set".to_string()),
    }
    lines.push(status_line(status));
    if let Some(month) = advance {
        lines.push(format!("Paid in advance through {month}"));
    }
    if !exempt.is_empty() {
        lines.push(format!("Exempt months: {}", list_months(exempt)));
    }
    if let Some(expiry) = worker.iqama_expiry_date {
        lines.push(format!("Iqama expires {expiry}"));
    }
    finish(lines)
}

pub(crate) fn pending_months(worker: &Worker, months: &[MonthKey], today: NaiveDate) -> String {
    if months.is_empty() {
        return finish(vec![format!(
            "{} ({}) has no unrecorded months as of {today}",
            worker.name, worker.id
        )]);
    }
    let mut lines = vec![format!(
        "{} ({}) has {} unrecorded month(s) as of {today}",
        worker.name,
        worker.id,
        months.len()
    )];
    lines.extend(months.iter().map(|month| format!("- {month}")));
    finish(lines)
}

pub(crate) fn payment_recorded(
    worker: &str,
    month: MonthKey,
    amount: Decimal,
    status: &KafalatStatus,
) -> String {
    finish(vec![
        format!("Recorded {} for {month} on {worker}", amount.normalize()),
        status_line(status),
    ])
}

pub(crate) fn ledger_change(
    worker: &str,
    month: MonthKey,
    change: LedgerChange,
    status: &KafalatStatus,
) -> String {
    let action = match change {
        LedgerChange::Added => "marked paid",
        LedgerChange::Removed => "cleared",
    };
    finish(vec![format!("{month} {action} on {worker}"), status_line(status)])
}

pub(crate) fn exemption(
    worker: &str,
    month: MonthKey,
    exempt: bool,
    status: &KafalatStatus,
) -> String {
    let state = if exempt { "now exempt" } else { "no longer exempt" };
    finish(vec![format!("{month} is {state} on {worker}"), status_line(status)])
}

pub(crate) fn filled(
    worker: &str,
    through: MonthKey,
    added: usize,
    status: &KafalatStatus,
) -> String {
    finish(vec![
        format!("Added {added} month(s) through {through} on {worker}"),
        status_line(status),
    ])
}

pub(crate) fn import_summary(path: &Path, summary: &ImportSummary) -> String {
    finish(vec![
        format!("Imported {}", path.display()),
        format!(
            "{} applied | {} duplicate(s) | {} outside window \
             | {} unknown worker(s) | {} invalid row(s)",
            summary.applied,
            summary.duplicates,
            summary.outside_window,
            summary.unknown_workers,
            summary.invalid_rows
        ),
    ])
}

pub(crate) fn dashboard(snapshot: &DashboardSnapshot) -> String {
    let kafalat = &snapshot.kafalat;
    let counts = &snapshot.violations;
    finish(vec![
        format!("Kafalat dashboard as of {}", snapshot.reference_date),
        format!(
            "{} workers | {} organizations",
            snapshot.total_workers, snapshot.total_organizations
        ),
        format!(
            "Collected {} | pending {}",
            kafalat.total_collected.normalize(),
            kafalat.pending_amount.normalize()
        ),
        format!(
            "Up to date {} | pending {} | overdue {} | not started {}",
            kafalat.workers_up_to_date,
            kafalat.workers_pending,
            kafalat.workers_overdue,
            kafalat.workers_not_started
        ),
        format!(
            "Iqama expired {} | critical {} | warning {}",
            counts.iqama_expired, counts.iqama_critical, counts.iqama_warning
        ),
        format!("Organizations expiring: {}", counts.organizations_expiring),
    ])
}

fn expiry_line(view: &ExpiryViolationView) -> String {
    let when = if view.days_remaining < 0 {
        format!("expired {} day(s) ago", -view.days_remaining)
    } else {
        format!("{} day(s) left", view.days_remaining)
    };
    let detail = if view.detail.is_empty() {
        String::new()
    } else {
        format!(" [{}]", view.detail)
    };
    format!(
        "- {} ({}){detail}: {} on {}, {when}",
        view.name, view.id, view.tier_label, view.expiry_date
    )
}

pub(crate) fn violations(summary: &ViolationReportSummary) -> String {
    let mut lines = vec![format!(
        "Violations as of {} ({} total)",
        summary.reference_date,
        summary.counts.total()
    )];

    if !summary.kafalat.is_empty() {
        lines.push(String::new());
        lines.push("Kafalat arrears".to_string());
        lines.extend(summary.kafalat.iter().map(|view| {
            format!(
                "- {} ({}): {} | {} unpaid month(s) | pending {}",
                view.worker_name,
                view.worker_id,
                view.standing_label,
                view.unpaid_months,
                view.pending_amount.normalize()
            )
        }));
    }
    if !summary.iqama.is_empty() {
        lines.push(String::new());
        lines.push("Iqama expiries".to_string());
        lines.extend(summary.iqama.iter().map(expiry_line));
    }
    if !summary.organizations.is_empty() {
        lines.push(String::new());
        lines.push("Organization registrations".to_string());
        lines.extend(summary.organizations.iter().map(expiry_line));
    }
    if summary.counts.total() == 0 {
        lines.push("No violations".to_string());
    }
    finish(lines)
}
