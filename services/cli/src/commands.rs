use crate::cli::{Command, FillArgs, ImportArgs, MonthArgs, OutputArgs, PayArgs, ViolationsArgs};
use crate::render;
use chrono::NaiveDate;
use kafalat::error::AppError;
use kafalat::sponsorship::{
    exempt_months, latest_advance_month, KafalatPayment, MonthKey, RecordRepository,
    SponsorshipService, ViolationFilter,
};
use std::fs::File;
use std::io::BufReader;

/// Run one subcommand against the service and return what should be printed.
pub(crate) fn execute<R>(
    command: Command,
    service: &SponsorshipService<R>,
    today: NaiveDate,
) -> Result<String, AppError>
where
    R: RecordRepository + 'static,
{
    match command {
        Command::Status(args) => {
            let worker = service.find_worker(&args.worker)?;
            let status = service.worker_status(&args.worker, today)?;
            Ok(render::worker_status(
                &worker,
                &status,
                today,
                latest_advance_month(&worker, today),
                &exempt_months(&worker),
            ))
        }
        Command::Pending(args) => {
            let worker = service.find_worker(&args.worker)?;
            let months = service.pending_months(&args.worker, today)?;
            Ok(render::pending_months(&worker, &months, today))
        }
        Command::Violations(args) => violations(args, service, today),
        Command::Dashboard(OutputArgs { json }) => {
            let dashboard = service.dashboard(today)?;
            if json {
                Ok(render::json(&dashboard)?)
            } else {
                Ok(render::dashboard(&dashboard))
            }
        }
        Command::Pay(args) => pay(args, service, today),
        Command::Toggle(MonthArgs { worker, month }) => {
            let change = service.toggle_payment(&worker, month, today)?;
            let status = service.worker_status(&worker, today)?;
            Ok(render::ledger_change(&worker, month, change, &status))
        }
        Command::Exempt(MonthArgs { worker, month }) => {
            let exempt = service.toggle_exempt(&worker, month, today)?;
            let status = service.worker_status(&worker, today)?;
            Ok(render::exemption(&worker, month, exempt, &status))
        }
        Command::Fill(FillArgs { worker, through }) => {
            let through = through.unwrap_or_else(|| MonthKey::from_date(today));
            let added = service.fill_through(&worker, through, today)?;
            let status = service.worker_status(&worker, today)?;
            Ok(render::filled(&worker, through, added, &status))
        }
        Command::ImportPayments(ImportArgs { path }) => {
            let file = File::open(&path)?;
            let summary = service.import_payments(BufReader::new(file), today)?;
            Ok(render::import_summary(&path, &summary))
        }
    }
}

fn violations<R>(
    args: ViolationsArgs,
    service: &SponsorshipService<R>,
    today: NaiveDate,
) -> Result<String, AppError>
where
    R: RecordRepository + 'static,
{
    let ViolationsArgs {
        kind,
        organization,
        json,
    } = args;
    let filter = ViolationFilter {
        kind: kind.unwrap_or_default(),
        organization,
    };

    let summary = service.violation_report(today, &filter)?.summary();
    if json {
        Ok(render::json(&summary)?)
    } else {
        Ok(render::violations(&summary))
    }
}

fn pay<R>(
    args: PayArgs,
    service: &SponsorshipService<R>,
    today: NaiveDate,
) -> Result<String, AppError>
where
    R: RecordRepository + 'static,
{
    let PayArgs {
        worker,
        month,
        amount,
        reference,
        notes,
    } = args;

    let amount = match amount {
        Some(amount) => amount,
        None => service.find_worker(&worker)?.monthly_amount(),
    };
    let mut payment = KafalatPayment::paid(month, amount, today);
    payment.reference = reference.filter(|value| !value.trim().is_empty());
    payment.notes = notes.filter(|value| !value.trim().is_empty());

    let status = service.record_payment(&worker, payment, today)?;
    Ok(render::payment_recorded(&worker, month, amount, &status))
}
