use crate::commands;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use kafalat::config::AppConfig;
use kafalat::error::AppError;
use kafalat::sponsorship::{MonthKey, SponsorshipService, ViolationKind};
use kafalat::storage::JsonFileRepository;
use kafalat::telemetry;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "kafalat",
    about = "Track kafalat payments and iqama expiries for sponsored workers",
    version
)]
pub(crate) struct Cli {
    /// Records file to read and update (overrides KAFALAT_DATA_FILE)
    #[arg(long, global = true)]
    pub(crate) data_file: Option<PathBuf>,
    /// Reference date for status and expiry calculations (defaults to today)
    #[arg(long, global = true, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Show a worker's kafalat standing
    Status(WorkerArgs),
    /// List months with no payment record
    Pending(WorkerArgs),
    /// List kafalat arrears and upcoming iqama/organization expiries
    Violations(ViolationsArgs),
    /// Summarize collections and violation counts
    Dashboard(OutputArgs),
    /// Record a payment for one month
    Pay(PayArgs),
    /// Add or remove a month's payment record
    Toggle(MonthArgs),
    /// Flip a month's exemption
    Exempt(MonthArgs),
    /// Mark every unrecorded month through the given month as paid
    Fill(FillArgs),
    /// Apply a CSV sheet of payments
    ImportPayments(ImportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct WorkerArgs {
    /// Worker record id or government worker number
    #[arg(long)]
    pub(crate) worker: String,
}

#[derive(Args, Debug)]
pub(crate) struct MonthArgs {
    /// Worker record id or government worker number
    #[arg(long)]
    pub(crate) worker: String,
    /// Ledger month (YYYY-MM)
    #[arg(long, value_parser = crate::infra::parse_month)]
    pub(crate) month: MonthKey,
}

#[derive(Args, Debug)]
pub(crate) struct PayArgs {
    /// Worker record id or government worker number
    #[arg(long)]
    pub(crate) worker: String,
    /// Ledger month (YYYY-MM)
    #[arg(long, value_parser = crate::infra::parse_month)]
    pub(crate) month: MonthKey,
    /// Amount collected (defaults to the worker's monthly amount)
    #[arg(long, value_parser = crate::infra::parse_amount)]
    pub(crate) amount: Option<Decimal>,
    /// Receipt or transfer reference
    #[arg(long)]
    pub(crate) reference: Option<String>,
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct FillArgs {
    /// Worker record id or government worker number
    #[arg(long)]
    pub(crate) worker: String,
    /// Last month to fill (defaults to the reference month)
    #[arg(long, value_parser = crate::infra::parse_month)]
    pub(crate) through: Option<MonthKey>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ViolationsArgs {
    /// Restrict to one section: all, iqama, kafalat, or organization
    #[arg(long, value_parser = crate::infra::parse_kind)]
    pub(crate) kind: Option<ViolationKind>,
    /// Restrict to one sponsoring organization (case-insensitive name)
    #[arg(long)]
    pub(crate) organization: Option<String>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OutputArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV with Worker ID and Month columns
    pub(crate) path: PathBuf,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let data_file = cli
        .data_file
        .clone()
        .unwrap_or_else(|| config.storage.data_file.clone());
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    debug!(data_file = %data_file.display(), %today, "kafalat command starting");

    let repository = Arc::new(JsonFileRepository::open(data_file)?);
    let service = SponsorshipService::new(repository, config.policy.to_policy());

    let output = commands::execute(cli.command, &service, today)?;
    print!("{output}");
    Ok(())
}
