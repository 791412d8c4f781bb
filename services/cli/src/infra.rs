use chrono::NaiveDate;
use kafalat::sponsorship::{MonthKey, ViolationKind};
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_month(raw: &str) -> Result<MonthKey, String> {
    raw.parse::<MonthKey>()
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))?;
    if amount.is_sign_negative() {
        return Err(format!("amount '{raw}' must not be negative"));
    }
    Ok(amount)
}

pub(crate) fn parse_kind(raw: &str) -> Result<ViolationKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(ViolationKind::All),
        "iqama" => Ok(ViolationKind::Iqama),
        "kafalat" => Ok(ViolationKind::Kafalat),
        "organization" | "organisation" | "org" => Ok(ViolationKind::Organization),
        other => Err(format!(
            "unknown violation kind '{other}' (expected all, iqama, kafalat, or organization)"
        )),
    }
}
