use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar month, serialized as `YYYY-MM`.
///
/// Internally anchored to the first day of the month so ordering and month
/// arithmetic fall out of `NaiveDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Signed number of months from `self` to `later`.
    pub fn months_until(self, later: MonthKey) -> i64 {
        let from = i64::from(self.year()) * 12 + i64::from(self.month());
        let to = i64::from(later.year()) * 12 + i64::from(later.month());
        to - from
    }

    pub fn add_months(self, months: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(months)).map(Self)
    }

    pub fn succ(self) -> Option<Self> {
        self.add_months(1)
    }

    /// Inclusive iterator over every month from `self` through `last`.
    pub fn through(self, last: MonthKey) -> impl Iterator<Item = MonthKey> {
        std::iter::successors(Some(self), |month| month.succ()).take_while(move |m| *m <= last)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct MonthKeyError(pub String);

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let invalid = || MonthKeyError(raw.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One month of the kafalat ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafalatPayment {
    pub month: MonthKey,
    #[serde(default = "default_paid")]
    pub paid: bool,
    #[serde(default, deserialize_with = "lenient_amount_or_zero")]
    pub amount: Decimal,
    #[serde(
        default,
        rename = "date",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub recorded_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_exempt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl KafalatPayment {
    pub fn paid(month: MonthKey, amount: Decimal, recorded_on: NaiveDate) -> Self {
        Self {
            month,
            paid: true,
            amount: amount.max(Decimal::ZERO),
            recorded_on: Some(recorded_on),
            is_exempt: false,
            reference: None,
            notes: None,
        }
    }

    pub fn exempt(month: MonthKey, recorded_on: NaiveDate) -> Self {
        Self {
            is_exempt: true,
            ..Self::paid(month, Decimal::ZERO, recorded_on)
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

fn default_paid() -> bool {
    true
}

/// Sponsored worker record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: WorkerId,
    #[serde(default)]
    pub name: String,
    /// Government-issued worker number, distinct from the record id.
    #[serde(default, rename = "workerId")]
    pub worker_number: String,
    #[serde(default)]
    pub nationality: String,
    /// Name of the sponsoring organization.
    #[serde(default)]
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_entry: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_issue: Option<NaiveDate>,
    #[serde(
        default,
        alias = "iqamaExpiry",
        alias = "expiryDate",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iqama_expiry_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub insurance_expiry_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub kafalat_start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub kafalat_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_payments")]
    pub kafalat_payments: Vec<KafalatPayment>,
}

impl Worker {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: WorkerId(id.into()),
            name: name.into(),
            worker_number: String::new(),
            nationality: String::new(),
            organization: String::new(),
            phone_number: None,
            date_of_entry: None,
            date_of_issue: None,
            iqama_expiry_date: None,
            insurance_expiry_date: None,
            kafalat_start_date: None,
            kafalat_amount: None,
            kafalat_payments: Vec::new(),
        }
    }

    /// Monthly fee owed, with missing or negative amounts treated as zero.
    pub fn monthly_amount(&self) -> Decimal {
        self.kafalat_amount
            .map(|amount| amount.max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn payment_for(&self, month: MonthKey) -> Option<&KafalatPayment> {
        self.kafalat_payments
            .iter()
            .find(|payment| payment.month == month)
    }

    /// True when `key` names this worker by record id or worker number.
    pub fn is_identified_by(&self, key: &str) -> bool {
        let key = key.trim();
        !key.is_empty() && (self.id.0 == key || self.worker_number == key)
    }
}

/// Sponsoring organization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub commercial_number: String,
    #[serde(default)]
    pub unified_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qiwa_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gosi_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub opening_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<NaiveDate>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: OrganizationId(id.into()),
            name: name.into(),
            commercial_number: String::new(),
            unified_number: String::new(),
            qiwa_number: None,
            gosi_number: None,
            opening_date: None,
            expiry_date: None,
        }
    }
}

/// Parse a stored date. Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and naive
/// ISO timestamps; anything else yields `None`.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Parse a stored amount from a number or numeric string.
pub fn parse_record_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => parse_record_date(&raw),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => parse_record_amount(&number.to_string()),
        Some(Value::String(raw)) => parse_record_amount(&raw),
        _ => None,
    })
}

fn lenient_amount_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_amount(deserializer).map(|amount| amount.unwrap_or(Decimal::ZERO))
}

/// Payment entries that fail to decode are dropped one by one so a single
/// bad month does not take the worker's whole ledger down with it.
fn lenient_payments<'de, D>(deserializer: D) -> Result<Vec<KafalatPayment>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match KafalatPayment::deserialize(entry) {
            Ok(payment) => Some(payment),
            Err(err) => {
                warn!(error = %err, "skipping unreadable kafalat payment");
                None
            }
        })
        .collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn month_key_parses_and_formats() {
        let month: MonthKey = "2023-03".parse().expect("valid month");
        assert_eq!(month.year(), 2023);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2023-03");
        assert_eq!("2023-3".parse::<MonthKey>().expect("short month"), month);

        assert!("2023-13".parse::<MonthKey>().is_err());
        assert!("23-01".parse::<MonthKey>().is_err());
        assert!("March 2023".parse::<MonthKey>().is_err());
    }

    #[test]
    fn month_key_arithmetic_crosses_years() {
        let nov = MonthKey::new(2022, 11).expect("valid");
        let feb = MonthKey::new(2023, 2).expect("valid");
        assert_eq!(nov.months_until(feb), 3);
        assert_eq!(feb.months_until(nov), -3);

        let months: Vec<String> = nov.through(feb).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2022-11", "2022-12", "2023-01", "2023-02"]);
    }

    #[test]
    fn worker_accepts_legacy_shapes() {
        let worker: Worker = serde_json::from_value(json!({
            "id": "w-1",
            "name": "Ahmed",
            "workerId": "2233445566",
            "expiryDate": "2024-05-01T00:00:00.000Z",
            "kafalatStartDate": "not a date",
            "kafalatAmount": "450.50",
            "kafalatPayments": null
        }))
        .expect("legacy worker deserializes");

        assert_eq!(
            worker.iqama_expiry_date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(worker.kafalat_start_date, None);
        assert_eq!(worker.kafalat_amount, Some(Decimal::new(45050, 2)));
        assert!(worker.kafalat_payments.is_empty());
        assert!(worker.is_identified_by("2233445566"));
        assert!(worker.is_identified_by("w-1"));
    }

    #[test]
    fn non_numeric_and_negative_amounts_clamp_to_zero() {
        let worker: Worker = serde_json::from_value(json!({
            "id": "w-2",
            "kafalatAmount": "abc"
        }))
        .expect("deserializes");
        assert_eq!(worker.kafalat_amount, None);
        assert_eq!(worker.monthly_amount(), Decimal::ZERO);

        let mut negative = Worker::new("w-3", "Bilal");
        negative.kafalat_amount = Some(Decimal::from(-200));
        assert_eq!(negative.monthly_amount(), Decimal::ZERO);
    }

    #[test]
    fn unreadable_payment_entries_are_skipped() {
        let worker: Worker = serde_json::from_value(json!({
            "id": "w-1",
            "name": "Ahmed",
            "kafalatPayments": [
                { "month": "2023-01", "amount": 500 },
                { "month": "Jan 2023", "amount": 500 },
                { "month": "2023-13" },
                "2023-02",
                { "month": "2023-03", "isExempt": true }
            ]
        }))
        .expect("worker still deserializes");

        let months: Vec<String> = worker
            .kafalat_payments
            .iter()
            .map(|payment| payment.month.to_string())
            .collect();
        assert_eq!(months, vec!["2023-01", "2023-03"]);
    }

    #[test]
    fn high_precision_amounts_survive_json() {
        let month = MonthKey::new(2023, 1).expect("valid");
        let amount = Decimal::from_str("12345678901234567.89").expect("decimal");
        let recorded = NaiveDate::from_ymd_opt(2023, 1, 15).expect("valid");
        let payment = KafalatPayment::paid(month, amount, recorded);

        let encoded = serde_json::to_string(&payment).expect("serializes");
        let decoded: KafalatPayment = serde_json::from_str(&encoded).expect("deserializes");
        assert_eq!(decoded.amount, amount);
    }

    #[test]
    fn payment_round_trips_through_json() {
        let month = MonthKey::new(2023, 1).expect("valid");
        let recorded = NaiveDate::from_ymd_opt(2023, 1, 15).expect("valid");
        let payment =
            KafalatPayment::paid(month, Decimal::from(500), recorded).with_reference("R-1");

        let encoded = serde_json::to_value(&payment).expect("serializes");
        assert_eq!(encoded["month"], "2023-01");
        assert_eq!(encoded["date"], "2023-01-15");
        assert_eq!(encoded["isExempt"], false);

        let decoded: KafalatPayment = serde_json::from_value(encoded).expect("deserializes");
        assert_eq!(decoded, payment);
    }
}
