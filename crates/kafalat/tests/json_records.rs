use chrono::NaiveDate;
use kafalat::sponsorship::{
    compute_status, KafalatStanding, RecordRepository, SponsorshipService, ViolationPolicy, Worker,
    WorkerId,
};
use kafalat::storage::JsonFileRepository;
use rust_decimal::Decimal;
use std::fs;
use std::sync::Arc;

const LEGACY_DOCUMENT: &str = r#"{
  "workers": [
    {
      "id": "w-1",
      "name": "Ahmed",
      "workerId": "2400000001",
      "organization": "Al Noor Trading",
      "iqamaExpiry": "2023-06-08T00:00:00.000Z",
      "kafalatStartDate": "2023-01-01",
      "kafalatAmount": "500",
      "kafalatPayments": [
        { "month": "2023-01", "paid": true, "amount": 500, "date": "2023-01-04T09:30:00Z" },
        { "month": "2023-02", "amount": "500", "date": "not a date" },
        { "month": "2023-02", "amount": 500 },
        { "month": "2023-03", "paid": true, "amount": null, "isExempt": true }
      ]
    },
    {
      "id": "w-2",
      "name": "Bilal",
      "kafalatStartDate": "",
      "kafalatAmount": "abc",
      "kafalatPayments": null
    }
  ],
  "organizations": [
    { "id": "org-1", "name": "Al Noor Trading", "expiryDate": "2023-07-01" }
  ]
}"#;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date")
}

#[test]
fn legacy_documents_load_leniently() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");
    fs::write(&path, LEGACY_DOCUMENT).expect("write fixture");

    let repository = JsonFileRepository::open(&path).expect("document loads");
    let ahmed = repository
        .get_worker(&WorkerId("w-1".to_string()))
        .expect("get")
        .expect("ahmed present");

    assert_eq!(ahmed.worker_number, "2400000001");
    assert_eq!(
        ahmed.iqama_expiry_date,
        NaiveDate::from_ymd_opt(2023, 6, 8)
    );
    assert_eq!(ahmed.kafalat_amount, Some(Decimal::from(500)));
    assert_eq!(ahmed.kafalat_payments.len(), 3);
    assert_eq!(ahmed.kafalat_payments[1].recorded_on, None);
    assert!(ahmed.kafalat_payments[2].is_exempt);

    let status = compute_status(&ahmed, reference_date());
    assert_eq!(status.total_months_required, 6);
    assert_eq!(status.paid_months, 2);
    assert_eq!(status.unpaid_months, 3);
    assert_eq!(status.standing, KafalatStanding::Overdue);

    let bilal = repository
        .get_worker(&WorkerId("w-2".to_string()))
        .expect("get")
        .expect("bilal present");
    assert_eq!(bilal.kafalat_start_date, None);
    assert_eq!(bilal.kafalat_amount, None);
    assert!(bilal.kafalat_payments.is_empty());
    assert_eq!(
        compute_status(&bilal, reference_date()).standing,
        KafalatStanding::NotStarted
    );
}

#[test]
fn service_writes_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");
    fs::write(&path, LEGACY_DOCUMENT).expect("write fixture");

    let repository = Arc::new(JsonFileRepository::open(&path).expect("document loads"));
    let service = SponsorshipService::new(repository, ViolationPolicy::default());
    let added = service
        .fill_through("2400000001", "2023-06".parse().expect("month"), reference_date())
        .expect("fill succeeds");
    assert_eq!(added, 3);

    let reopened = JsonFileRepository::open(&path).expect("reopen");
    let ahmed = reopened
        .get_worker(&WorkerId("w-1".to_string()))
        .expect("get")
        .expect("present");
    assert_eq!(
        compute_status(&ahmed, reference_date()).standing,
        KafalatStanding::UpToDate
    );

    let raw = fs::read_to_string(&path).expect("read back");
    assert!(raw.contains("\"kafalatPayments\""));
    assert!(raw.contains("\"workerId\": \"2400000001\""));
    assert!(!dir.path().join("records.json.tmp").exists());
}

#[test]
fn malformed_month_key_drops_only_that_payment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");
    fs::write(
        &path,
        r#"{
  "workers": [
    {
      "id": "w-1",
      "name": "Ahmed",
      "kafalatStartDate": "2023-01-01",
      "kafalatAmount": 500,
      "kafalatPayments": [ { "month": "2023-01", "amount": 500 } ]
    },
    {
      "id": "w-2",
      "name": "Bilal",
      "kafalatPayments": [
        { "month": "Jan 2023", "amount": 500 },
        { "month": "2023-02", "amount": 500 }
      ]
    }
  ]
}"#,
    )
    .expect("write fixture");

    let repository = JsonFileRepository::open(&path).expect("store still opens");
    let workers = repository.list_workers().expect("list");
    assert_eq!(workers.len(), 2);
    assert_eq!(workers[0].kafalat_payments.len(), 1);

    let bilal = repository
        .get_worker(&WorkerId("w-2".to_string()))
        .expect("get")
        .expect("bilal kept");
    assert_eq!(bilal.kafalat_payments.len(), 1);
    assert_eq!(bilal.kafalat_payments[0].month.to_string(), "2023-02");
}

#[test]
fn high_precision_amounts_survive_the_records_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");
    let amount: Decimal = "12345678901234567.89".parse().expect("decimal");

    let repository = JsonFileRepository::open(&path).expect("open");
    let mut worker = Worker::new("w-1", "Ahmed");
    worker.kafalat_amount = Some(amount);
    repository.upsert_worker(worker).expect("upsert");

    let reopened = JsonFileRepository::open(&path).expect("reopen");
    let stored = reopened
        .get_worker(&WorkerId("w-1".to_string()))
        .expect("get")
        .expect("present");
    assert_eq!(stored.kafalat_amount, Some(amount));
}
