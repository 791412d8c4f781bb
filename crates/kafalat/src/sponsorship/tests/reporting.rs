use super::common::*;
use crate::sponsorship::violations::{ExpiryTier, ViolationFilter, ViolationKind};
use rust_decimal::Decimal;

#[test]
fn violation_report_ranks_every_section() {
    let (service, _) = seeded_service();

    let report = service
        .violation_report(reference_date(), &ViolationFilter::default())
        .expect("report builds");

    let kafalat: Vec<(&str, u32)> = report
        .kafalat
        .iter()
        .map(|violation| (violation.worker_name.as_str(), violation.status.unpaid_months))
        .collect();
    assert_eq!(kafalat, vec![("Ahmed", 5), ("Bilal", 3)]);

    let iqama: Vec<(&str, i64, ExpiryTier)> = report
        .iqama
        .iter()
        .map(|violation| {
            (
                violation.worker_name.as_str(),
                violation.classification.days_remaining,
                violation.classification.tier,
            )
        })
        .collect();
    assert_eq!(
        iqama,
        vec![("Bilal", -12, ExpiryTier::Expired), ("Ahmed", 7, ExpiryTier::Critical)]
    );

    assert_eq!(report.organizations.len(), 1);
    assert_eq!(report.organizations[0].name, "Al Noor Trading");
    assert_eq!(report.organizations[0].classification.tier, ExpiryTier::Warning);

    let counts = report.counts();
    assert_eq!(counts.kafalat, 2);
    assert_eq!(counts.iqama_expired, 1);
    assert_eq!(counts.iqama_critical, 1);
    assert_eq!(counts.iqama_warning, 0);
    assert_eq!(counts.total(), 5);
}

#[test]
fn filter_narrows_by_organization_and_kind() {
    let (service, _) = seeded_service();

    let al_noor = service
        .violation_report(reference_date(), &ViolationFilter::organization("al noor trading"))
        .expect("report builds");
    assert_eq!(al_noor.kafalat.len(), 1);
    assert_eq!(al_noor.kafalat[0].worker_name, "Ahmed");
    assert_eq!(al_noor.iqama.len(), 1);
    assert_eq!(al_noor.organizations.len(), 1);

    let iqama_only = service
        .violation_report(
            reference_date(),
            &ViolationFilter {
                kind: ViolationKind::Iqama,
                organization: None,
            },
        )
        .expect("report builds");
    assert!(iqama_only.kafalat.is_empty());
    assert!(iqama_only.organizations.is_empty());
    assert_eq!(iqama_only.iqama.len(), 2);
}

#[test]
fn summary_view_carries_labels() {
    let (service, _) = seeded_service();
    let summary = service
        .violation_report(reference_date(), &ViolationFilter::default())
        .expect("report builds")
        .summary();

    assert_eq!(summary.kafalat[0].standing_label, "Overdue");
    assert_eq!(summary.kafalat[0].pending_amount, Decimal::from(2500));
    assert_eq!(summary.iqama[0].tier_label, "Expired");
    assert_eq!(summary.organizations[0].detail, "1010101010");
}

#[test]
fn dashboard_aggregates_workforce() {
    let (service, _) = seeded_service();
    let dashboard = service.dashboard(reference_date()).expect("dashboard");

    assert_eq!(dashboard.total_workers, 3);
    assert_eq!(dashboard.total_organizations, 2);
    assert_eq!(dashboard.kafalat.total_collected, Decimal::from(1300));
    assert_eq!(dashboard.kafalat.pending_amount, Decimal::from(3400));
    assert_eq!(dashboard.kafalat.workers_up_to_date, 1);
    assert_eq!(dashboard.kafalat.workers_overdue, 2);
    assert_eq!(dashboard.violations.iqama_total(), 2);
}
