/// Unpaid months at which a worker's kafalat standing becomes overdue.
pub const DEFAULT_OVERDUE_AFTER_MONTHS: u32 = 3;
/// Upper bound (inclusive) of the critical expiry tier, in days.
pub const DEFAULT_CRITICAL_WITHIN_DAYS: i64 = 10;
/// Upper bound (inclusive) of the warning expiry tier and of the violation window.
pub const DEFAULT_WARNING_WITHIN_DAYS: i64 = 30;
/// Years before the reference date that the ledger accepts month selections for.
pub const DEFAULT_HISTORY_YEARS: u32 = 2;
/// Years after the reference date that the ledger accepts advance payments for.
pub const DEFAULT_ADVANCE_YEARS: u32 = 2;

/// Severity thresholds shared by the status engine, the classifier, and the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationPolicy {
    overdue_after_months: u32,
    critical_within_days: i64,
    warning_within_days: i64,
    history_years: u32,
    advance_years: u32,
}

impl ViolationPolicy {
    pub fn new(
        overdue_after_months: u32,
        critical_within_days: i64,
        warning_within_days: i64,
    ) -> Self {
        let overdue_after_months = if overdue_after_months == 0 {
            DEFAULT_OVERDUE_AFTER_MONTHS
        } else {
            overdue_after_months
        };

        let (critical_within_days, warning_within_days) =
            if critical_within_days < 0 || warning_within_days < critical_within_days {
                (DEFAULT_CRITICAL_WITHIN_DAYS, DEFAULT_WARNING_WITHIN_DAYS)
            } else {
                (critical_within_days, warning_within_days)
            };

        Self {
            overdue_after_months,
            critical_within_days,
            warning_within_days,
            history_years: DEFAULT_HISTORY_YEARS,
            advance_years: DEFAULT_ADVANCE_YEARS,
        }
    }

    /// Override how far back and ahead the ledger accepts month selections.
    pub fn with_selection_years(mut self, history_years: u32, advance_years: u32) -> Self {
        self.history_years = history_years;
        self.advance_years = advance_years;
        self
    }

    pub fn overdue_after_months(&self) -> u32 {
        self.overdue_after_months
    }

    pub fn critical_within_days(&self) -> i64 {
        self.critical_within_days
    }

    pub fn warning_within_days(&self) -> i64 {
        self.warning_within_days
    }

    pub fn history_years(&self) -> u32 {
        self.history_years
    }

    pub fn advance_years(&self) -> u32 {
        self.advance_years
    }
}

impl Default for ViolationPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_OVERDUE_AFTER_MONTHS,
            DEFAULT_CRITICAL_WITHIN_DAYS,
            DEFAULT_WARNING_WITHIN_DAYS,
        )
    }
}
