// src/filter.rs
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::FilterConfigError;
use crate::record::{AttendanceRecord, Department};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterConfigError> {
        if start > end {
            return Err(FilterConfigError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Both bounds are required; a half-open range is a configuration error.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, FilterConfigError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(FilterConfigError::MissingBound { start, end }),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub date_range: DateRange,
    /// Empty means every department passes.
    pub departments: BTreeSet<Department>,
    /// `None` or empty means every employee passes.
    pub employee_substring: Option<String>,
}

impl FilterConfig {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            departments: BTreeSet::new(),
            employee_substring: None,
        }
    }

    /// The dashboard's initial state: the last `days` days up to `today`, every
    /// department, no employee search. Negative `days` select only `today`.
    pub fn default_window(today: NaiveDate, days: i64) -> Result<Self, FilterConfigError> {
        let start = today
            .checked_sub_days(Days::new(days.max(0).unsigned_abs()))
            .ok_or(FilterConfigError::WindowOutOfRange { today, days })?;
        Ok(Self {
            date_range: DateRange { start, end: today },
            departments: Department::ALL.into_iter().collect(),
            employee_substring: None,
        })
    }

    /// Resolves user-supplied bounds: none at all selects the default window,
    /// exactly one is an error.
    pub fn for_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Self, FilterConfigError> {
        match (start, end) {
            (None, None) => Self::default_window(today, window_days),
            (start, end) => Ok(Self::new(DateRange::from_bounds(start, end)?)),
        }
    }

    pub fn with_departments<I: IntoIterator<Item = Department>>(mut self, departments: I) -> Self {
        self.departments = departments.into_iter().collect();
        self
    }

    pub fn with_employee_substring<S: Into<String>>(mut self, needle: S) -> Self {
        self.employee_substring = Some(needle.into());
        self
    }
}

// --- Predicates ---

pub fn by_date_range(range: &DateRange) -> impl Fn(&AttendanceRecord) -> bool + '_ {
    move |r: &AttendanceRecord| range.contains(r.date)
}

pub fn by_departments(departments: &BTreeSet<Department>) -> impl Fn(&AttendanceRecord) -> bool + '_ {
    move |r: &AttendanceRecord| departments.is_empty() || departments.contains(&r.department)
}

/// Case-sensitive substring match on the id's string form.
pub fn by_employee_substring(needle: Option<&str>) -> impl Fn(&AttendanceRecord) -> bool + '_ {
    move |r: &AttendanceRecord| match needle {
        Some(n) if !n.is_empty() => r.employee_id.contains(n),
        _ => true,
    }
}

/// Keeps the records matching every configured criterion, in input order.
pub fn filter(records: &[AttendanceRecord], config: &FilterConfig) -> Vec<AttendanceRecord> {
    let in_range = by_date_range(&config.date_range);
    let in_department = by_departments(&config.departments);
    let matches_employee = by_employee_substring(config.employee_substring.as_deref());

    records
        .iter()
        .filter(|&r| in_range(r) && in_department(r) && matches_employee(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AttendanceStatus;
    use chrono::NaiveTime;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn record(id: &str, date: &str, department: Department) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: id.to_string(),
            date: d(date),
            check_in_time: NaiveTime::from_hms_opt(8, 55, 0).unwrap(),
            check_out_time: NaiveTime::from_hms_opt(17, 5, 0).unwrap(),
            department,
            attendance_status: AttendanceStatus::Present,
            is_late: false,
            overtime_hours: 0,
        }
    }

    fn january() -> DateRange {
        DateRange::new(d("2024-01-01"), d("2024-01-31")).unwrap()
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let err = DateRange::new(d("2024-02-01"), d("2024-01-01")).unwrap_err();
        assert_eq!(
            err,
            FilterConfigError::InvertedRange {
                start: d("2024-02-01"),
                end: d("2024-01-01")
            }
        );
    }

    #[test]
    fn range_requires_both_bounds() {
        assert!(matches!(
            DateRange::from_bounds(Some(d("2024-01-01")), None),
            Err(FilterConfigError::MissingBound { .. })
        ));
        assert!(matches!(
            DateRange::from_bounds(None, Some(d("2024-01-01"))),
            Err(FilterConfigError::MissingBound { .. })
        ));
        assert!(DateRange::from_bounds(Some(d("2024-01-01")), Some(d("2024-01-01"))).is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = january();
        assert!(range.contains(d("2024-01-01")));
        assert!(range.contains(d("2024-01-31")));
        assert!(!range.contains(d("2023-12-31")));
        assert!(!range.contains(d("2024-02-01")));
    }

    #[test]
    fn record_after_range_is_excluded() {
        let records = vec![
            record("1001", "2024-01-31", Department::Hr),
            record("1002", "2024-02-01", Department::Hr),
        ];
        let kept = filter(&records, &FilterConfig::new(january()));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].employee_id, "1001");
    }

    #[test]
    fn department_set_keeps_members_only() {
        let records = vec![
            record("1001", "2024-01-10", Department::Engineering),
            record("1002", "2024-01-10", Department::Hr),
            record("1003", "2024-01-10", Department::Sales),
        ];
        let config =
            FilterConfig::new(january()).with_departments([Department::Hr, Department::Sales]);
        let kept: Vec<_> = filter(&records, &config)
            .into_iter()
            .map(|r| r.employee_id)
            .collect();
        assert_eq!(kept, vec!["1002", "1003"]);
    }

    #[test]
    fn employee_search_is_a_case_sensitive_substring() {
        let mut records = vec![
            record("1123", "2024-01-10", Department::Hr),
            record("1212", "2024-01-10", Department::Hr),
            record("1300", "2024-01-10", Department::Hr),
        ];
        records.push(record("emp-12", "2024-01-10", Department::Hr));
        records.push(record("EMP-12", "2024-01-10", Department::Hr));

        let kept: Vec<_> = filter(&records, &FilterConfig::new(january()).with_employee_substring("12"))
            .into_iter()
            .map(|r| r.employee_id)
            .collect();
        assert_eq!(kept, vec!["1123", "1212", "emp-12", "EMP-12"]);

        let kept = filter(&records, &FilterConfig::new(january()).with_employee_substring("emp"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].employee_id, "emp-12");
    }

    #[test]
    fn empty_search_string_passes_everything() {
        let records = vec![
            record("1001", "2024-01-10", Department::Hr),
            record("1002", "2024-01-11", Department::Marketing),
        ];
        let kept = filter(&records, &FilterConfig::new(january()).with_employee_substring(""));
        assert_eq!(kept, records);
    }

    #[test]
    fn for_bounds_defaults_only_when_both_are_missing() {
        let today = d("2024-06-30");
        let config = FilterConfig::for_bounds(None, None, today, 10).unwrap();
        assert_eq!(config.date_range.start(), d("2024-06-20"));

        let config =
            FilterConfig::for_bounds(Some(d("2024-01-01")), Some(d("2024-01-31")), today, 10)
                .unwrap();
        assert_eq!(config.date_range, january());
        assert!(config.departments.is_empty());

        assert!(FilterConfig::for_bounds(None, Some(today), today, 10).is_err());
    }

    #[test]
    fn default_window_spans_the_requested_days() {
        let config = FilterConfig::default_window(d("2024-06-30"), 365).unwrap();
        assert_eq!(config.date_range.start(), d("2023-07-01"));
        assert_eq!(config.date_range.end(), d("2024-06-30"));
        assert_eq!(config.departments.len(), 4);
        assert_eq!(config.employee_substring, None);
    }

    #[test]
    fn oversized_default_window_is_an_error() {
        let today = d("2024-06-30");
        assert_eq!(
            FilterConfig::default_window(today, i64::MAX),
            Err(FilterConfigError::WindowOutOfRange {
                today,
                days: i64::MAX
            })
        );
        assert!(FilterConfig::for_bounds(None, None, today, i64::MAX).is_err());

        let config = FilterConfig::default_window(today, -5).unwrap();
        assert_eq!(config.date_range.start(), today);
    }
}
