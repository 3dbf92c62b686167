// src/aggregation.rs
//
// Group-and-count / group-and-sum helpers over a derived, filtered record set.
// Every function returns an empty map for empty input.
use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::{AttendanceRecord, AttendanceStatus, Department, EmployeeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    CheckIn,
    CheckOut,
}

pub fn count_by_date(records: &[AttendanceRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.date).or_insert(0) += 1;
    }
    counts
}

/// Only late records produce keys.
pub fn count_late_by_date_and_department(
    records: &[AttendanceRecord],
) -> BTreeMap<(NaiveDate, Department), usize> {
    let mut counts = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_late) {
        *counts.entry((r.date, r.department)).or_insert(0) += 1;
    }
    counts
}

/// Only records with overtime produce keys, so no sum is ever zero.
pub fn sum_overtime_by_employee_and_date(
    records: &[AttendanceRecord],
) -> BTreeMap<(EmployeeId, NaiveDate), u32> {
    let mut sums = BTreeMap::new();
    for r in records.iter().filter(|r| r.overtime_hours > 0) {
        *sums.entry((r.employee_id.clone(), r.date)).or_insert(0) += r.overtime_hours;
    }
    sums
}

pub fn count_by_department(records: &[AttendanceRecord]) -> BTreeMap<Department, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.department).or_insert(0) += 1;
    }
    counts
}

pub fn count_by_status(records: &[AttendanceRecord]) -> BTreeMap<AttendanceStatus, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.attendance_status).or_insert(0) += 1;
    }
    counts
}

/// Hour of day (0-23) to number of records whose chosen time falls in that hour.
pub fn hour_histogram(records: &[AttendanceRecord], field: TimeField) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        let time = match field {
            TimeField::CheckIn => r.check_in_time,
            TimeField::CheckOut => r.check_out_time,
        };
        *counts.entry(time.hour()).or_insert(0) += 1;
    }
    counts
}

// --- Report rows ---
//
// Tuple-keyed maps don't serialize to JSON objects, so the presentation layer
// gets flat rows instead.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateCount {
    pub date: NaiveDate,
    pub department: Department,
    pub late_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSum {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub overtime_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total_records: usize,
    pub late_records: usize,
    pub total_overtime_hours: u32,
    pub attendance_trend: Vec<DateCount>,
    pub lateness: Vec<LateCount>,
    pub overtime: Vec<OvertimeSum>,
    pub by_department: BTreeMap<Department, usize>,
    pub by_status: BTreeMap<AttendanceStatus, usize>,
    pub check_in_hours: BTreeMap<u32, usize>,
    pub check_out_hours: BTreeMap<u32, usize>,
}

impl Report {
    pub fn build(records: &[AttendanceRecord]) -> Self {
        let attendance_trend = count_by_date(records)
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect();
        let lateness = count_late_by_date_and_department(records)
            .into_iter()
            .map(|((date, department), late_count)| LateCount {
                date,
                department,
                late_count,
            })
            .collect();
        let overtime = sum_overtime_by_employee_and_date(records)
            .into_iter()
            .map(|((employee_id, date), overtime_hours)| OvertimeSum {
                employee_id,
                date,
                overtime_hours,
            })
            .collect();

        Report {
            total_records: records.len(),
            late_records: records.iter().filter(|r| r.is_late).count(),
            total_overtime_hours: records.iter().map(|r| r.overtime_hours).sum(),
            attendance_trend,
            lateness,
            overtime,
            by_department: count_by_department(records),
            by_status: count_by_status(records),
            check_in_hours: hour_histogram(records, TimeField::CheckIn),
            check_out_hours: hour_histogram(records, TimeField::CheckOut),
        }
    }
}
