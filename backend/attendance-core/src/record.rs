// src/record.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterConfigError;

// --- Core Data Structures ---

pub type EmployeeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "HR")]
    Hr,
    Engineering,
    Sales,
    Marketing,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Hr,
        Department::Engineering,
        Department::Sales,
        Department::Marketing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Hr => "HR",
            Department::Engineering => "Engineering",
            Department::Sales => "Sales",
            Department::Marketing => "Marketing",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = FilterConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| FilterConfigError::UnknownDepartment(s.to_string()))
    }
}

// Status as reported by the time clock. Not reconciled with `is_late`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row as supplied by a record source, before derivation.
///
/// Time cells are optional so that a feed row with a blank check-in or
/// check-out can be represented and rejected by derivation instead of at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendanceRecord {
    #[serde(rename = "Employee ID")]
    pub employee_id: EmployeeId,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Check-in Time")]
    pub check_in_time: Option<NaiveTime>,
    #[serde(rename = "Check-out Time")]
    pub check_out_time: Option<NaiveTime>,
    #[serde(rename = "Department")]
    pub department: Department,
    #[serde(rename = "Attendance Status")]
    pub attendance_status: AttendanceStatus,
}

/// A derived attendance record. `is_late` and `overtime_hours` are only ever
/// written by [`crate::derivation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "Employee ID")]
    pub employee_id: EmployeeId,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Check-in Time")]
    pub check_in_time: NaiveTime,
    #[serde(rename = "Check-out Time")]
    pub check_out_time: NaiveTime,
    #[serde(rename = "Department")]
    pub department: Department,
    #[serde(rename = "Attendance Status")]
    pub attendance_status: AttendanceStatus,
    #[serde(rename = "Is Late")]
    pub is_late: bool,
    #[serde(rename = "Overtime Hours")]
    pub overtime_hours: u32,
}

// Dropping the derived fields lets already-derived rows go through derivation again.
impl From<AttendanceRecord> for RawAttendanceRecord {
    fn from(record: AttendanceRecord) -> Self {
        RawAttendanceRecord {
            employee_id: record.employee_id,
            date: record.date,
            check_in_time: Some(record.check_in_time),
            check_out_time: Some(record.check_out_time),
            department: record.department,
            attendance_status: record.attendance_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_parses_exact_labels() {
        assert_eq!("HR".parse::<Department>().unwrap(), Department::Hr);
        assert_eq!(
            " Sales ".parse::<Department>(),
            Err(FilterConfigError::UnknownDepartment(" Sales ".to_string()))
        );
        assert_eq!(
            "hr".parse::<Department>(),
            Err(FilterConfigError::UnknownDepartment("hr".to_string()))
        );
    }

    #[test]
    fn department_serializes_with_display_label() {
        let json = serde_json::to_string(&Department::Hr).unwrap();
        assert_eq!(json, "\"HR\"");
        let back: Department = serde_json::from_str("\"Engineering\"").unwrap();
        assert_eq!(back, Department::Engineering);
    }

    #[test]
    fn converting_to_raw_keeps_source_fields() {
        let record = AttendanceRecord {
            employee_id: "1042".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            check_in_time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            check_out_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            department: Department::Sales,
            attendance_status: AttendanceStatus::Present,
            is_late: true,
            overtime_hours: 1,
        };
        let raw = RawAttendanceRecord::from(record.clone());
        assert_eq!(raw.employee_id, record.employee_id);
        assert_eq!(raw.check_in_time, Some(record.check_in_time));
        assert_eq!(raw.check_out_time, Some(record.check_out_time));
        assert_eq!(raw.attendance_status, AttendanceStatus::Present);
    }
}
