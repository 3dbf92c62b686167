// src/derivation.rs
use chrono::{NaiveTime, Timelike};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::record::{AttendanceRecord, AttendanceStatus, RawAttendanceRecord};

// --- Constants ---

/// Check-ins strictly after this time of day are late.
pub const LATENESS_THRESHOLD_SECS: u32 = 9 * 60 * 60;
/// Whole hours of checkout past this hour count as overtime.
pub const OVERTIME_THRESHOLD_HOUR: u32 = 17;

pub fn lateness_threshold() -> NaiveTime {
    NaiveTime::MIN + chrono::Duration::seconds(i64::from(LATENESS_THRESHOLD_SECS))
}

pub fn is_late(check_in_time: NaiveTime) -> bool {
    // Sub-second precision still counts: 09:00:00.5 is after the threshold.
    check_in_time > lateness_threshold()
}

/// Only the hour of the checkout is used, so 17:59 is still zero overtime.
pub fn overtime_hours(check_out_time: NaiveTime) -> u32 {
    check_out_time.hour().saturating_sub(OVERTIME_THRESHOLD_HOUR)
}

/// Derives a single row. `index` is the row's position in the batch and is only
/// used for error reporting.
pub fn derive_record(index: usize, raw: RawAttendanceRecord) -> PipelineResult<AttendanceRecord> {
    let check_in_time = raw.check_in_time.ok_or_else(|| PipelineError::MalformedRecord {
        index,
        employee_id: raw.employee_id.clone(),
        field: "check_in_time".to_string(),
    })?;
    let check_out_time = raw.check_out_time.ok_or_else(|| PipelineError::MalformedRecord {
        index,
        employee_id: raw.employee_id.clone(),
        field: "check_out_time".to_string(),
    })?;

    Ok(AttendanceRecord {
        employee_id: raw.employee_id,
        date: raw.date,
        check_in_time,
        check_out_time,
        department: raw.department,
        attendance_status: raw.attendance_status,
        is_late: is_late(check_in_time),
        overtime_hours: overtime_hours(check_out_time),
    })
}

/// Annotates every record with `is_late` and `overtime_hours`, preserving order.
///
/// Accepts raw rows as well as already-derived ones; derived fields on the input
/// are discarded and recomputed. Fails on the first row missing a time field.
pub fn derive<I, R>(records: I) -> PipelineResult<Vec<AttendanceRecord>>
where
    I: IntoIterator<Item = R>,
    R: Into<RawAttendanceRecord>,
{
    let derived = records
        .into_iter()
        .enumerate()
        .map(|(index, raw)| derive_record(index, raw.into()))
        .collect::<PipelineResult<Vec<_>>>()?;

    let disagreements = derived
        .iter()
        .filter(|r| r.is_late != (r.attendance_status == AttendanceStatus::Late))
        .count();
    debug!(
        "Derived {} records ({} with status disagreeing with lateness)",
        derived.len(),
        disagreements
    );

    Ok(derived)
}
