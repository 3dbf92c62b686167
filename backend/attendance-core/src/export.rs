// src/export.rs
use std::io::{Read, Write};
use tracing::{debug, info};

use crate::error::{csv_context, PipelineError, PipelineResult};
use crate::record::{AttendanceRecord, RawAttendanceRecord};

/// Column order of an exported record set.
pub const EXPORT_COLUMNS: [&str; 8] = [
    "Employee ID",
    "Date",
    "Check-in Time",
    "Check-out Time",
    "Department",
    "Attendance Status",
    "Is Late",
    "Overtime Hours",
];

/// Writes a header row followed by one row per record, in input order.
/// The header is written even when `records` is empty.
pub fn write_csv<W: Write>(writer: W, records: &[AttendanceRecord]) -> PipelineResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(EXPORT_COLUMNS)
        .map_err(|e| csv_context(e, "writing CSV header"))?;
    for (index, record) in records.iter().enumerate() {
        wtr.serialize(record)
            .map_err(|e| csv_context(e, format!("writing CSV row {}", index)))?;
    }
    wtr.flush().map_err(|e| PipelineError::Io {
        source: e,
        context: "flushing CSV writer".to_string(),
    })?;

    debug!("Wrote {} records as CSV", records.len());
    Ok(())
}

pub fn to_csv_string(records: &[AttendanceRecord]) -> PipelineResult<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, records)?;
    // The csv writer only ever emits what serde gave it, which is UTF-8.
    String::from_utf8(buf).map_err(|e| PipelineError::Io {
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        context: "CSV output was not UTF-8".to_string(),
    })
}

/// Parses an attendance feed. Derived columns, if present, are ignored.
pub fn read_raw_csv<R: Read>(reader: R) -> PipelineResult<Vec<RawAttendanceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in rdr.deserialize::<RawAttendanceRecord>().enumerate() {
        let record = row.map_err(|e| csv_context(e, format!("reading attendance row {}", index)))?;
        records.push(record);
    }
    info!("Read {} attendance rows from CSV", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::derive;
    use crate::record::{AttendanceStatus, Department};
    use chrono::{NaiveDate, NaiveTime};

    const FEED: &str = "\
Employee ID,Date,Check-in Time,Check-out Time,Department,Attendance Status
1042,2024-01-03,09:15:00,18:30:00,Sales,Present
1043,2024-01-04,08:45:00,17:59:00,HR,Late
";

    #[test]
    fn reads_a_feed_in_order() {
        let rows = read_raw_csv(FEED.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].employee_id, "1042");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(rows[0].check_in_time, NaiveTime::from_hms_opt(9, 15, 0));
        assert_eq!(rows[1].department, Department::Hr);
        assert_eq!(rows[1].attendance_status, AttendanceStatus::Late);
    }

    #[test]
    fn blank_time_cell_becomes_malformed_on_derive() {
        let feed = "\
Employee ID,Date,Check-in Time,Check-out Time,Department,Attendance Status
1042,2024-01-03,,18:30:00,Sales,Present
";
        let rows = read_raw_csv(feed.as_bytes()).unwrap();
        assert_eq!(rows[0].check_in_time, None);
        assert!(matches!(
            derive(rows),
            Err(PipelineError::MalformedRecord { index: 0, .. })
        ));
    }

    #[test]
    fn unknown_department_is_rejected() {
        let feed = "\
Employee ID,Date,Check-in Time,Check-out Time,Department,Attendance Status
1042,2024-01-03,09:00:00,17:00:00,Legal,Present
";
        assert!(matches!(
            read_raw_csv(feed.as_bytes()),
            Err(PipelineError::Csv { .. })
        ));
    }

    #[test]
    fn export_has_fixed_columns_and_derived_fields() {
        let records = derive(read_raw_csv(FEED.as_bytes()).unwrap()).unwrap();
        let out = to_csv_string(&records).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("Employee ID,Date,Check-in Time,Check-out Time,Department,Attendance Status,Is Late,Overtime Hours")
        );
        assert_eq!(
            lines.next(),
            Some("1042,2024-01-03,09:15:00,18:30:00,Sales,Present,true,1")
        );
        assert_eq!(
            lines.next(),
            Some("1043,2024-01-04,08:45:00,17:59:00,HR,Late,false,0")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn export_of_empty_set_is_header_only() {
        let out = to_csv_string(&[]).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn exported_file_reads_back_as_a_feed() {
        let records = derive(read_raw_csv(FEED.as_bytes()).unwrap()).unwrap();
        let out = to_csv_string(&records).unwrap();
        let reread = derive(read_raw_csv(out.as_bytes()).unwrap()).unwrap();
        assert_eq!(reread, records);
    }
}
