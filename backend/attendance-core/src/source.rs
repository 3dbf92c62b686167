// src/source.rs
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{io_context, PipelineResult};
use crate::export::read_raw_csv;
use crate::record::{AttendanceStatus, Department, EmployeeId, RawAttendanceRecord};
use crate::registry::SessionState;

/// Supplies raw attendance rows. The session registries may be consulted to
/// bias what is produced; a source never writes to them.
pub trait RecordSource {
    fn fetch_records(
        &mut self,
        count: usize,
        session: &SessionState,
    ) -> PipelineResult<Vec<RawAttendanceRecord>>;
}

// --- Mock source ---

const MOCK_ID_RANGE: std::ops::Range<u32> = 1000..1300;
const MOCK_DATE_SPREAD_DAYS: usize = 100;
// Present / Absent / Late
const STATUS_WEIGHTS: [u32; 3] = [7, 2, 1];
const STATUSES: [AttendanceStatus; 3] = [
    AttendanceStatus::Present,
    AttendanceStatus::Absent,
    AttendanceStatus::Late,
];

/// Random stand-in for a time-clock feed.
pub struct MockSource {
    rng: StdRng,
    today: NaiveDate,
}

impl MockSource {
    pub fn new(today: NaiveDate, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today,
        }
    }

    pub fn from_entropy(today: NaiveDate) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            today,
        }
    }

    fn pick_employee(&mut self, session: &SessionState) -> (EmployeeId, Department) {
        // Registered employees are only used once shifts exist too.
        if !session.employees.is_empty() && !session.shifts.is_empty() {
            if let Some(employee) = session.employees.choose(&mut self.rng) {
                let department = session
                    .department_of(&employee.employee_id)
                    .unwrap_or(employee.department);
                return (employee.employee_id.clone(), department);
            }
        }
        let id = self.rng.gen_range(MOCK_ID_RANGE);
        let department = Department::ALL[self.rng.gen_range(0..Department::ALL.len())];
        (id.to_string(), department)
    }

    fn pick_times(&mut self, session: &SessionState) -> (NaiveTime, NaiveTime) {
        if let Some(shift) = session.shifts.choose(&mut self.rng) {
            let check_in = shift.start_time + Duration::minutes(self.rng.gen_range(-30..30));
            let check_out = shift.end_time + Duration::minutes(self.rng.gen_range(-30..60));
            return (check_in, check_out);
        }
        // Any minute from 08:30 to 10:30, and from 16:00 to 20:00, inclusive.
        let check_in =
            NaiveTime::MIN + Duration::minutes(8 * 60 + 30 + self.rng.gen_range(0..=120));
        let check_out = NaiveTime::MIN + Duration::minutes(16 * 60 + self.rng.gen_range(0..=240));
        (check_in, check_out)
    }
}

impl RecordSource for MockSource {
    fn fetch_records(
        &mut self,
        count: usize,
        session: &SessionState,
    ) -> PipelineResult<Vec<RawAttendanceRecord>> {
        if session.employees.is_empty() || session.shifts.is_empty() {
            warn!("No employees or shifts registered; generating default ids and departments");
        }
        // Weights are constant and non-zero, so this cannot fail.
        let statuses = WeightedIndex::new(STATUS_WEIGHTS).ok();

        let mut records = Vec::new();
        for i in 0..count {
            let (employee_id, department) = self.pick_employee(session);
            let (check_in, check_out) = self.pick_times(session);
            let attendance_status = statuses
                .as_ref()
                .map(|dist| STATUSES[dist.sample(&mut self.rng)])
                .unwrap_or(AttendanceStatus::Present);
            let offset = (i % MOCK_DATE_SPREAD_DAYS) as i64;

            records.push(RawAttendanceRecord {
                employee_id,
                date: self.today - Duration::days(offset),
                check_in_time: Some(check_in),
                check_out_time: Some(check_out),
                department,
                attendance_status,
            });
        }
        debug!("Generated {} mock attendance records", records.len());
        Ok(records)
    }
}

// --- CSV source ---

/// Reads a CSV attendance feed from disk on every fetch.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvSource {
    fn fetch_records(
        &mut self,
        count: usize,
        _session: &SessionState,
    ) -> PipelineResult<Vec<RawAttendanceRecord>> {
        let file = File::open(&self.path)
            .map_err(|e| io_context(e, format!("opening attendance feed {}", self.path.display())))?;
        let mut records = read_raw_csv(file)?;
        records.truncate(count);
        info!(
            "Loaded {} attendance rows from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
