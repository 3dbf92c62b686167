// src/registry.rs
//
// Employee and shift registries. These are plain values owned by the caller:
// every mutation consumes the old state and hands back the new one.
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::info;

use crate::error::{csv_context, PipelineError, PipelineResult};
use crate::record::{Department, EmployeeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "Employee ID")]
    pub employee_id: EmployeeId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Department")]
    pub department: Department,
    #[serde(rename = "Role", default)]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(rename = "Shift ID")]
    pub shift_id: String,
    #[serde(rename = "Shift Name")]
    pub shift_name: String,
    #[serde(rename = "Start Time", default = "default_shift_start")]
    pub start_time: NaiveTime,
    #[serde(rename = "End Time", default = "default_shift_end")]
    pub end_time: NaiveTime,
    #[serde(rename = "Assigned Employees", with = "joined_list", default)]
    pub assigned_employees: Vec<String>,
}

fn default_shift_start() -> NaiveTime {
    NaiveTime::MIN + chrono::Duration::hours(9)
}

fn default_shift_end() -> NaiveTime {
    NaiveTime::MIN + chrono::Duration::hours(17)
}

// Assigned employees travel as one ", "-joined cell.
mod joined_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(names: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&names.join(", "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let joined = String::deserialize(deserializer)?;
        Ok(joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department_of(&self, employee_id: &str) -> Option<Department> {
        self.employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .map(|e| e.department)
    }
}

/// Appends an employee. Duplicate ids are kept; a blank id is rejected.
pub fn add_employee(mut state: SessionState, employee: Employee) -> PipelineResult<SessionState> {
    if employee.employee_id.trim().is_empty() {
        return Err(PipelineError::InvalidRegistryEntry(
            "employee id must not be blank".to_string(),
        ));
    }
    info!(
        "Employee {} ({}) added to {}",
        employee.name, employee.employee_id, employee.department
    );
    state.employees.push(employee);
    Ok(state)
}

/// Appends a shift. A blank id is rejected.
pub fn add_shift(mut state: SessionState, shift: Shift) -> PipelineResult<SessionState> {
    if shift.shift_id.trim().is_empty() {
        return Err(PipelineError::InvalidRegistryEntry(
            "shift id must not be blank".to_string(),
        ));
    }
    info!(
        "Shift {} ({}) added: {} - {}",
        shift.shift_name, shift.shift_id, shift.start_time, shift.end_time
    );
    state.shifts.push(shift);
    Ok(state)
}

pub fn read_employees_csv<R: Read>(reader: R) -> PipelineResult<Vec<Employee>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr
        .deserialize::<Employee>()
        .enumerate()
        .map(|(index, row)| row.map_err(|e| csv_context(e, format!("reading employee row {}", index))))
        .collect::<PipelineResult<Vec<_>>>()?;
    info!("Read {} employee rows from CSV", rows.len());
    Ok(rows)
}

pub fn read_shifts_csv<R: Read>(reader: R) -> PipelineResult<Vec<Shift>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr
        .deserialize::<Shift>()
        .enumerate()
        .map(|(index, row)| row.map_err(|e| csv_context(e, format!("reading shift row {}", index))))
        .collect::<PipelineResult<Vec<_>>>()?;
    info!("Read {} shift rows from CSV", rows.len());
    Ok(rows)
}
