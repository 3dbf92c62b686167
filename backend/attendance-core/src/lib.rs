// src/lib.rs
pub mod aggregation;
pub mod config;
pub mod derivation;
pub mod error;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod server;
pub mod source;


pub use aggregation::{Report, TimeField};
pub use config::Config;
pub use derivation::derive;
pub use error::{FilterConfigError, PipelineError, PipelineResult};
pub use filter::{filter, DateRange, FilterConfig};
pub use record::{AttendanceRecord, AttendanceStatus, Department, EmployeeId, RawAttendanceRecord};
pub use registry::{add_employee, add_shift, Employee, SessionState, Shift};
pub use source::{CsvSource, MockSource, RecordSource};
