// src/main.rs
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendance_core::export::write_csv;
use attendance_core::registry::{read_employees_csv, read_shifts_csv};
use attendance_core::server::{self, AppState};
use attendance_core::{
    add_employee, add_shift, pipeline, Config, CsvSource, Department, FilterConfig, MockSource,
    RecordSource, Report, SessionState,
};

#[derive(Parser, Debug)]
#[command(name = "attendance-core", version, about = "Time-and-attendance reports")]
struct Cli {
    /// CSV attendance feed to read instead of generating mock records
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Number of records to fetch from the source
    #[arg(long, global = true)]
    count: Option<usize>,

    /// Seed for the mock source, for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Employee registry CSV (Employee ID,Name,Department,Role)
    #[arg(long, global = true)]
    employees: Option<PathBuf>,

    /// Shift registry CSV (Shift ID,Shift Name,Start Time,End Time,Assigned Employees)
    #[arg(long, global = true)]
    shifts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every aggregate over the filtered records as JSON
    Report {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the filtered, derived records as JSON
    Records {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the filtered records as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Run the dashboard HTTP API
    Serve,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Repeat to select several departments
    #[arg(long = "department")]
    departments: Vec<Department>,
    /// Substring of the employee id
    #[arg(long)]
    employee: Option<String>,
}

impl FilterArgs {
    fn to_filter_config(&self, today: NaiveDate, window_days: i64) -> Result<FilterConfig> {
        let mut config = FilterConfig::for_bounds(self.start, self.end, today, window_days)
            .context("Invalid date range")?;
        if !self.departments.is_empty() {
            config = config.with_departments(self.departments.iter().copied());
        }
        if let Some(needle) = self.employee.as_deref().filter(|s| !s.is_empty()) {
            config = config.with_employee_substring(needle);
        }
        Ok(config)
    }
}

fn load_session(cli: &Cli) -> Result<SessionState> {
    let mut session = SessionState::new();
    if let Some(path) = &cli.employees {
        let file = File::open(path)
            .with_context(|| format!("Opening employee registry {}", path.display()))?;
        for employee in read_employees_csv(file)? {
            session = add_employee(session, employee)?;
        }
    }
    if let Some(path) = &cli.shifts {
        let file = File::open(path)
            .with_context(|| format!("Opening shift registry {}", path.display()))?;
        for shift in read_shifts_csv(file)? {
            session = add_shift(session, shift)?;
        }
    }
    info!(
        "Session loaded: {} employees, {} shifts",
        session.employees.len(),
        session.shifts.len()
    );
    Ok(session)
}

fn build_source(cli: &Cli, today: NaiveDate) -> Box<dyn RecordSource + Send> {
    match (&cli.input, cli.seed) {
        (Some(path), _) => Box::new(CsvSource::new(path)),
        (None, Some(seed)) => Box::new(MockSource::new(today, seed)),
        (None, None) => Box::new(MockSource::from_entropy(today)),
    }
}

fn record_count(cli: &Cli, config: &Config) -> Result<usize> {
    match (cli.count, &cli.input) {
        // A feed file is read in full unless a count is given.
        (None, Some(_)) => Ok(usize::MAX),
        (requested, _) => config
            .record_count(requested)
            .context("Invalid record count"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Loading configuration from environment failed")?;

    // Logs go to stderr so report/export output on stdout stays clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let today = Local::now().date_naive();
    let session = load_session(&cli)?;
    let mut source = build_source(&cli, today);
    let count = record_count(&cli, &config)?;

    match &cli.command {
        Command::Report { filters } => {
            let filter_config = filters.to_filter_config(today, config.default_window_days)?;
            let output = pipeline::run(source.as_mut(), &session, count, &filter_config)?;
            let report = Report::build(&output.filtered);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Records { filters } => {
            let filter_config = filters.to_filter_config(today, config.default_window_days)?;
            let output = pipeline::run(source.as_mut(), &session, count, &filter_config)?;
            println!("{}", serde_json::to_string_pretty(&output.filtered)?);
        }
        Command::Export { filters, output } => {
            let filter_config = filters.to_filter_config(today, config.default_window_days)?;
            let result = pipeline::run(source.as_mut(), &session, count, &filter_config)?;
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Creating export file {}", path.display()))?;
                    write_csv(file, &result.filtered)?;
                    info!("Exported {} records to {}", result.filtered.len(), path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    write_csv(&mut handle, &result.filtered)?;
                    handle.flush()?;
                }
            }
        }
        Command::Serve => {
            info!("Starting dashboard API");
            let state = AppState::new(config.clone(), session, source);
            server::serve(state).await.context("Dashboard API server failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn filters_of(args: &[&str]) -> FilterArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Command::Report { filters } | Command::Records { filters } => filters,
            Command::Export { filters, .. } => filters,
            Command::Serve => panic!("serve has no filters"),
        }
    }

    #[test]
    fn repeated_department_flags_are_collected() {
        let filters = filters_of(&[
            "attendance-core",
            "records",
            "--department",
            "HR",
            "--department",
            "Sales",
        ]);
        let config = filters.to_filter_config(d("2024-06-30"), 30).unwrap();
        assert_eq!(
            config.departments.into_iter().collect::<Vec<_>>(),
            vec![Department::Hr, Department::Sales]
        );
        assert_eq!(config.date_range.start(), d("2024-05-31"));
    }

    #[test]
    fn empty_employee_flag_does_not_filter() {
        let filters = filters_of(&["attendance-core", "report", "--employee", ""]);
        let config = filters.to_filter_config(d("2024-06-30"), 30).unwrap();
        assert_eq!(config.employee_substring, None);
        assert_eq!(config.departments.len(), 4);

        let filters = filters_of(&["attendance-core", "export", "--employee", "12", "-o", "out.csv"]);
        let config = filters.to_filter_config(d("2024-06-30"), 30).unwrap();
        assert_eq!(config.employee_substring.as_deref(), Some("12"));
    }

    #[test]
    fn unknown_department_flag_is_a_parse_error() {
        assert!(Cli::try_parse_from(["attendance-core", "records", "--department", "Legal"]).is_err());
    }

    #[test]
    fn half_open_range_is_rejected() {
        let filters = filters_of(&["attendance-core", "records", "--start", "2024-01-01"]);
        assert!(filters.to_filter_config(d("2024-06-30"), 30).is_err());
    }

    #[test]
    fn explicit_count_is_capped() {
        let config = Config::default();
        let cli = Cli::try_parse_from(["attendance-core", "--count", "1000000000", "serve"]).unwrap();
        assert!(record_count(&cli, &config).is_err());

        let cli = Cli::try_parse_from(["attendance-core", "--count", "25", "serve"]).unwrap();
        assert_eq!(record_count(&cli, &config).unwrap(), 25);

        let cli = Cli::try_parse_from(["attendance-core", "serve"]).unwrap();
        assert_eq!(record_count(&cli, &config).unwrap(), config.mock_record_count);

        let cli = Cli::try_parse_from(["attendance-core", "--input", "feed.csv", "serve"]).unwrap();
        assert_eq!(record_count(&cli, &config).unwrap(), usize::MAX);
    }
}
