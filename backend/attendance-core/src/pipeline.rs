// src/pipeline.rs
use serde::Serialize;
use tracing::info;

use crate::derivation::derive;
use crate::error::PipelineResult;
use crate::filter::{filter, FilterConfig};
use crate::record::AttendanceRecord;
use crate::registry::SessionState;
use crate::source::RecordSource;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Every fetched record, derived.
    pub derived: Vec<AttendanceRecord>,
    /// The subset passing the filter, in source order.
    pub filtered: Vec<AttendanceRecord>,
}

/// Source -> Derivation -> Filter. Re-fetches on every call.
pub fn run(
    source: &mut dyn RecordSource,
    session: &SessionState,
    count: usize,
    config: &FilterConfig,
) -> PipelineResult<PipelineOutput> {
    let raw = source.fetch_records(count, session)?;
    let derived = derive(raw)?;
    let filtered = filter(&derived, config);
    info!(
        "Pipeline run: {} fetched, {} after filtering ({} to {})",
        derived.len(),
        filtered.len(),
        config.date_range.start(),
        config.date_range.end()
    );
    Ok(PipelineOutput { derived, filtered })
}
