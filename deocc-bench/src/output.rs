//! Per-strategy CSV output, matching the column layout and file naming
//! convention of the reference harness's three `*_execution_times.csv`
//! writers.

use std::path::{Path, PathBuf};

use deocc_core::BlockTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Serial,
    OccWsi,
    Deocc,
}

impl Strategy {
    fn file_tag(self) -> &'static str {
        match self {
            Strategy::Serial => "serial",
            Strategy::OccWsi => "wsi",
            Strategy::Deocc => "deocc",
        }
    }

    fn header(self) -> &'static [&'static str] {
        match self {
            Strategy::Serial => &["BlockNumber", "ExecutionTime(ms)"],
            Strategy::OccWsi => &["BlockNumber", "ExecutionTime(ms)", "ValidationTime(ms)"],
            Strategy::Deocc => &["BlockNumber", "ExecutionTime(ms)", "ValidationTime(ms)", "needRW"],
        }
    }

    fn has_validation_phase(self) -> bool {
        !matches!(self, Strategy::Serial)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_tag())
    }
}

/// Writes one strategy's per-block timings to
/// `<output_directory>/<worker_count><label>_<strategy>_execution_times.csv`
/// and returns the path written.
pub fn write_strategy_output(
    output_directory: &Path,
    worker_count: usize,
    label: &str,
    strategy: Strategy,
    timings: &[BlockTiming],
) -> std::io::Result<PathBuf> {
    let file_name = format!("{worker_count}{label}_{}_execution_times.csv", strategy.file_tag());
    let path = output_directory.join(file_name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(strategy.header())?;

    let mut total_execution_ms: u128 = 0;
    let mut total_validation_ms: u128 = 0;
    for timing in timings {
        total_execution_ms += timing.execution_ms;
        let mut row = vec![timing.block_id.clone(), timing.execution_ms.to_string()];
        if let Some(validation_ms) = timing.validation_ms {
            total_validation_ms += validation_ms;
            row.push(validation_ms.to_string());
        }
        if let Some(need_rw) = timing.need_rw {
            row.push(need_rw.to_string());
        }
        writer.write_record(&row)?;
    }

    writer.write_record(["Total Execution Time", &total_execution_ms.to_string()])?;
    if strategy.has_validation_phase() {
        writer.write_record(["Total Validation Time", &total_validation_ms.to_string()])?;
    }
    writer.flush()?;
    Ok(path)
}
