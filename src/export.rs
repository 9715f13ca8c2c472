//! Per-event waveform extraction and CSV export.
//!
//! For each merged record the exporter reads the raw transient, converts
//! amplitude to millivolts and time to microseconds, and writes a two-column
//! CSV into the staged waveforms folder. A failed read never halts the
//! sequence: it is collected per event and resolved according to the
//! configured policy.

use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::db::WaveformReader;
use crate::error::{ReadFailure, Result};
use crate::progress::ProgressReporter;
use crate::records::MergedRecord;

/// What to do with an event whose waveform read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingWaveformPolicy {
    /// Drop the event entirely: no waveform file and no summary row.
    /// Matches the original tool.
    #[default]
    DropEvent,
    /// Keep the summary row with an empty filename cell.
    KeepRow,
}

/// One row of a per-event waveform CSV.
#[derive(Debug, Serialize)]
struct WavePoint {
    #[serde(rename = "Time_us")]
    time_us: f64,
    #[serde(rename = "Amplitude_mV")]
    amplitude_mv: f64,
}

/// Outcome of the export stage.
#[derive(Debug, Default)]
pub struct ExportStats {
    /// Events whose waveform CSV was written.
    pub exported: usize,
    /// Per-event failures, for diagnostics.
    pub failures: Vec<ReadFailure>,
}

/// Deterministic per-event file name.
pub fn waveform_filename(event_id: i64) -> String {
    format!("EVENT_{event_id}.csv")
}

/// Export every merged record's waveform into `waveforms_dir`.
///
/// On success the generated filename is attached to the record. Under
/// [`MissingWaveformPolicy::DropEvent`] failed records are removed from
/// `records`; under `KeepRow` they stay with `filename == None`. Progress is
/// reported at entry with the total count and then once every 100 records.
pub fn export_waveforms(
    reader: &mut dyn WaveformReader,
    records: &mut Vec<MergedRecord>,
    waveforms_dir: &Path,
    policy: MissingWaveformPolicy,
    reporter: &dyn ProgressReporter,
) -> Result<ExportStats> {
    let total = records.len();
    reporter.status(&format!("Extracting waveforms: {total} events"));

    let mut stats = ExportStats::default();
    for (idx, record) in records.iter_mut().enumerate() {
        if (idx + 1) % 100 == 0 {
            reporter.progress((idx + 1) as f64 / total as f64 * 100.0);
            reporter.status(&format!("Extracting waveforms... {}/{total}", idx + 1));
        }

        match reader.read_waveform(record.event_id) {
            Ok(samples) => {
                let filename = waveform_filename(record.event_id);
                write_waveform_csv(&waveforms_dir.join(&filename), &samples)?;
                record.filename = Some(filename);
                stats.exported += 1;
            }
            Err(failure) => {
                warn!("skipping event {}: {failure}", failure.event_id());
                stats.failures.push(failure);
            }
        }
    }

    if policy == MissingWaveformPolicy::DropEvent {
        records.retain(|r| r.filename.is_some());
    }
    Ok(stats)
}

fn write_waveform_csv(path: &Path, samples: &crate::db::WaveformSamples) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (t, v) in samples.time_s.iter().zip(&samples.amplitude_v) {
        writer.serialize(WavePoint {
            time_us: t * 1e6,
            amplitude_mv: v * 1e3,
        })?;
    }
    writer.flush()?;
    Ok(())
}
