//! Master summary assembly and serialization.
//!
//! Surviving records are projected onto a fixed canonical column order; only
//! columns actually present in the data appear. Spectral columns exist only
//! when a frequency database was read, and the tick/nanosecond columns only
//! when at least one record carries a native tick timestamp.

use std::path::Path;

use crate::error::Result;
use crate::records::MergedRecord;

/// Canonical header names, in their fixed order. These match the column
/// names the Vallen tooling ecosystem expects.
const COL_EVENT_ID: &str = "trai";
const COL_FILENAME: &str = "Filename";
const COL_CHANNEL: &str = "channel";
const COL_TIME_TICK: &str = "Time_tick";
const COL_TIME_NS: &str = "Time_ns";
const COL_AMPLITUDE: &str = "amplitude";
const COL_ENERGY: &str = "energy";
const COL_DURATION: &str = "duration";
const COL_COUNTS: &str = "counts";
const COL_RISE_TIME: &str = "rise_time";
const COL_RMS: &str = "rms";
const COL_SAMPLES: &str = "Samples";
const COL_SAMPLE_RATE: &str = "SampleRate";
const COL_PEAK_FREQ: &str = "Peak_Freq_kHz";
const COL_CENTROID_FREQ: &str = "Centroid_Freq_kHz";

/// The canonical column list intersected with the fields available in this
/// run's data.
fn header(records: &[MergedRecord], spectral_present: bool) -> Vec<&'static str> {
    let has_ticks = records.iter().any(|r| r.time_tick.is_some());
    let mut cols = vec![COL_EVENT_ID, COL_FILENAME, COL_CHANNEL];
    if has_ticks {
        cols.push(COL_TIME_TICK);
        cols.push(COL_TIME_NS);
    }
    cols.extend([
        COL_AMPLITUDE,
        COL_ENERGY,
        COL_DURATION,
        COL_COUNTS,
        COL_RISE_TIME,
        COL_RMS,
        COL_SAMPLES,
        COL_SAMPLE_RATE,
    ]);
    if spectral_present {
        cols.push(COL_PEAK_FREQ);
        cols.push(COL_CENTROID_FREQ);
    }
    cols
}

fn opt_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row(record: &MergedRecord, columns: &[&'static str], time_base: i64) -> Vec<String> {
    columns
        .iter()
        .map(|col| match *col {
            COL_EVENT_ID => record.event_id.to_string(),
            COL_FILENAME => record.filename.clone().unwrap_or_default(),
            COL_CHANNEL => record.channel.to_string(),
            COL_TIME_TICK => opt_i64(record.time_tick),
            COL_TIME_NS => opt_f64(record.time_ns(time_base)),
            COL_AMPLITUDE => record.amplitude.to_string(),
            COL_ENERGY => record.energy.to_string(),
            COL_DURATION => record.duration.to_string(),
            COL_COUNTS => record.counts.to_string(),
            COL_RISE_TIME => record.rise_time.to_string(),
            COL_RMS => record.rms.to_string(),
            COL_SAMPLES => record.sample_count.to_string(),
            COL_SAMPLE_RATE => record.sample_rate.to_string(),
            COL_PEAK_FREQ => opt_f64(record.peak_freq_khz),
            COL_CENTROID_FREQ => opt_f64(record.centroid_freq_khz),
            other => unreachable!("unknown canonical column {other}"),
        })
        .collect()
}

/// Serialize the master summary CSV for the surviving records.
///
/// An empty record set still produces a parseable file with the applicable
/// header row.
pub fn write_summary(
    records: &[MergedRecord],
    time_base: i64,
    spectral_present: bool,
    path: &Path,
) -> Result<()> {
    let columns = header(records, spectral_present);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(row(record, &columns, time_base))?;
    }
    writer.flush()?;
    Ok(())
}
