//! Typed rows read from the source databases and the merged per-event record.
//!
//! One detected transient is identified by its event id (`TRAI` in the Vallen
//! schema), the join key across all three databases.

/// Descriptor of one recorded transient, from the waveform database.
///
/// `event_id` is unique within the waveform database. `time_tick` is the
/// native tick-based timestamp; it may be absent for imported data.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformDescriptor {
    pub event_id: i64,
    pub time_tick: Option<i64>,
    pub channel: i32,
    pub sample_count: i64,
    pub sample_rate: i64,
}

/// Scalar features of one detected event, from the hit database.
#[derive(Debug, Clone, PartialEq)]
pub struct HitFeature {
    pub event_id: i64,
    pub channel: i32,
    pub amplitude: f64,
    pub duration: f64,
    pub energy: f64,
    pub rms: f64,
    pub counts: i64,
    pub rise_time: f64,
}

/// Spectral summary of one event, from the optional frequency database.
///
/// Zero or one row per event id; individual fields may be NULL in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFeature {
    pub event_id: i64,
    pub peak_freq_khz: Option<f64>,
    pub centroid_freq_khz: Option<f64>,
}

/// Join of descriptor, hit features, and (optionally) spectral features for
/// one event, plus fields derived during export.
///
/// Exists only in memory during a run. `filename` is attached by the
/// waveform exporter once the event's CSV has been written; `channel` comes
/// from the hit database, matching the master summary's `channel` column.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub event_id: i64,
    pub channel: i32,
    pub time_tick: Option<i64>,
    pub sample_count: i64,
    pub sample_rate: i64,
    pub amplitude: f64,
    pub duration: f64,
    pub energy: f64,
    pub rms: f64,
    pub counts: i64,
    pub rise_time: f64,
    pub peak_freq_khz: Option<f64>,
    pub centroid_freq_khz: Option<f64>,
    pub filename: Option<String>,
}

impl MergedRecord {
    /// Build the join result for one event. Derived fields start empty.
    pub fn new(descriptor: &WaveformDescriptor, hit: &HitFeature) -> Self {
        MergedRecord {
            event_id: descriptor.event_id,
            channel: hit.channel,
            time_tick: descriptor.time_tick,
            sample_count: descriptor.sample_count,
            sample_rate: descriptor.sample_rate,
            amplitude: hit.amplitude,
            duration: hit.duration,
            energy: hit.energy,
            rms: hit.rms,
            counts: hit.counts,
            rise_time: hit.rise_time,
            peak_freq_khz: None,
            centroid_freq_khz: None,
            filename: None,
        }
    }

    /// Derived nanosecond timestamp: `time_tick * time_base / 16000`, the
    /// fixed divisor converting native tick units into nanoseconds.
    pub fn time_ns(&self, time_base: i64) -> Option<f64> {
        self.time_tick
            .map(|tick| (tick as f64 * time_base as f64) / 16000.0)
    }
}
