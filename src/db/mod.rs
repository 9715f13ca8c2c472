//! Event database reader abstraction.
//!
//! The pipeline consumes the source databases through these traits and is
//! agnostic to how they are realized. [`sqlite`] implements them over the
//! Vallen SQLite table layout; [`memory`] provides an in-memory realization
//! for tests and deterministic playback.

pub mod memory;
pub mod sqlite;

use crate::error::{ReadFailure, Result};
use crate::records::{HitFeature, SpectralFeature, WaveformDescriptor};

pub use memory::MemoryEventDb;
pub use sqlite::{SqliteHitDb, SqliteSpectralDb, SqliteWaveformDb};

/// Raw samples of one event's transient, read on demand.
///
/// `time_s` and `amplitude_v` have equal length. Neither is kept in memory
/// beyond a single export step.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSamples {
    pub time_s: Vec<f64>,
    pub amplitude_v: Vec<f64>,
}

/// Reader over the primary hit/feature database.
pub trait HitReader {
    /// All hit feature rows, projected to the eight named fields.
    fn read_hits(&mut self) -> Result<Vec<HitFeature>>;
}

/// Reader over the transient waveform database.
pub trait WaveformReader {
    /// All transient descriptors, ascending by event id.
    fn read_descriptors(&mut self) -> Result<Vec<WaveformDescriptor>>;

    /// The global time-base scalar, defaulting to 1 when absent.
    fn time_base(&mut self) -> Result<i64>;

    /// Raw samples for one event. Failure here is a per-event value, not a
    /// pipeline error: the caller drops the event and continues.
    fn read_waveform(&mut self, event_id: i64) -> std::result::Result<WaveformSamples, ReadFailure>;
}

/// Reader over the optional spectral/frequency-domain database.
pub trait SpectralReader {
    /// All spectral rows, projected to peak and centroid frequency.
    fn read_spectral(&mut self) -> Result<Vec<SpectralFeature>>;
}
