//! In-memory event database, useful for tests and deterministic playback.

use std::collections::HashMap;

use crate::db::{HitReader, SpectralReader, WaveformReader, WaveformSamples};
use crate::error::{ReadFailure, Result};
use crate::records::{HitFeature, SpectralFeature, WaveformDescriptor};

/// Holds all three feature sets plus raw samples keyed by event id.
///
/// Events listed in `descriptors` but absent from `waveforms` reproduce the
/// recoverable per-event read failure.
#[derive(Debug, Default)]
pub struct MemoryEventDb {
    pub descriptors: Vec<WaveformDescriptor>,
    pub hits: Vec<HitFeature>,
    pub spectral: Vec<SpectralFeature>,
    pub waveforms: HashMap<i64, WaveformSamples>,
    pub time_base: i64,
}

impl MemoryEventDb {
    pub fn new() -> Self {
        MemoryEventDb {
            time_base: 1,
            ..Default::default()
        }
    }
}

impl WaveformReader for MemoryEventDb {
    fn read_descriptors(&mut self) -> Result<Vec<WaveformDescriptor>> {
        let mut descriptors = self.descriptors.clone();
        descriptors.sort_by_key(|d| d.event_id);
        Ok(descriptors)
    }

    fn time_base(&mut self) -> Result<i64> {
        Ok(self.time_base)
    }

    fn read_waveform(&mut self, event_id: i64) -> std::result::Result<WaveformSamples, ReadFailure> {
        self.waveforms
            .get(&event_id)
            .cloned()
            .ok_or(ReadFailure::NoData(event_id))
    }
}

impl HitReader for MemoryEventDb {
    fn read_hits(&mut self) -> Result<Vec<HitFeature>> {
        Ok(self.hits.clone())
    }
}

impl SpectralReader for MemoryEventDb {
    fn read_spectral(&mut self) -> Result<Vec<SpectralFeature>> {
        Ok(self.spectral.clone())
    }
}
