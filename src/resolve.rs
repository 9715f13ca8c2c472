//! Companion-file discovery for the source database triad.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The resolved source databases.
///
/// `waveform` is guaranteed to exist; `frequency` is `None` when no spectral
/// database sits next to the primary, in which case spectral columns never
/// appear downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTriad {
    pub primary: PathBuf,
    pub waveform: PathBuf,
    pub frequency: Option<PathBuf>,
}

/// Locate the waveform (`.tradb`) and optional frequency (`.trfdb`)
/// databases as siblings of the primary database, by extension swap.
///
/// A missing waveform sibling is fatal and stops the pipeline before any
/// staging happens. A missing frequency sibling is not an error.
pub fn resolve_sources(primary: &Path) -> Result<SourceTriad> {
    if !primary.is_file() {
        return Err(Error::PrimaryDbNotFound {
            path: primary.to_path_buf(),
        });
    }

    let waveform = primary.with_extension("tradb");
    if !waveform.is_file() {
        return Err(Error::MissingWaveformDb { path: waveform });
    }

    let frequency = primary.with_extension("trfdb");
    let frequency = frequency.is_file().then_some(frequency);

    Ok(SourceTriad {
        primary: primary.to_path_buf(),
        waveform,
        frequency,
    })
}
