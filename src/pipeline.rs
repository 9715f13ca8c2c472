//! Run controller: stage orchestration, state machine, top-level error
//! handling.
//!
//! The pipeline executes as one sequential unit of work:
//! resolve → stage → read → merge → export → summarize → publish.
//! All failures other than per-event waveform reads propagate here; the
//! controller marks the run `Failed`, surfaces the message through the
//! status channel, and the staging workspace is torn down on every exit
//! path.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};

use crate::db::{HitReader, SpectralReader, WaveformReader};
use crate::db::{SqliteHitDb, SqliteSpectralDb, SqliteWaveformDb};
use crate::error::{Error, Result};
use crate::export::{export_waveforms, MissingWaveformPolicy};
use crate::merge::merge_records;
use crate::progress::{ProgressReporter, RunState};
use crate::publish::merge_copy_tree;
use crate::resolve::resolve_sources;
use crate::staging::StagingArea;
use crate::summary::write_summary;

/// Parameters of one conversion run. No environment variables or persisted
/// configuration exist; everything is passed here.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Path to the primary (`.pridb`) hit database.
    pub primary: PathBuf,
    /// Destination directory; defaults to the primary database's parent.
    pub output_dir: Option<PathBuf>,
    /// Policy for events whose waveform read fails.
    pub missing_waveform: MissingWaveformPolicy,
}

impl ConvertOptions {
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        ConvertOptions {
            primary: primary.into(),
            output_dir: None,
            missing_waveform: MissingWaveformPolicy::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunReport {
    /// Events surviving the descriptor/hit inner join.
    pub events_merged: usize,
    /// Events whose waveform CSV was written.
    pub events_exported: usize,
    /// Events whose waveform read failed.
    pub events_failed: usize,
    /// The published `<stem>_csv` directory.
    pub destination: PathBuf,
}

/// Owns the run-state value and serializes runs.
///
/// A start request while a run occupies a non-idle state is rejected
/// immediately with [`Error::RunInProgress`]; requests are never queued.
pub struct Converter {
    state: Mutex<RunState>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn new() -> Self {
        Converter {
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap() = state;
    }

    /// Execute one conversion run to completion or failure.
    ///
    /// The terminal state (`Done`/`Failed`) is reported via
    /// `reporter.finished`, after which the controller returns to `Idle`.
    pub fn run(
        &self,
        options: &ConvertOptions,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        {
            let mut state = self.state.lock().unwrap();
            if *state != RunState::Idle {
                return Err(Error::RunInProgress);
            }
            *state = RunState::Resolving;
        }

        let result = self.run_stages(options, reporter);
        match &result {
            Ok(report) => {
                self.set_state(RunState::Done);
                reporter.progress(100.0);
                reporter.status("Conversion complete.");
                reporter.finished(true);
                info!(
                    "conversion finished: {} exported, {} failed -> {}",
                    report.events_exported,
                    report.events_failed,
                    report.destination.display()
                );
            }
            Err(err) => {
                self.set_state(RunState::Failed);
                reporter.status(&format!("Error: {err}"));
                reporter.finished(false);
            }
        }
        self.set_state(RunState::Idle);
        result
    }

    fn run_stages(
        &self,
        options: &ConvertOptions,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let sources = resolve_sources(&options.primary)?;
        debug!(
            "resolved sources: waveform={}, frequency={}",
            sources.waveform.display(),
            sources.frequency.is_some()
        );

        self.set_state(RunState::Staging);
        reporter.status("Copying databases to local workspace...");
        let staging = StagingArea::create(&sources)?;
        let local = staging.local();

        self.set_state(RunState::Reading);
        reporter.status("Reading event metadata...");
        let (descriptors, time_base) = {
            let mut waveform_db = SqliteWaveformDb::open(&local.waveform)?;
            (waveform_db.read_descriptors()?, waveform_db.time_base()?)
        };
        let hits = {
            let mut hit_db = SqliteHitDb::open(&local.primary)?;
            hit_db.read_hits()?
        };
        let spectral = match &local.frequency {
            Some(path) => {
                let mut spectral_db = SqliteSpectralDb::open(path)?;
                Some(spectral_db.read_spectral()?)
            }
            None => None,
        };

        self.set_state(RunState::Merging);
        let mut records = merge_records(&descriptors, &hits, spectral.as_deref());
        let events_merged = records.len();
        debug!(
            "merged {} of {} descriptors against {} hits",
            events_merged,
            descriptors.len(),
            hits.len()
        );

        self.set_state(RunState::Exporting);
        let stats = {
            let mut waveform_db = SqliteWaveformDb::open(&local.waveform)?;
            export_waveforms(
                &mut waveform_db,
                &mut records,
                &staging.output().waveforms,
                options.missing_waveform,
                reporter,
            )?
        };

        self.set_state(RunState::Summarizing);
        reporter.status("Writing master summary...");
        write_summary(
            &records,
            time_base,
            spectral.is_some(),
            &staging.output().summary,
        )?;

        self.set_state(RunState::Publishing);
        let output_dir = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir(&options.primary),
        };
        let destination = output_dir.join(&staging.output().folder_name);
        reporter.indeterminate_start();
        if destination.exists() {
            reporter.status("Note: destination exists, merging with overwrite...");
        }
        reporter.status("Transferring output to destination...");
        let published = merge_copy_tree(&staging.output().root, &destination);
        reporter.indeterminate_stop();
        published?;

        Ok(RunReport {
            events_merged,
            events_exported: stats.exported,
            events_failed: stats.failures.len(),
            destination,
        })
    }
}

fn default_output_dir(primary: &Path) -> PathBuf {
    primary
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// One-shot convenience wrapper over [`Converter::run`].
pub fn convert(options: &ConvertOptions, reporter: &dyn ProgressReporter) -> Result<RunReport> {
    Converter::new().run(options, reporter)
}
