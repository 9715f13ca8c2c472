//! Ephemeral local workspace for one conversion run.
//!
//! The source triad is copied in before any read, so subsequent I/O is local
//! and repeatable reads do not re-incur remote latency or race with external
//! writers of the source. The staged output tree is built here and published
//! as a whole at the end of the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::resolve::SourceTriad;

/// Paths of the staged output tree: `<stem>_csv/waveforms/` plus the master
/// summary file.
#[derive(Debug)]
pub struct StagedOutput {
    /// The `<stem>_csv` folder; this whole tree is what gets published.
    pub root: PathBuf,
    /// Folder receiving one `EVENT_<id>.csv` per exported event.
    pub waveforms: PathBuf,
    /// Path of `<stem>_MasterSummary.csv`.
    pub summary: PathBuf,
    /// Name of the `<stem>_csv` folder, reused at the destination.
    pub folder_name: String,
}

impl StagedOutput {
    fn new(workspace: &Path, stem: &str) -> Self {
        let folder_name = format!("{stem}_csv");
        let root = workspace.join(&folder_name);
        StagedOutput {
            waveforms: root.join("waveforms"),
            summary: root.join(format!("{stem}_MasterSummary.csv")),
            root,
            folder_name,
        }
    }
}

/// Scoped staging workspace, owned exclusively by the active run.
///
/// The backing temporary directory is deleted recursively when this value is
/// dropped, on every exit path of the run.
pub struct StagingArea {
    // Held for its Drop; the path is reached through `local` and `output`.
    _dir: TempDir,
    local: SourceTriad,
    output: StagedOutput,
}

fn staging_io(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Staging {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_in(src: &Path, workspace: &Path) -> Result<PathBuf> {
    let name = src.file_name().ok_or_else(|| Error::Staging {
        path: src.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "source path has no file name"),
    })?;
    let dest = workspace.join(name);
    fs::copy(src, &dest).map_err(staging_io(src))?;
    Ok(dest)
}

impl StagingArea {
    /// Acquire a fresh workspace, copy the resolved triad into it, and
    /// create the nested output directory structure.
    pub fn create(sources: &SourceTriad) -> Result<Self> {
        let dir = TempDir::new().map_err(staging_io(&std::env::temp_dir()))?;
        let workspace = dir.path();

        let primary = copy_in(&sources.primary, workspace)?;
        let waveform = copy_in(&sources.waveform, workspace)?;
        let frequency = sources
            .frequency
            .as_deref()
            .map(|f| copy_in(f, workspace))
            .transpose()?;

        let stem = sources
            .primary
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_owned());
        let output = StagedOutput::new(workspace, &stem);
        fs::create_dir_all(&output.waveforms).map_err(staging_io(&output.waveforms))?;

        Ok(StagingArea {
            _dir: dir,
            local: SourceTriad {
                primary,
                waveform,
                frequency,
            },
            output,
        })
    }

    /// Local copies of the source triad.
    pub fn local(&self) -> &SourceTriad {
        &self.local
    }

    /// The staged output tree.
    pub fn output(&self) -> &StagedOutput {
        &self.output
    }
}
