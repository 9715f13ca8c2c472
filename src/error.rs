//! Error taxonomy for the conversion pipeline.
//!
//! Two kinds of failure exist and they never mix:
//!
//! - [`Error`] is fatal. It propagates to the run controller, which marks the
//!   run `Failed`, reports the message through the status channel, and tears
//!   down the staging workspace.
//! - [`ReadFailure`] is recoverable and scoped to a single event. It is
//!   absorbed at the waveform-export boundary as a value, never raised.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The primary hit database does not exist.
    #[error("primary database not found: {path}")]
    PrimaryDbNotFound { path: PathBuf },

    /// The mandatory transient waveform database is missing next to the
    /// primary database. The pipeline aborts before staging; nothing is
    /// written to the destination.
    #[error("waveform database not found: {path}")]
    MissingWaveformDb { path: PathBuf },

    /// A start request arrived while another run was active. Requests are
    /// rejected, not queued.
    #[error("a conversion run is already in progress")]
    RunInProgress,

    /// Copying sources into the staging workspace (or creating the staged
    /// output tree) failed.
    #[error("staging failed at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying the staged output tree to the destination failed. The
    /// destination may hold a mixture of old and new files at this point.
    #[error("publish failed at {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite error while opening a database or running a whole-table query.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Any other I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Recoverable failure while reading one event's raw samples.
///
/// The affected event is dropped (or kept with an empty filename, depending
/// on the configured policy); the run continues with the next event.
#[derive(Debug, Error)]
pub enum ReadFailure {
    /// The transient store has no usable samples for this event id.
    #[error("no transient data recorded for event {0}")]
    NoData(i64),

    /// The stored samples could not be decoded.
    #[error("transient data for event {event_id} is malformed: {reason}")]
    Malformed { event_id: i64, reason: String },

    /// SQLite error confined to this one event's read.
    #[error("database error reading event {event_id}: {source}")]
    Database {
        event_id: i64,
        #[source]
        source: rusqlite::Error,
    },
}

impl ReadFailure {
    /// The event id this failure belongs to.
    pub fn event_id(&self) -> i64 {
        match self {
            ReadFailure::NoData(id) => *id,
            ReadFailure::Malformed { event_id, .. } => *event_id,
            ReadFailure::Database { event_id, .. } => *event_id,
        }
    }
}
