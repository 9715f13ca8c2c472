//! pullwave - convert Vallen-style acoustic emission database triads into
//! CSV.
//!
//! A measurement produces three companion SQLite databases next to each
//! other: the primary hit/feature database (`.pridb`), the transient
//! waveform database (`.tradb`, mandatory), and the spectral feature
//! database (`.trfdb`, optional). This crate turns such a triad into a
//! self-contained directory of CSV outputs: one `EVENT_<id>.csv` per
//! detected event's raw waveform, plus one `<stem>_MasterSummary.csv` with
//! every event's derived features.
//!
//! # Modules
//!
//! - [`resolve`] - companion-file discovery next to the primary database
//! - [`staging`] - ephemeral local workspace for one run
//! - [`db`] - event database reader traits and their SQLite realization
//! - [`merge`] - relational merge of the three feature sets
//! - [`export`] - per-event waveform extraction with unit conversion
//! - [`summary`] - canonical master summary serialization
//! - [`publish`] - recursive merge-copy to the final destination
//! - [`pipeline`] - run controller and state machine
//!
//! # Example
//!
//! ```no_run
//! use pullwave::{convert, ConvertOptions, NullReporter};
//!
//! let options = ConvertOptions::new("/measurements/specimen_04.pridb");
//! let report = convert(&options, &NullReporter).expect("conversion failed");
//! println!("{} events exported", report.events_exported);
//! ```

pub mod db;
pub mod error;
pub mod export;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod records;
pub mod resolve;
pub mod staging;
pub mod summary;

// Re-export for convenience
pub use error::{Error, ReadFailure};
pub use export::MissingWaveformPolicy;
pub use pipeline::{convert, ConvertOptions, Converter, RunReport};
pub use progress::{NullReporter, ProgressReporter, RunState};
pub use resolve::SourceTriad;
