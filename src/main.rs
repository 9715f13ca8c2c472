//! pullwave CLI: run the conversion pipeline from the command line.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;

use pullwave::{convert, ConvertOptions, MissingWaveformPolicy, ProgressReporter};

#[derive(Parser)]
#[command(name = "pullwave")]
#[command(about = "Convert a Vallen AE database triad (pridb/tradb/trfdb) to CSV")]
#[command(version)]
struct Cli {
    /// Path to the primary (.pridb) hit database. The .tradb and optional
    /// .trfdb siblings are discovered next to it.
    primary: PathBuf,

    /// Destination directory (defaults to the primary database's parent)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep summary rows for events whose waveform could not be read,
    /// with an empty Filename cell, instead of dropping them
    #[arg(long)]
    keep_failed_events: bool,
}

/// Prints status and progress to the terminal. Progress lines are rewritten
/// in place; during the indeterminate publish phase they are suppressed.
#[derive(Default)]
struct ConsoleReporter {
    indeterminate: AtomicBool,
}

impl ProgressReporter for ConsoleReporter {
    fn status(&self, message: &str) {
        println!("{message}");
    }

    fn progress(&self, percent: f64) {
        if !self.indeterminate.load(Ordering::Relaxed) {
            print!("\r{percent:5.1}%");
            io::stdout().flush().ok();
        }
    }

    fn indeterminate_start(&self) {
        self.indeterminate.store(true, Ordering::Relaxed);
    }

    fn indeterminate_stop(&self) {
        self.indeterminate.store(false, Ordering::Relaxed);
    }

    fn finished(&self, _success: bool) {
        println!();
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = ConvertOptions {
        primary: cli.primary,
        output_dir: cli.output_dir,
        missing_waveform: if cli.keep_failed_events {
            MissingWaveformPolicy::KeepRow
        } else {
            MissingWaveformPolicy::DropEvent
        },
    };

    let report = convert(&options, &ConsoleReporter::default())
        .context("conversion failed")?;

    println!(
        "Exported {} of {} merged events ({} waveform reads failed) -> {}",
        report.events_exported,
        report.events_merged,
        report.events_failed,
        report.destination.display()
    );
    Ok(())
}
