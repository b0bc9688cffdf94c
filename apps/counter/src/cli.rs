//! Command-line surface.
//!
//! Ledger positions on the command line are 1-based, as shown by `list`.

use clap::{Args, Parser, Subcommand};
use shelf_core::ExportFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shelf-counter")]
#[command(about = "Count shelf inventory by barcode", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir, counter.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a count
    Add(AddArgs),

    /// Change quantity, description or location of an entry
    Edit(EditArgs),

    /// Delete an entry; later entries move up
    Remove {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },

    /// Delete every entry
    Clear {
        /// Confirm; this cannot be undone
        #[arg(long)]
        yes: bool,
    },

    /// Show the ledger in entry order
    List,

    /// Write the ledger to a file
    Export(ExportArgs),

    /// POST the ledger to the sink URL
    Send {
        /// Overrides the saved sink URL for this send
        #[arg(long)]
        url: Option<String>,
    },

    /// Show or change preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// List capture devices
    Cameras,

    /// Read codes from a device and record each one
    Scan(ScanArgs),

    /// Run the EAN/UPC checksum on a code
    Check { code: String },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub barcode: String,

    /// Counted quantity (whole number; omitted means 0)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub qty: String,

    #[arg(long)]
    pub desc: Option<String>,

    /// Location (default: the saved default location)
    #[arg(long)]
    pub loc: Option<String>,
}

/// Omitted fields keep their current value; an empty string clears
/// description or location.
#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub position: u64,

    #[arg(long, allow_hyphen_values = true)]
    pub qty: Option<String>,

    #[arg(long)]
    pub desc: Option<String>,

    #[arg(long)]
    pub loc: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// csv, or xlsx for an Excel workbook
    #[arg(long, default_value = "csv")]
    pub format: ExportFormat,

    /// Output file (default: shelf_counts_<date>.<ext> in the export dir)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Print the saved preferences
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Change one or more preferences; each is saved immediately
    Set {
        #[arg(long)]
        default_location: Option<String>,

        /// Require a valid EAN-8/UPC-A/EAN-13 checksum
        #[arg(long)]
        strict: Option<bool>,

        /// Empty string removes the URL
        #[arg(long)]
        sink_url: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Device id from `cameras` (default: first device)
    #[arg(long)]
    pub device: Option<String>,

    /// Quantity recorded for each scanned code
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub qty: String,

    #[arg(long)]
    pub desc: Option<String>,

    #[arg(long)]
    pub loc: Option<String>,
}
