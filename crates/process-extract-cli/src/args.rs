//! Command-line argument definitions
//!
//! Arguments select the snapshot to read, the container to extract, where
//! the document goes, and how the extractor is configured.

use clap::Parser;

/// Extract a subprocess from a diagram snapshot as a standalone process
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the diagram snapshot (JSON)
    #[arg(help = "Path to the diagram snapshot")]
    pub input: String,

    /// Id of the subprocess to extract
    #[arg(long)]
    pub container: String,

    /// Path of the extracted document; printed to stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to extractor configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Padding override for this extraction
    #[arg(long)]
    pub padding: Option<f64>,

    /// Auto-layout service endpoint; enables auto-layout when set
    #[arg(long)]
    pub layout_url: Option<String>,

    /// Only report nesting and element count, without emitting XML
    #[arg(long)]
    pub check: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
