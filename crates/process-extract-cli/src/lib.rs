//! CLI logic for subprocess extraction
//!
//! All file I/O happens here; the engine only sees in-memory models.

mod args;

pub use args::Args;

use std::fs;
use std::sync::Arc;

use log::info;
use thiserror::Error;

use process_extract::{
    DiagramSnapshot, ExtractError, ExtractOptions, ExtractorConfig, HttpLayoutService, SubprocessExtractor,
};

/// Errors surfaced by the command-line front end
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: String, source: std::io::Error },

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `--check`: detector result and element count
    Checked {
        has_nested_sub_processes: bool,
        element_count: usize,
    },
    /// Extracted document, written to `output` or returned for stdout
    Extracted { name: String, xml: Option<String> },
}

/// Run the extraction described by `args`
///
/// # Errors
///
/// Returns `CliError` for:
/// - Unreadable snapshot or configuration files
/// - Malformed snapshot or configuration JSON
/// - Unknown or non-subprocess container ids
/// - Unwritable output paths
pub async fn run(args: &Args) -> Result<Outcome, CliError> {
    info!("Reading snapshot {}", args.input);

    let config = match &args.config {
        Some(path) => ExtractorConfig::from_json(&read(path)?)?,
        None => ExtractorConfig::default(),
    };
    let snapshot = DiagramSnapshot::from_json(&read(&args.input)?)?;
    let (model, registry) = snapshot.into_parts()?;

    let mut extractor = SubprocessExtractor::new(&model, &registry).with_config(config);

    if args.check {
        return Ok(Outcome::Checked {
            has_nested_sub_processes: extractor.has_nested(&args.container),
            element_count: extractor.count_elements(&args.container),
        });
    }

    if let Some(url) = &args.layout_url {
        extractor = extractor.with_layout_service(Arc::new(HttpLayoutService::new(url.as_str())));
    }
    let options = ExtractOptions {
        use_auto_layout: args.layout_url.is_some(),
        padding: args.padding,
    };

    let result = extractor.extract(&args.container, &options).await?;
    info!(
        "Extracted '{}' ({} elements, nested: {})",
        result.name, result.element_count, result.has_nested_sub_processes
    );

    match &args.output {
        Some(path) => {
            fs::write(path, &result.xml).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            info!("Wrote {}", path);
            Ok(Outcome::Extracted {
                name: result.name,
                xml: None,
            })
        }
        None => Ok(Outcome::Extracted {
            name: result.name,
            xml: Some(result.xml),
        }),
    }
}

fn read(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })
}
