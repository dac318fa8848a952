//! # Template Subcommand
//!
//! Prints the data-dictionary paths an application definition declares, as
//! JSON grouped by requiredness:
//!
//! ```bash
//! nxdc template --nxdl NXmpes
//! ```
//!
//! ```json
//! { "required": ["/ENTRY[entry]/title"], "recommended": [], "optional": [] }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use nxdc_schema::{generate_template, DeclaredPath, DefinitionsDir, Requiredness};

use crate::config::CliConfig;
use crate::resolve_nxdl;

/// Arguments for the `nxdc template` subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Application definition to generate a template for, e.g. NXmpes.
    #[arg(long)]
    pub nxdl: Option<String>,

    /// Print only the required paths.
    #[arg(long)]
    pub required_only: bool,
}

/// Declared paths grouped by requiredness.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TemplateReport {
    /// Paths that must be populated.
    pub required: Vec<String>,
    /// Paths that should be populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<Vec<String>>,
    /// Paths that may be populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<Vec<String>>,
}

impl TemplateReport {
    /// Group declared paths, dropping everything but the required ones when
    /// `required_only` is set.
    pub fn from_declared(declared: &[DeclaredPath], required_only: bool) -> Self {
        let collect = |wanted: Requiredness| -> Vec<String> {
            declared
                .iter()
                .filter(|d| d.requiredness == wanted)
                .map(|d| d.path.clone())
                .collect()
        };
        Self {
            required: collect(Requiredness::Required),
            recommended: (!required_only).then(|| collect(Requiredness::Recommended)),
            optional: (!required_only).then(|| collect(Requiredness::Optional)),
        }
    }
}

/// Execute the template subcommand.
pub fn run_template(args: &TemplateArgs, definitions_root: &Path, config: &CliConfig) -> Result<u8> {
    let nxdl = resolve_nxdl(args.nxdl.as_deref(), config)?;
    let library = DefinitionsDir::new(definitions_root).with_context(|| {
        format!("failed to open definitions root {}", definitions_root.display())
    })?;
    let definition = library
        .load_definition(&nxdl)
        .with_context(|| format!("failed to load application definition {nxdl}"))?;

    let report = TemplateReport::from_declared(&generate_template(&definition), args.required_only);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
