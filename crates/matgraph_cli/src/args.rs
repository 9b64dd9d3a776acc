// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use std::path::PathBuf;

/// Usage text
pub const USAGE: &str = "\
Usage: matgraph [DOCUMENT] [OPTIONS]

Evaluates a material graph document (RON). Without a document a built-in
demo graph is used.

Options:
  --settings FILE        Load graph settings (RON); defaults to ./matgraph.ron
                         when that file exists
  --texture ID=URL       Register a texture; may be repeated
  --export               Append the exported shader text
  --json                 Print the report as JSON
  --save FILE            Write the graph document before evaluating
  -h, --help             Show this help";

/// Parsed options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// Graph document to evaluate
    pub document: Option<PathBuf>,
    /// Settings file
    pub settings: Option<PathBuf>,
    /// Extra textures as `(id, url)`
    pub textures: Vec<(String, String)>,
    /// Include shader export
    pub export: bool,
    /// JSON output
    pub json: bool,
    /// Where to save the document
    pub save: Option<PathBuf>,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print usage
    Help,
    /// Evaluate a graph
    Run(Args),
}

/// Argument error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArgsError {
    /// Option needs a value
    #[error("Option '{0}' requires a value")]
    MissingValue(String),

    /// Unrecognized option
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// More than one document given
    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),

    /// `--texture` without `=`
    #[error("Texture must be given as ID=URL, got '{0}'")]
    InvalidTexture(String),
}

/// Parse arguments, program name excluded
pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Command, ArgsError> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| ArgsError::MissingValue(name.to_string()));
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--export" => parsed.export = true,
            "--json" => parsed.json = true,
            "--settings" => parsed.settings = Some(PathBuf::from(value("--settings")?)),
            "--save" => parsed.save = Some(PathBuf::from(value("--save")?)),
            "--texture" => {
                let spec = value("--texture")?;
                let Some((id, url)) = spec.split_once('=') else {
                    return Err(ArgsError::InvalidTexture(spec.clone()));
                };
                parsed.textures.push((id.to_string(), url.to_string()));
            }
            other if other.starts_with('-') => return Err(ArgsError::UnknownOption(other.to_string())),
            other if parsed.document.is_none() => parsed.document = Some(PathBuf::from(other)),
            other => return Err(ArgsError::UnexpectedArgument(other.to_string())),
        }
    }

    Ok(Command::Run(parsed))
}
