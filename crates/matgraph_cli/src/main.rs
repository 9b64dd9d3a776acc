// SPDX-License-Identifier: MIT OR Apache-2.0
//! `matgraph` - evaluate a material graph from the command line.
//!
//! Loads a graph document and optional settings, evaluates the material
//! output, resolves deferred texture work through the compositor and prints
//! the resulting attributes, optionally followed by the exported shader text.

mod args;
mod compositor;
mod demo;
mod report;

use args::{Args, Command};
use compositor::DescribingCompositor;
use matgraph::document::DOCUMENT_EXTENSION;
use matgraph::settings::SETTINGS_FILE_NAME;
use matgraph::texture::resolve_pending;
use matgraph::{
    create_material_registry, DocumentError, Graph, GraphDocument, GraphSettings, SettingsError,
    ShaderExporter, TextureLibrary, Translator,
};
use report::Report;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Failure of a run
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Graph '{0}' has no material output node")]
    NoRoot(String),
}

fn main() {
    // Logs go to stderr so reports can be piped
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matgraph=info,matgraph_cli=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match args::parse(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", args::USAGE);
            return;
        }
        Err(e) => {
            eprintln!("{e}\n\n{}", args::USAGE);
            std::process::exit(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(args)) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<String, CliError> {
    let settings_path = match &args.settings {
        Some(path) => Some(path.clone()),
        None => {
            let local = PathBuf::from(SETTINGS_FILE_NAME);
            tokio::fs::try_exists(&local).await?.then_some(local)
        }
    };
    let settings = match &settings_path {
        Some(path) => GraphSettings::from_ron(&tokio::fs::read_to_string(path).await?)?,
        None => GraphSettings::default(),
    };

    let registry = Arc::new(create_material_registry());
    let graph = match &args.document {
        Some(path) => {
            if path.extension().is_some_and(|ext| ext != DOCUMENT_EXTENSION) {
                tracing::warn!("{} does not have the .{} extension", path.display(), DOCUMENT_EXTENSION);
            }
            tracing::info!("Loading {}", path.display());
            let document = GraphDocument::from_ron(&tokio::fs::read_to_string(path).await?)?;
            Graph::from_document_with_settings(registry.clone(), &document, &settings)
        }
        None => demo::build(registry.clone(), &settings),
    };

    if let Some(path) = &args.save {
        tokio::fs::write(path, graph.to_document().to_ron()?).await?;
        tracing::info!("Saved {}", path.display());
    }

    let root = graph.root().ok_or_else(|| CliError::NoRoot(graph.name.clone()))?;

    let mut textures = TextureLibrary::with_builtin();
    for (id, url) in &args.textures {
        textures.insert(id.as_str(), url.as_str());
    }
    let translator = Translator::new(registry, Arc::new(textures), settings.evaluation.clone());
    let (mut attributes, trace) = translator.evaluate_traced(&graph, root);

    let pending = attributes.pending.len();
    let compositor = DescribingCompositor::new();
    let resolved = match resolve_pending(&mut attributes, &compositor).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Texture compositing failed: {e}");
            pending - attributes.pending.len()
        }
    };
    tracing::debug!("{} composed textures cached", compositor.cached().await);

    let report = Report {
        material: graph.name.clone(),
        nodes: graph.node_count(),
        links: graph.link_count(),
        attributes,
        node_evaluations: trace.node_evaluations.values().sum(),
        memo_hits: trace.memo_hits,
        cycles_broken: trace.cycles_broken,
        pending,
        resolved,
        shader: args.export.then(|| ShaderExporter::export(&graph, root)),
    };

    if args.json {
        Ok(serde_json::to_string_pretty(&report)? + "\n")
    } else {
        Ok(report.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_blocking(args: Args) -> Result<String, CliError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run(args))
    }

    #[test]
    fn test_demo_run_resolves_base_color() {
        let output = run_blocking(Args {
            json: true,
            ..Args::default()
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["pending"], 1);
        assert_eq!(json["resolved"], 1);
        assert_eq!(json["memo_hits"], 1);
        assert!(json["attributes"]["base_color"]["Texture"]["url"]
            .as_str()
            .is_some_and(|url| url.ends_with("#multiply=1.0,0.35,0.2")));
    }

    #[test]
    fn test_export_appends_shader() {
        let output = run_blocking(Args {
            export: true,
            ..Args::default()
        })
        .unwrap();
        assert!(output.contains("Material: Demo Brick"));
        assert!(output.contains("// Material: Demo Brick"));
        assert!(output.contains("Texture2DSample"));
    }

    #[test]
    fn test_missing_document_is_an_error() {
        let result = run_blocking(Args {
            document: Some("does/not/exist.matgraph".into()),
            ..Args::default()
        });
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
