//! `opf` - render `.opf` works and re-base annotation layers.

mod args;

use args::{Command, Format, USAGE};
use opf_blupdate::{BaseLayerUpdater, Boundary, UpdaterOptions, rebase_layer};
use opf_core::{CompositionError, LayerCompositor, LayerSelection, VolumeText};
use opf_serialize::MarkupRenderer;
use opf_yaml::{LayerDocument, OpfDirectory, OpfError};
use std::path::{Path, PathBuf};
use std::{env, process};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Opf(#[from] OpfError),

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    /// Process exit code: 2 for bad invocations, 1 for everything else.
    fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

fn read_base(path: &Path) -> Result<String, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(VolumeText::new(&raw).as_str().to_string())
}

fn render(
    opf: &Path,
    work: &str,
    format: Format,
    layers: &LayerSelection,
) -> Result<String, CliError> {
    let renderer = match format {
        Format::Markdown => MarkupRenderer::markdown(),
        Format::Tei => MarkupRenderer::tei(),
    };
    let source = OpfDirectory::new(opf);
    log::info!("rendering work '{work}' from '{}'", opf.display());
    Ok(LayerCompositor::compose(&source, work, renderer, layers)?)
}

fn rebase(
    old: &Path,
    new: &Path,
    layer: &Path,
    context_len: Option<usize>,
) -> Result<String, CliError> {
    let mut options = UpdaterOptions::default();
    if let Some(context_len) = context_len {
        options.context_len = context_len;
    }
    let updater = BaseLayerUpdater::with_options(&read_base(old)?, &read_base(new)?, options);
    let mut document = LayerDocument::read(layer)?;

    let report = rebase_layer(&updater, document.layer());
    for unresolved in &report.unresolved {
        let boundary = match unresolved.boundary {
            Boundary::Start => "start",
            Boundary::End => "end",
        };
        eprintln!(
            "annotation #{} {boundary} at {} could not be re-based; review it manually",
            unresolved.index, unresolved.coordinate
        );
    }
    log::info!(
        "re-based {} annotations of '{}', {} boundaries unresolved",
        report.layer.annotations.len(),
        layer.display(),
        report.unresolved.len()
    );

    document.set_spans(&report.layer)?;
    Ok(document.to_yaml()?)
}

fn run(command: Command) -> Result<String, CliError> {
    match command {
        Command::Render {
            opf,
            work,
            format,
            layers,
        } => render(&opf, &work, format, &layers),
        Command::Rebase {
            old,
            new,
            layer,
            context_len,
        } => rebase(&old, &new, &layer, context_len),
    }
}

fn try_main(args: &[String]) -> Result<String, CliError> {
    let command = args::parse(args).map_err(CliError::Usage)?;
    run(command)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("OPF_LOG", "warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    match try_main(&args) {
        Ok(output) => print!("{output}"),
        Err(err @ CliError::Usage(_)) => {
            eprintln!("error: {err}\n\n{USAGE}");
            process::exit(err.exit_code());
        }
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(err.exit_code());
        }
    }
}
