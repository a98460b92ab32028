mod check;
mod cli;
mod commands;
mod prompt;

use std::cell::LazyCell;
use std::io;

use clap::{CommandFactory, Parser};
use color_eyre::Section;
use color_eyre::eyre::Report;
use modcheck_manifest::ManifestError;
use modcheck_repository::persist::PersistError;
use modcheck_repository::{LocalManifest, ModrinthRepository, RegistryError};
use tracing::instrument;

use crate::cli::{Options, Subcommand};

fn main() -> Result<(), Report> {
    let options = Options::parse();
    color_eyre::install()?;
    install_tracing(options.debug)?;

    let status = run_with_options(options);
    if let Err(report) = status {
        return Err(explain(report));
    }

    Ok(())
}

#[instrument(name = "action_handling")]
fn run_with_options(options: Options) -> Result<(), Report> {
    let modrinth_repository = LazyCell::new(ModrinthRepository::new);
    let Options {
        file,
        output_format,
        subcommand,
        ..
    } = options;
    let mut stdout = io::stdout().lock();

    match subcommand.unwrap_or(Subcommand::Check { ids: vec![] }) {
        Subcommand::Check { ids } => {
            let local = LocalManifest::open(&file)?;
            commands::check(&*modrinth_repository, &local, &ids, output_format, &mut stdout)?;
            Ok(())
        }

        Subcommand::Update { ids, yes } => {
            let mut local = LocalManifest::open(&file)?;
            let mut prompter = prompt::for_flag(yes);
            commands::update(
                &*modrinth_repository,
                &mut local,
                &ids,
                prompter.as_mut(),
                &mut stdout,
            )?;
            Ok(())
        }

        Subcommand::Slugs { yes } => {
            let mut local = LocalManifest::open(&file)?;
            let mut prompter = prompt::for_flag(yes);
            commands::slugs(&*modrinth_repository, &mut local, prompter.as_mut(), &mut stdout)?;
            Ok(())
        }

        Subcommand::Readme { check } => {
            let local = LocalManifest::open(&file)?;
            commands::readme(&*modrinth_repository, &local, check, &mut stdout)?;
            Ok(())
        }

        Subcommand::Completions { shell } => {
            let mut command = Options::command();
            let bin_name = env!("CARGO_CRATE_NAME");
            clap_complete::generate(shell, &mut command, bin_name, &mut stdout);
            Ok(())
        }
    }
}

/// What went wrong, as far as the user can do something about it.
enum Cause {
    Io(String),
    DuplicateMod(String),
    InvalidManifest,
    Network,
}

impl Cause {
    fn of(report: &Report) -> Option<Self> {
        let manifest_error = |error: &ManifestError| match error {
            ManifestError::DuplicateMod { id } => Self::DuplicateMod(id.clone()),
            ManifestError::Toml(_) => Self::InvalidManifest,
        };
        let persist_error = |error: &PersistError| match error {
            PersistError::Io { path, .. } => Self::Io(path.display().to_string()),
            PersistError::Manifest { source, .. } => manifest_error(source),
        };

        if let Some(error) = report.downcast_ref::<PersistError>() {
            return Some(persist_error(error));
        }
        if let Some(error) = report.downcast_ref::<modcheck_repository::Error>() {
            return Some(match error {
                modcheck_repository::Error::Persistence(error) => persist_error(error),
                modcheck_repository::Error::Manifest(error) => manifest_error(error),
            });
        }
        report
            .downcast_ref::<RegistryError>()
            .map(|_| Self::Network)
    }
}

/// Attaches notes and suggestions to errors we know how to explain.
fn explain(report: Report) -> Report {
    match Cause::of(&report) {
        Some(Cause::Io(path)) => report
            .with_note(|| format!("modcheck couldn't read or write {path}."))
            .with_suggestion(|| {
                "Ensure you're in the right directory, or point to the manifest with `--file`."
            }),
        Some(Cause::DuplicateMod(id)) => report
            .with_note(|| format!("Two `[[mods]]` entries are identified by {id:?}."))
            .with_suggestion(|| "Every mod ID may only appear once in the manifest."),
        Some(Cause::InvalidManifest) => report
            .with_note(|| "modcheck couldn't make sense of the server manifest.")
            .with_suggestion(|| "A manifest needs at least `mc_version` and a `[jar]` type."),
        Some(Cause::Network) => report
            .with_note(|| "modcheck had trouble talking to the Modrinth API.")
            .with_suggestion(|| "Check your internet connection, then try again."),
        None => report,
    }
}

fn install_tracing(debug: bool) -> Result<(), Report> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    let format_layer = fmt::layer().pretty().without_time().with_writer(io::stderr);
    let filter_layer = match debug {
        true => EnvFilter::try_new("debug")?,
        false => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?,
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}
