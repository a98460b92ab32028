//! What each subcommand does, written against any [`Registry`] and any
//! output stream.

use std::io::Write;
use std::path::{Path, PathBuf};

use color_eyre::Section;
use color_eyre::eyre::Report;
use color_eyre::owo_colors::OwoColorize;
use eyre::Context;
use modcheck_manifest::{ModEntry, ModSource};
use modcheck_readme::{ModRow, ServerInfo};
use modcheck_repository::persist::{read_text, write_text};
use modcheck_repository::{LocalManifest, Registry};
use tracing::instrument;

use crate::check::{CHANGELOG_WIDTH, ModStatus, Significance, check_mods, format_changelog};
use crate::cli::OutputFormat;
use crate::prompt::Prompter;

const SEPARATOR_WIDTH: usize = 80;

/// Prints the status of every (selected) mod, returning how many of them
/// need an update.
#[instrument(skip_all, fields(path = %local.path().display()))]
pub fn check<R>(
    registry: &R,
    local: &LocalManifest,
    only: &[String],
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<usize, Report>
where
    R: Registry + ?Sized,
{
    let manifest = &local.manifest;
    match format {
        OutputFormat::Yaml => {
            let statuses = check_mods(registry, manifest, only).collect::<Vec<_>>();
            write!(out, "{}", serde_yml::to_string(&statuses)?)?;
            Ok(statuses.iter().filter(|status| status.needs_update()).count())
        }
        OutputFormat::Human => {
            print_header(local, out)?;
            let mut outdated = 0;
            for status in check_mods(registry, manifest, only) {
                print_status(&status, out)?;
                if status.needs_update() {
                    outdated += 1;
                }
                print_separator(out)?;
            }

            match outdated {
                0 => writeln!(out, "\nAll mods are up to date!")?,
                _ => {
                    writeln!(out, "\nFound {outdated} mod(s) that need updating.")?;
                    writeln!(
                        out,
                        "Run `modcheck update` to update all mods or `modcheck update MOD_ID...` to update specific mods."
                    )?;
                }
            }
            Ok(outdated)
        }
    }
}

/// Offers to bump every (selected) outdated mod to its newest compatible
/// version, returning how many were bumped.
#[instrument(skip_all, fields(path = %local.path().display()))]
pub fn update<R>(
    registry: &R,
    local: &mut LocalManifest,
    only: &[String],
    prompter: &mut dyn Prompter,
    out: &mut impl Write,
) -> Result<usize, Report>
where
    R: Registry + ?Sized,
{
    print_header(local, out)?;

    // Statuses come from a snapshot, edits go to the file.
    let snapshot = local.manifest.clone();
    let mut updated = 0;
    for status in check_mods(registry, &snapshot, only) {
        print_status(&status, out)?;
        if let Some(latest) = status.latest.as_ref().filter(|_| status.needs_update()) {
            let question = format!(
                "Do you want to update this mod to version {}?",
                latest.version_number
            );
            if prompter.confirm(&question)? {
                writeln!(
                    out,
                    "Updating version from {} to {}",
                    status.current_id,
                    paint(status.significance(), &latest.id)
                )?;
                let title = &status.project.title;
                let changed = local
                    .set_version(&status.id, &latest.id)
                    .wrap_err_with(|| format!("Failed to update {title}"))?;
                if changed {
                    writeln!(out, "Successfully updated {title}!")?;
                    updated += 1;
                } else {
                    tracing::warn!(id = %status.id, "The manifest has no version line for this mod");
                    writeln!(out, "Failed to update version for {title}")?;
                }
            } else {
                writeln!(out, "Skipping version update.")?;
            }
        }
        print_separator(out)?;
    }

    match updated {
        0 => writeln!(out, "\nNo updates were made to the server configuration.")?,
        _ => {
            writeln!(
                out,
                "\nSuccessfully updated {updated} mod version(s) in {}!",
                local.path().display()
            )?;
            writeln!(out, "Please restart your server for the changes to take effect.")?;
        }
    }
    Ok(updated)
}

/// Offers to replace opaque project IDs with their slugs, returning how many
/// were replaced.
#[instrument(skip_all, fields(path = %local.path().display()))]
pub fn slugs<R>(
    registry: &R,
    local: &mut LocalManifest,
    prompter: &mut dyn Prompter,
    out: &mut impl Write,
) -> Result<usize, Report>
where
    R: Registry + ?Sized,
{
    writeln!(
        out,
        "Checking mod IDs for slug conversion in {}...",
        local.path().display()
    )?;

    let ids = local
        .manifest
        .mods
        .iter()
        .filter_map(|entry| match entry {
            ModEntry {
                kind: ModSource::Modrinth,
                id: Some(id),
                ..
            } => Some(id.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>();

    let mut renamed = 0;
    for id in ids {
        let project = match registry.project(&id) {
            Ok(project) => project,
            Err(error) => {
                tracing::error!(%error, "Error fetching mod {id}");
                continue;
            }
        };
        if !project.has_readable_slug_for(&id) {
            continue;
        }

        writeln!(out, "\nMod: {} ({id})", project.title)?;
        writeln!(out, "Slug: {}", project.slug.cyan())?;
        let question = format!(
            "Do you want to use the readable slug '{}' instead of ID '{id}'?",
            project.slug
        );
        if prompter.confirm(&question)? {
            writeln!(out, "Updating ID from {id} to {}", project.slug.cyan())?;
            let changed = local
                .set_id(&id, &project.slug)
                .wrap_err_with(|| format!("Failed to rename {id} to {}", project.slug))?;
            if changed {
                renamed += 1;
            }
        } else {
            writeln!(out, "Keeping current mod ID.")?;
        }
    }

    match renamed {
        0 => writeln!(out, "\nNo mod IDs were updated.")?,
        _ => writeln!(out, "\nSuccessfully updated {renamed} mod ID(s) to readable slugs!")?,
    }
    Ok(renamed)
}

/// Regenerates the tables in every Markdown file the manifest lists.
///
/// With `check`, nothing is written and the files that would change are
/// reported as an error instead. Returns the files that were (or would be)
/// changed.
#[instrument(skip_all, fields(path = %local.path().display(), check = check))]
pub fn readme<R>(
    registry: &R,
    local: &LocalManifest,
    check: bool,
    out: &mut impl Write,
) -> Result<Vec<PathBuf>, Report>
where
    R: Registry + ?Sized,
{
    let manifest = &local.manifest;
    let server = ServerInfo {
        version: manifest.mc_version.to_string(),
        loader: manifest.jar.kind.clone(),
        loader_version: manifest.jar.loader_version().map(String::from),
    };
    let mods = manifest
        .modrinth_mods()
        .map(|pinned| {
            let project = registry
                .project(pinned.id.as_ref())
                .wrap_err_with(|| format!("Failed to fetch mod {}", pinned.id))?;
            Ok(ModRow {
                url: project.url(),
                name: project.title,
                description: project.description,
                version_id: pinned.version.to_string(),
            })
        })
        .collect::<Result<Vec<_>, Report>>()?;

    let base = local.path().parent().unwrap_or_else(|| Path::new(""));
    let mut changed = vec![];
    for file in &manifest.markdown.files {
        let path = base.join(file);
        let text = read_text(&path)?;
        let rendered = modcheck_readme::render(&text, &server, &mods)
            .wrap_err_with(|| format!("{} has malformed anchors", path.display()))?;
        for anchor in &rendered.missing {
            tracing::warn!(path = %path.display(), anchor, "Missing anchor, its table was skipped");
        }

        if rendered.text == text {
            writeln!(out, "{} is up to date", path.display())?;
            continue;
        }
        if check {
            writeln!(out, "{} is out of date", path.display())?;
        } else {
            write_text(&path, &rendered.text)?;
            writeln!(out, "Updated {}", path.display())?;
        }
        changed.push(path);
    }

    if check && !changed.is_empty() {
        let error = eyre::eyre!("{} Markdown file(s) are out of date", changed.len())
            .with_suggestion(|| "Run `modcheck readme` to regenerate them.");
        return Err(error);
    }
    Ok(changed)
}

fn print_header(local: &LocalManifest, out: &mut impl Write) -> Result<(), Report> {
    let manifest = &local.manifest;
    writeln!(
        out,
        "Checking {} mods for Minecraft {} ({})...",
        manifest.mods.len(),
        manifest.mc_version,
        manifest.target().loader_name(),
    )?;
    writeln!(out, "\nMod Status:")?;
    print_separator(out)
}

fn print_separator(out: &mut impl Write) -> Result<(), Report> {
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    Ok(())
}

fn print_status(status: &ModStatus, out: &mut impl Write) -> Result<(), Report> {
    let project = &status.project;
    writeln!(out, "Mod: {} ({})", project.title, project.id)?;
    if project.has_readable_slug_for(&project.id) {
        writeln!(out, "Slug: {}", project.slug.cyan())?;
    }

    let Some(latest) = &status.latest else {
        writeln!(out, "Status: No compatible version found")?;
        return Ok(());
    };

    match &status.current {
        Some(current) => writeln!(out, "Current Version: {current}")?,
        None => writeln!(
            out,
            "Current Version: {} (version info not found)",
            status.current_id
        )?,
    }
    writeln!(out, "Latest Version: {latest}")?;

    if !status.needs_update() {
        writeln!(out, "Status: Up to date")?;
        return Ok(());
    }

    writeln!(
        out,
        "Status: {} (published {})",
        paint(status.significance(), "Update Available!"),
        latest.date_published.format("%Y-%m-%d")
    )?;
    if let Some(changelog) = latest.changelog() {
        writeln!(out, "\nChangelog:")?;
        writeln!(out, "{}", format_changelog(changelog, CHANGELOG_WIDTH))?;
    }
    Ok(())
}

fn paint(significance: Significance, text: &str) -> String {
    match significance {
        Significance::Major => text.red().to_string(),
        Significance::Minor => text.yellow().to_string(),
        Significance::Patch => text.green().to_string(),
    }
}
