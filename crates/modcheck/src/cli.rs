use std::io;
use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor::{BrightBlue, White, Yellow};
use clap::{Parser, ValueEnum};
use clap_complete::Generator;
use clap_complete::shells::{Bash, Elvish, Fish, PowerShell, Zsh};
use clap_complete_nushell::Nushell;
use modcheck_manifest::DEFAULT_MANIFEST_PATH;

/// Styling for [`clap`]'s CLI interface.
const STYLES: Styles = Styles::styled()
    .usage(Yellow.on_default().bold())
    .literal(BrightBlue.on_default().bold())
    .placeholder(White.on_default().bold())
    .header(Yellow.on_default().bold());

/// Check and update Minecraft mod versions and IDs against Modrinth.
#[derive(Parser, Debug)]
#[command(version, author, about, styles(STYLES))]
pub struct Options {
    /// Server manifest to read and update.
    #[arg(short, long, global = true, default_value = DEFAULT_MANIFEST_PATH)]
    pub file: PathBuf,

    /// Enable debug output.
    #[arg(long, global = true)]
    pub debug: bool,

    /// How to print results.
    #[arg(short, long, global = true, value_enum, default_value_t)]
    pub output_format: OutputFormat,

    /// What to do. Checks all mods for updates if omitted.
    #[command(subcommand)]
    pub subcommand: Option<Subcommand>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Check mods for newer compatible versions.
    Check {
        /// The IDs of mods to check (check all if not provided).
        ids: Vec<String>,
    },

    /// Update one or more mods to their latest compatible versions.
    Update {
        /// The IDs of mods to update (update all if not provided).
        ids: Vec<String>,

        /// Don't ask for confirmation before each update.
        #[arg(short, long)]
        yes: bool,
    },

    /// Convert opaque Modrinth project IDs to readable slugs.
    Slugs {
        /// Don't ask for confirmation before each rename.
        #[arg(short, long)]
        yes: bool,
    },

    /// Regenerate the server and mod tables in the Markdown files.
    Readme {
        /// Only report stale or malformed files, don't write anything.
        #[arg(short, long)]
        check: bool,
    },

    /// Generate shell completions for this tool.
    Completions {
        /// Which shell to generate completions for.
        #[arg(short, long, value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
#[expect(clippy::enum_variant_names, reason = "PowerShell is spelled that way")]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    PowerShell,
    Zsh,
    Nushell,
}

impl Generator for Shell {
    fn file_name(&self, name: &str) -> String {
        match self {
            Self::Bash => Bash.file_name(name),
            Self::Elvish => Elvish.file_name(name),
            Self::Fish => Fish.file_name(name),
            Self::PowerShell => PowerShell.file_name(name),
            Self::Zsh => Zsh.file_name(name),
            Self::Nushell => Nushell.file_name(name),
        }
    }

    fn generate(&self, cmd: &clap::Command, buf: &mut dyn io::Write) {
        match self {
            Self::Bash => Bash.generate(cmd, buf),
            Self::Elvish => Elvish.generate(cmd, buf),
            Self::Fish => Fish.generate(cmd, buf),
            Self::PowerShell => PowerShell.generate(cmd, buf),
            Self::Zsh => Zsh.generate(cmd, buf),
            Self::Nushell => Nushell.generate(cmd, buf),
        }
    }
}
