//! This crate is a part of **[modcheck]**.
//!
//! It renders the server and mod tables of a modpack README, and splices
//! them between the same regeneration anchors [mcman] uses, so the two tools
//! can maintain the same document.
//!
//! [modcheck]: https://github.com/LunchChecker/modcheck
//! [mcman]: https://github.com/ParadigmMC/mcman

pub mod anchor;
pub mod table;

pub use anchor::{Anchor, AnchorError, lint, splice};
pub use table::{ModRow, ServerInfo, Table, mods_table, server_table};

/// Fences the server table.
pub const SERVER_ANCHOR: &str = "mcman-server";

/// Fences the mod table.
pub const MODS_ANCHOR: &str = "mcman-mods";

/// The outcome of regenerating a document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Rendered {
    pub text: String,
    /// Anchors the document doesn't have, whose tables were skipped.
    pub missing: Vec<&'static str>,
}

/// Regenerates both tables inside `text`.
///
/// # Errors
///
/// Returns an [`AnchorError`] if the document's anchors are malformed.
pub fn render(text: &str, server: &ServerInfo, mods: &[ModRow]) -> Result<Rendered, AnchorError> {
    let sections = [
        (SERVER_ANCHOR, server_table(server)),
        (MODS_ANCHOR, mods_table(mods)),
    ];

    let mut rendered = Rendered {
        text: text.to_string(),
        missing: vec![],
    };
    for (anchor, table) in sections {
        match splice(&rendered.text, anchor, &table.to_string())? {
            Some(spliced) => rendered.text = spliced,
            None => rendered.missing.push(anchor),
        }
    }

    Ok(rendered)
}
