//! Surgical, line-based edits of a `server.toml`.
//!
//! Round-tripping the manifest through [`serde`] would drop comments,
//! reorder tables and lose every key this crate doesn't model. Instead, the
//! [`ManifestEditor`] only ever replaces the single line it was asked to
//! change and leaves every other byte of the file alone.

use std::fmt;

/// The header that opens every mod entry.
const MODS_HEADER: &str = "[[mods]]";

/// How many lines past `id = ...` may hold the entry's `version = ...`.
const VERSION_LOOKAHEAD: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ManifestEditor {
    lines: Vec<String>,
}

impl ManifestEditor {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    /// Pins the mod identified by `id` to `new_version`.
    ///
    /// Looks for a `[[mods]]` entry with an `id = "<id>"` line and rewrites
    /// the `version = ...` line that follows it within the same entry.
    /// Returns `false` (and changes nothing) if no such line exists.
    pub fn set_version(&mut self, id: &str, new_version: &str) -> bool {
        let id_line = assignment("id", id);
        let mut in_mod_entry = false;

        for index in 0..self.lines.len() {
            let line = self.lines[index].trim();

            if line == MODS_HEADER {
                in_mod_entry = true;
                continue;
            }

            if line.starts_with('[') {
                in_mod_entry = false;
                continue;
            }

            if in_mod_entry && line == id_line {
                let window_end = (index + VERSION_LOOKAHEAD).min(self.lines.len() - 1);
                for candidate in index + 1..=window_end {
                    let candidate_line = self.lines[candidate].trim();
                    if candidate_line.starts_with('[') {
                        break;
                    }
                    if candidate_line.starts_with("version = ") {
                        self.lines[candidate] =
                            rewrite_line(&self.lines[candidate], "version", new_version);
                        return true;
                    }
                }

                // The ID is unique, no other entry can match.
                return false;
            }
        }

        false
    }

    /// Renames the mod identified by `old_id` to `new_id`.
    ///
    /// Only the first exactly matching `id = "<old_id>"` line is touched.
    pub fn set_id(&mut self, old_id: &str, new_id: &str) -> bool {
        let id_line = assignment("id", old_id);
        match self.lines.iter_mut().find(|line| line.trim() == id_line) {
            Some(line) => {
                *line = rewrite_line(line, "id", new_id);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.lines.concat()
    }
}

impl fmt::Display for ManifestEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lines.iter().try_for_each(|line| f.write_str(line))
    }
}

/// Formats `key = "value"`, quoting and escaping `value` as TOML would.
fn assignment(key: &str, value: &str) -> String {
    format!("{key} = {}", toml::Value::from(value))
}

/// Replaces `line` with `key = "value"`, keeping its indentation and ending.
fn rewrite_line(line: &str, key: &str, value: &str) -> String {
    let indentation = &line[..line.len() - line.trim_start().len()];
    let ending = if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    format!("{indentation}{}{ending}", assignment(key, value))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::ManifestEditor;

    const MANIFEST: &str = indoc! {r#"
        mc_version = "1.21.5"

        # Performance
        [[mods]]
        type = "modrinth"
        id = "lithium"
        version = "aaaa"

        [[mods]]
          type = "modrinth"
          id = "P7dR8mSH"
          version = "bbbb" # pinned on purpose

        [[mods]]
        type = "modrinth"
        id = "no-version"

        [[mods]]
        type = "modrinth"
        id = "late"
        version = "cccc"
    "#};

    #[test]
    fn version_is_replaced_in_place() {
        let mut editor = ManifestEditor::new(MANIFEST);
        assert!(editor.set_version("lithium", "zzzz"));
        let edited = editor.into_string();
        assert!(edited.contains("id = \"lithium\"\nversion = \"zzzz\"\n"));
        assert!(edited.contains("# Performance"));
        assert_eq!(edited.lines().count(), MANIFEST.lines().count());
    }

    #[test]
    fn indentation_is_preserved() {
        let mut editor = ManifestEditor::new(MANIFEST);
        assert!(editor.set_version("P7dR8mSH", "yyyy"));
        assert!(editor.to_string().contains("\n  version = \"yyyy\"\n"));
    }

    #[rstest]
    #[case::unknown_mod("sodium")]
    #[case::version_belongs_to_next_entry("no-version")]
    fn missing_version_lines_are_not_invented(#[case] id: &str) {
        let mut editor = ManifestEditor::new(MANIFEST);
        assert!(!editor.set_version(id, "xxxx"));
        assert_eq!(editor.into_string(), MANIFEST);
    }

    #[test]
    fn ids_outside_mod_entries_are_ignored() {
        let text = indoc! {r#"
            [[worlds]]
            id = "lithium"
            version = "1"
        "#};
        let mut editor = ManifestEditor::new(text);
        assert!(!editor.set_version("lithium", "2"));
    }

    #[test]
    fn id_is_renamed_to_slug() {
        let mut editor = ManifestEditor::new(MANIFEST);
        assert!(editor.set_id("P7dR8mSH", "fabric-api"));
        let edited = editor.into_string();
        assert!(edited.contains("\n  id = \"fabric-api\"\n"));
        assert!(!edited.contains("P7dR8mSH"));
        assert!(!ManifestEditor::new(&edited).set_id("P7dR8mSH", "fabric-api"));
    }

    #[test]
    fn crlf_line_endings_survive() {
        let text = "[[mods]]\r\nid = \"late\"\r\nversion = \"1\"\r\n";
        let mut editor = ManifestEditor::new(text);
        assert!(editor.set_version("late", "2"));
        assert_eq!(
            editor.into_string(),
            "[[mods]]\r\nid = \"late\"\r\nversion = \"2\"\r\n"
        );
    }

    #[test]
    fn last_line_without_newline() {
        let text = "[[mods]]\nid = \"late\"\nversion = \"1\"";
        let mut editor = ManifestEditor::new(text);
        assert!(editor.set_version("late", "2"));
        assert_eq!(
            editor.into_string(),
            "[[mods]]\nid = \"late\"\nversion = \"2\""
        );
    }
}
