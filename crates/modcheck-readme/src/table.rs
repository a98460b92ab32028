use std::fmt;

use itertools::Itertools;
use modcheck_manifest::instance::Loader;

/// What the server table shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
    pub loader: Loader,
    pub loader_version: Option<String>,
}

/// A row of the mod table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRow {
    pub name: String,
    pub url: String,
    pub description: String,
    pub version_id: String,
}

/// A GitHub-flavored Markdown table.
///
/// Cells are escaped so that no value can break the table apart: pipes are
/// backslash-escaped and line breaks are folded into spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub const fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: vec![],
        }
    }

    /// Appends a row, padding or truncating it to the number of columns.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| {} |", self.headers.iter().join(" | "))?;
        writeln!(
            f,
            "| {} |",
            self.headers
                .iter()
                .map(|header| "-".repeat(header.len().max(3)))
                .join(" | ")
        )?;
        for row in &self.rows {
            writeln!(f, "| {} |", row.iter().map(|cell| escape_cell(cell)).join(" | "))?;
        }
        Ok(())
    }
}

pub fn server_table(info: &ServerInfo) -> Table {
    let mut table = Table::new(vec!["Version", "Loader", "Loader Version"]);
    table.push_row(vec![
        info.version.clone(),
        info.loader.display_name().to_string(),
        info.loader_version
            .as_deref()
            .map_or_else(String::new, code),
    ]);
    table
}

pub fn mods_table(mods: &[ModRow]) -> Table {
    let mut table = Table::new(vec!["Name", "Description", "Version"]);
    for row in mods {
        table.push_row(vec![
            format!("[{}]({})", escape_link_text(&row.name), row.url),
            row.description.clone(),
            code(&row.version_id),
        ]);
    }
    table
}

fn code(text: &str) -> String {
    format!("`{}`", text.replace('`', ""))
}

fn escape_cell(cell: &str) -> String {
    cell.split_whitespace().join(" ").replace('|', "\\|")
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use modcheck_manifest::instance::Loader;

    use super::{ModRow, ServerInfo, Table, mods_table, server_table};

    /// Every row has the same number of unescaped pipes as the header.
    fn is_well_formed(table: &str) -> bool {
        let columns = |line: &str| line.replace("\\|", "").matches('|').count();
        let mut lines = table.lines();
        let Some(header) = lines.next() else {
            return false;
        };
        let expected = columns(header);
        table
            .lines()
            .all(|line| line.starts_with('|') && line.ends_with('|') && columns(line) == expected)
    }

    #[test]
    fn server_table_layout() {
        let table = server_table(&ServerInfo {
            version: "1.21.5".into(),
            loader: Loader::Fabric,
            loader_version: Some("0.16.14".into()),
        })
        .to_string();
        assert_eq!(
            table,
            indoc! {"
                | Version | Loader | Loader Version |
                | ------- | ------ | -------------- |
                | 1.21.5 | Fabric | `0.16.14` |
            "}
        );
    }

    #[test]
    fn mods_table_layout() {
        let table = mods_table(&[ModRow {
            name: "Lithium".into(),
            url: "https://modrinth.com/mod/lithium".into(),
            description: "No-compromises game logic optimization mod".into(),
            version_id: "ZNwYCTsk".into(),
        }])
        .to_string();
        assert_eq!(
            table,
            indoc! {"
                | Name | Description | Version |
                | ---- | ----------- | ------- |
                | [Lithium](https://modrinth.com/mod/lithium) | No-compromises game logic optimization mod | `ZNwYCTsk` |
            "}
        );
    }

    #[test]
    fn hostile_cells_stay_inside_their_column() {
        let table = mods_table(&[ModRow {
            name: "Pipes | [and] brackets".into(),
            url: "https://modrinth.com/mod/pipes".into(),
            description: "Line one\nline two | three".into(),
            version_id: "a`b".into(),
        }])
        .to_string();
        assert!(is_well_formed(&table));
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("Line one line two \\| three"));
    }

    #[test]
    fn rows_are_padded_to_the_header() {
        let mut table = Table::new(vec!["A", "B", "C"]);
        table.push_row(vec!["only one".into()]);
        assert!(is_well_formed(&table.to_string()));
    }

    #[test]
    fn empty_mod_list_is_still_a_table() {
        let table = mods_table(&[]).to_string();
        assert!(is_well_formed(&table));
        assert_eq!(table.lines().count(), 2);
    }
}
