//! `<!--start:NAME-->` / `<!--end:NAME-->` regeneration anchors.
//!
//! Everything between a start marker and its end marker belongs to the
//! generator and is replaced wholesale on every run. A document is only
//! touched if its anchors are well-formed: every start is closed by an end
//! with the same name before any other start, and no name is used twice.

use std::collections::HashSet;
use std::ops::Range;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const START_PREFIX: &str = "start:";
const END_PREFIX: &str = "end:";

/// A single start or end comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub kind: MarkerKind,
    /// 1-based line the marker sits on.
    pub line: usize,
    /// Byte range of the whole comment.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
}

/// A matched pair of markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    pub start: Marker,
    pub end: Marker,
}

impl Anchor {
    /// Byte range of whatever sits between the two markers.
    #[must_use]
    pub const fn content(&self) -> Range<usize> {
        self.start.span.end..self.end.span.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    #[error("line {line}: `end:{name}` has no matching `start:{name}`")]
    Unopened { name: String, line: usize },

    #[error("line {line}: expected `end:{expected}`, found `end:{found}`")]
    Mismatched {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("line {line}: `start:{inner}` opens inside `{outer}` (opened on line {outer_line})")]
    Overlapping {
        outer: String,
        outer_line: usize,
        inner: String,
        line: usize,
    },

    #[error("line {line}: `start:{name}` is never closed")]
    Unclosed { name: String, line: usize },

    #[error("line {line}: anchor `{name}` is used more than once")]
    Duplicate { name: String, line: usize },
}

/// Finds every anchor marker in `text`, in document order.
#[must_use]
pub fn markers(text: &str) -> Vec<Marker> {
    let mut markers = vec![];
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(COMMENT_OPEN) {
        let open = cursor + offset;
        let body_start = open + COMMENT_OPEN.len();
        let Some(body_len) = text[body_start..].find(COMMENT_CLOSE) else {
            break;
        };
        let close = body_start + body_len + COMMENT_CLOSE.len();
        let body = text[body_start..body_start + body_len].trim();

        let parsed = body
            .strip_prefix(START_PREFIX)
            .map(|name| (MarkerKind::Start, name))
            .or_else(|| body.strip_prefix(END_PREFIX).map(|name| (MarkerKind::End, name)));
        if let Some((kind, name)) = parsed {
            markers.push(Marker {
                name: name.trim().to_string(),
                kind,
                line: line_of(text, open),
                span: open..close,
            });
        }

        cursor = close;
    }

    markers
}

/// Checks that the anchors in `text` are paired and non-overlapping, and
/// returns them in document order.
///
/// # Errors
///
/// Returns the first [`AnchorError`] encountered while reading the document
/// top to bottom.
pub fn lint(text: &str) -> Result<Vec<Anchor>, AnchorError> {
    let mut anchors = vec![];
    let mut seen = HashSet::new();
    let mut open: Option<Marker> = None;

    for marker in markers(text) {
        match marker.kind {
            MarkerKind::Start => {
                if let Some(outer) = &open {
                    return Err(AnchorError::Overlapping {
                        outer: outer.name.clone(),
                        outer_line: outer.line,
                        inner: marker.name,
                        line: marker.line,
                    });
                }
                if seen.contains(&marker.name) {
                    return Err(AnchorError::Duplicate {
                        name: marker.name,
                        line: marker.line,
                    });
                }
                open = Some(marker);
            }

            MarkerKind::End => match open.take() {
                None => {
                    return Err(AnchorError::Unopened {
                        name: marker.name,
                        line: marker.line,
                    });
                }
                Some(start) if start.name != marker.name => {
                    return Err(AnchorError::Mismatched {
                        expected: start.name,
                        found: marker.name,
                        line: marker.line,
                    });
                }
                Some(start) => {
                    seen.insert(start.name.clone());
                    anchors.push(Anchor {
                        name: start.name.clone(),
                        start,
                        end: marker,
                    });
                }
            },
        }
    }

    match open {
        Some(start) => Err(AnchorError::Unclosed {
            name: start.name,
            line: start.line,
        }),
        None => Ok(anchors),
    }
}

/// Replaces the contents of the anchor `name` with `body`.
///
/// The body is placed on its own lines between the two markers. Returns
/// `Ok(None)` if `text` has no such anchor.
///
/// # Errors
///
/// Returns an [`AnchorError`] if the anchors in `text` are malformed, in
/// which case nothing is replaced.
pub fn splice(text: &str, name: &str, body: &str) -> Result<Option<String>, AnchorError> {
    let Some(anchor) = lint(text)?.into_iter().find(|anchor| anchor.name == name) else {
        return Ok(None);
    };

    let content = anchor.content();
    let mut spliced = String::with_capacity(text.len() + body.len());
    spliced.push_str(&text[..content.start]);
    spliced.push('\n');
    spliced.push_str(body.trim_end_matches('\n'));
    spliced.push('\n');
    spliced.push_str(&text[content.end..]);
    Ok(Some(spliced))
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::{AnchorError, MarkerKind, lint, markers, splice};

    const README: &str = indoc! {"
        # Lunch

        <!--start:mcman-server-->
        old server table
        <!--end:mcman-server-->

        Some prose with an <!-- unrelated comment --> in it.

        <!-- start:mcman-mods -->
        <!-- end:mcman-mods -->
    "};

    #[test]
    fn markers_are_found_in_order() {
        let found = markers(README);
        let summary = found
            .iter()
            .map(|marker| (marker.kind, marker.name.as_str(), marker.line))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                (MarkerKind::Start, "mcman-server", 3),
                (MarkerKind::End, "mcman-server", 5),
                (MarkerKind::Start, "mcman-mods", 9),
                (MarkerKind::End, "mcman-mods", 10),
            ]
        );
    }

    #[test]
    fn well_formed_documents_pass() -> Result<(), AnchorError> {
        let anchors = lint(README)?;
        assert_eq!(anchors.len(), 2);
        assert_eq!(&README[anchors[0].content()], "\nold server table\n");
        Ok(())
    }

    #[rstest]
    #[case::unopened(
        "<!--end:a-->",
        AnchorError::Unopened { name: "a".into(), line: 1 }
    )]
    #[case::mismatched(
        "<!--start:a-->\n<!--end:b-->",
        AnchorError::Mismatched { expected: "a".into(), found: "b".into(), line: 2 }
    )]
    #[case::overlapping(
        "<!--start:a-->\n<!--start:b-->\n<!--end:b-->\n<!--end:a-->",
        AnchorError::Overlapping { outer: "a".into(), outer_line: 1, inner: "b".into(), line: 2 }
    )]
    #[case::unclosed(
        "text\n<!--start:a-->\ntext",
        AnchorError::Unclosed { name: "a".into(), line: 2 }
    )]
    #[case::duplicate(
        "<!--start:a--><!--end:a-->\n<!--start:a--><!--end:a-->",
        AnchorError::Duplicate { name: "a".into(), line: 2 }
    )]
    fn malformed_documents_fail(#[case] text: &str, #[case] expected: AnchorError) {
        assert_eq!(lint(text), Err(expected));
    }

    #[test]
    fn splicing_replaces_only_the_anchor() -> Result<(), AnchorError> {
        let spliced = splice(README, "mcman-server", "| new |\n")?.unwrap_or_default();
        assert!(spliced.contains("<!--start:mcman-server-->\n| new |\n<!--end:mcman-server-->"));
        assert!(!spliced.contains("old server table"));
        assert!(spliced.contains("<!-- unrelated comment -->"));
        assert_eq!(lint(&spliced)?.len(), 2);
        Ok(())
    }

    #[test]
    fn splicing_is_idempotent() -> Result<(), AnchorError> {
        let once = splice(README, "mcman-mods", "body")?.unwrap_or_default();
        let twice = splice(&once, "mcman-mods", "body")?.unwrap_or_default();
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn missing_anchors_are_reported() -> Result<(), AnchorError> {
        assert_eq!(splice(README, "nope", "body")?, None);
        Ok(())
    }

    #[test]
    fn malformed_documents_are_not_spliced() {
        assert!(splice("<!--start:a-->", "a", "body").is_err());
    }
}
