use crate::error::{MalformedReason, PatchError};
use serde::{Deserialize, Serialize};

pub const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
pub const SEPARATOR: &str = "=======";
pub const REPLACE_MARKER: &str = ">>>>>>> REPLACE";

/// A parsed SEARCH/REPLACE block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Text to locate, trailing whitespace trimmed.
    pub search: String,
    /// Replacement text, surrounding whitespace trimmed.
    pub replace: String,
    /// Leading indentation of the first replacement line as written.
    pub replace_indent: String,
}

impl Patch {
    pub fn new(search: &str, replace: &str) -> Self {
        Self {
            search: search.trim_end().to_string(),
            replace: replace.trim().to_string(),
            replace_indent: first_line_indent(replace).to_string(),
        }
    }

    /// Parse the first SEARCH/REPLACE block in `text`.
    ///
    /// Text before the search marker and after the replace marker is ignored.
    pub fn parse(text: &str) -> Result<Self, PatchError> {
        let search_at = text
            .find(SEARCH_MARKER)
            .ok_or(MalformedReason::MissingMarker("search"))?;
        let search_body = search_at + SEARCH_MARKER.len();

        let sep_at = match text[search_body..].find(SEPARATOR) {
            Some(offset) => search_body + offset,
            None if text[..search_at].contains(SEPARATOR) => {
                return Err(MalformedReason::OutOfOrder("separator", "search").into())
            }
            None => return Err(MalformedReason::MissingMarker("separator").into()),
        };
        let replace_body = sep_at + SEPARATOR.len();

        let end_at = match text[replace_body..].find(REPLACE_MARKER) {
            Some(offset) => replace_body + offset,
            None if text[..replace_body].contains(REPLACE_MARKER) => {
                return Err(MalformedReason::OutOfOrder("replace", "separator").into())
            }
            None => return Err(MalformedReason::MissingMarker("replace").into()),
        };

        let search = strip_marker_line_break(&text[search_body..sep_at]);
        let replace = strip_marker_line_break(&text[replace_body..end_at]);

        let patch = Self::new(search, replace);
        if patch.search.is_empty() {
            return Err(MalformedReason::EmptySearch.into());
        }
        Ok(patch)
    }

    /// Render back into the block format.
    pub fn render(&self) -> String {
        let indent = if self.replace.is_empty() {
            ""
        } else {
            self.replace_indent.as_str()
        };
        format!(
            "{}\n{}\n{}\n{}{}\n{}",
            SEARCH_MARKER, self.search, SEPARATOR, indent, self.replace, REPLACE_MARKER
        )
    }

    /// Leading indentation of the first search line.
    pub fn search_indent(&self) -> &str {
        first_line_indent(&self.search)
    }
}

/// Drop trailing spaces and the single line break that follows a marker.
fn strip_marker_line_break(s: &str) -> &str {
    let s = s.trim_start_matches([' ', '\t']);
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

fn first_line_indent(s: &str) -> &str {
    let Some(line) = s.lines().find(|l| !l.trim().is_empty()) else {
        return "";
    };
    let content = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - content.len()]
}
