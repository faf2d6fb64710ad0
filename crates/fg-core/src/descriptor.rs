//! The per-group JSON descriptor.
//!
//! Each group directory carries a descriptor naming the series (`groupTitle`),
//! the episode (`title`) and optionally a part index (`p`). Only those three
//! keys matter; everything else in the document is ignored.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::Result;

const DEFAULT_GROUP_TITLE: &str = "unknown";
const DEFAULT_TITLE: &str = "video";

/// Parsed descriptor with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub group_title: String,
    pub title: String,
    /// Rendered part index, if the descriptor carries a non-null `p`.
    ///
    /// A `"p": null` key is present but treated as absent: the file stem
    /// gets no prefix rather than a literal `[null]`.
    pub part: Option<String>,
}

#[derive(Deserialize)]
struct RawDescriptor {
    #[serde(rename = "groupTitle")]
    group_title: Option<Value>,
    title: Option<Value>,
    p: Option<Value>,
}

impl Descriptor {
    /// Parse a descriptor from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDescriptor = serde_json::from_str(json)?;
        Ok(Self {
            group_title: render(raw.group_title).unwrap_or_else(|| DEFAULT_GROUP_TITLE.into()),
            title: render(raw.title).unwrap_or_else(|| DEFAULT_TITLE.into()),
            part: render(raw.p),
        })
    }

    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Sanitized group title, used as the per-group output directory name.
    pub fn group_dir_name(&self) -> String {
        sanitize(&self.group_title)
    }

    /// Output file stem: the sanitized title, prefixed with `[p]` when the
    /// title differs from the group title and a part index is present.
    pub fn file_stem(&self) -> String {
        let name = sanitize(&self.title);
        match self.part {
            Some(ref part) if name != self.group_dir_name() => sanitize(&format!("[{part}]{name}")),
            _ => name,
        }
    }
}

/// Replace path separators so a title is safe as a single path component.
pub fn sanitize(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Strings are taken verbatim, `null` counts as absent, anything else is
/// rendered as compact JSON.
fn render(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_titles() {
        let d = Descriptor::from_json(r#"{"groupTitle":"Show","title":"Ep1"}"#).unwrap();
        assert_eq!(d.group_title, "Show");
        assert_eq!(d.title, "Ep1");
        assert_eq!(d.part, None);
        assert_eq!(d.group_dir_name(), "Show");
        assert_eq!(d.file_stem(), "Ep1");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let d = Descriptor::from_json("{}").unwrap();
        assert_eq!(d.group_title, "unknown");
        assert_eq!(d.title, "video");
    }

    #[test]
    fn null_fields_use_defaults() {
        let d = Descriptor::from_json(r#"{"groupTitle":null,"title":null,"p":null}"#).unwrap();
        assert_eq!(d.group_title, "unknown");
        assert_eq!(d.title, "video");
        assert_eq!(d.part, None);
    }

    #[test]
    fn null_part_adds_no_prefix() {
        let d = Descriptor::from_json(r#"{"groupTitle":"Show","title":"Ep2","p":null}"#).unwrap();
        assert_eq!(d.part, None);
        assert_eq!(d.file_stem(), "Ep2");
    }

    #[test]
    fn part_prefix_when_titles_differ() {
        let d = Descriptor::from_json(r#"{"groupTitle":"Show","title":"Ep2","p":2}"#).unwrap();
        assert_eq!(d.file_stem(), "[2]Ep2");
    }

    #[test]
    fn string_part_is_unquoted() {
        let d = Descriptor::from_json(r#"{"groupTitle":"Show","title":"Ep","p":"b"}"#).unwrap();
        assert_eq!(d.file_stem(), "[b]Ep");
    }

    #[test]
    fn no_prefix_when_title_equals_group() {
        let d = Descriptor::from_json(r#"{"groupTitle":"Movie","title":"Movie","p":1}"#).unwrap();
        assert_eq!(d.file_stem(), "Movie");
    }

    #[test]
    fn titles_are_compared_after_sanitizing() {
        let d = Descriptor::from_json(r#"{"groupTitle":"A/B","title":"A\\B","p":1}"#).unwrap();
        assert_eq!(d.group_dir_name(), "A_B");
        assert_eq!(d.file_stem(), "A_B");
    }

    #[test]
    fn separators_are_replaced() {
        assert_eq!(sanitize("a/b\\c"), "a_b_c");
        let d = Descriptor::from_json(r#"{"groupTitle":"x/y","title":"1/2","p":"3/4"}"#).unwrap();
        assert_eq!(d.group_dir_name(), "x_y");
        assert_eq!(d.file_stem(), "[3_4]1_2");
    }

    #[test]
    fn non_string_titles_are_rendered() {
        let d = Descriptor::from_json(r#"{"groupTitle":2024,"title":true}"#).unwrap();
        assert_eq!(d.group_title, "2024");
        assert_eq!(d.title, "true");
    }

    #[test]
    fn extra_keys_are_ignored() {
        let d = Descriptor::from_json(r#"{"title":"T","cover":"x.jpg","bvid":"BV1"}"#).unwrap();
        assert_eq!(d.title, "T");
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(Descriptor::from_json("not json").is_err());
        assert!(Descriptor::from_json(r#""just a string""#).is_err());
    }
}
