use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

const DELIMITER: &str = "---";

/// Why a `SKILL.md` yielded no usable frontmatter. Never fatal to discovery.
#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("content does not start with '---'")]
    MissingOpening,

    #[error("no closing '---' delimiter")]
    Unterminated,

    #[error("invalid YAML: {0}")]
    Yaml(String),

    #[error("frontmatter is not a mapping")]
    NotAMapping,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Other,
}

/// String-keyed fields of a frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: HashMap<String, FieldValue>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// Turns the raw text between the `---` markers into fields.
pub trait FrontmatterParser {
    fn parse(&self, block: &str) -> Result<Frontmatter, FrontmatterError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontmatter;

impl FrontmatterParser for YamlFrontmatter {
    fn parse(&self, block: &str) -> Result<Frontmatter, FrontmatterError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(block).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;

        let serde_yaml::Value::Mapping(mapping) = value else {
            return Err(FrontmatterError::NotAMapping);
        };

        let mut frontmatter = Frontmatter::new();
        for (key, value) in mapping {
            let serde_yaml::Value::String(key) = key else {
                continue;
            };
            let value = match value {
                serde_yaml::Value::String(s) => FieldValue::Text(s),
                _ => FieldValue::Other,
            };
            frontmatter.fields.insert(key, value);
        }
        Ok(frontmatter)
    }
}

/// Returns the text between the leading `---` and the next `---`.
pub fn split_block(content: &str) -> Result<&str, FrontmatterError> {
    if !content.starts_with(DELIMITER) {
        return Err(FrontmatterError::MissingOpening);
    }
    let rest = &content[DELIMITER.len()..];
    let end = rest.find(DELIMITER).ok_or(FrontmatterError::Unterminated)?;
    Ok(&rest[..end])
}

pub fn load_frontmatter(
    parser: &dyn FrontmatterParser,
    skill_md: &Path,
) -> Result<Frontmatter, FrontmatterError> {
    let content = fs::read_to_string(skill_md).map_err(|source| FrontmatterError::Read {
        path: skill_md.display().to_string(),
        source,
    })?;
    parser.parse(split_block(&content)?)
}

/// Trims whitespace, then one pair of matching surrounding quotes.
pub fn clean_description(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}
