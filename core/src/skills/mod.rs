pub mod catalog;
pub mod discover;
pub mod frontmatter;

pub use catalog::SkillCatalog;
pub use discover::{SKILL_FILE, SKIP_DIRS, SKIP_SKILL_NAMES, SkillDiscoverer};
pub use frontmatter::{
    FieldValue, Frontmatter, FrontmatterError, FrontmatterParser, YamlFrontmatter,
};

use std::path::PathBuf;

/// A discovered skill directory. The directory itself is the symlink target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    pub dir_name: String,
    pub description: String,
    pub provider: String,
    pub path: PathBuf,
    pub category: Option<String>,
}

impl Skill {
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.dir_name == name
    }
}
