use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::frontmatter::{self, Frontmatter, FrontmatterParser, YamlFrontmatter};
use super::{Skill, SkillCatalog};
use crate::error::{Error, Result};

pub const SKILL_FILE: &str = "SKILL.md";

/// Directories never descended into while walking a provider.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "template",
    "spec",
    ".claude-plugin",
];

/// Candidate directories that are never catalog entries.
pub const SKIP_SKILL_NAMES: &[&str] = &["template"];

pub struct SkillDiscoverer<P = YamlFrontmatter> {
    parser: P,
}

impl SkillDiscoverer {
    pub fn new() -> Self {
        Self {
            parser: YamlFrontmatter,
        }
    }
}

impl Default for SkillDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FrontmatterParser> SkillDiscoverer<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    pub fn discover(&self, skills_root: &Path) -> Result<SkillCatalog> {
        let root = std::path::absolute(skills_root).map_err(|e| Error::io(skills_root, e))?;

        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(Error::RootNotADirectory { path: root }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::RootNotFound { path: root });
            }
            Err(e) => return Err(Error::io(&root, e)),
        }

        let providers = list_providers(&root)?;
        let mut seen = HashSet::new();
        let mut skills = Vec::new();

        for (provider, provider_path) in &providers {
            self.walk_provider(provider, provider_path, &mut seen, &mut skills);
        }

        tracing::info!(
            discovered = skills.len(),
            providers = providers.len(),
            root = %root.display(),
            "Skills discovered"
        );

        Ok(SkillCatalog::new(skills))
    }

    fn walk_provider(
        &self,
        provider: &str,
        provider_path: &Path,
        seen: &mut HashSet<(String, String)>,
        skills: &mut Vec<Skill>,
    ) {
        let walker = WalkDir::new(provider_path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_pruned(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(provider, error = %e, "Skipping unreadable path");
                    continue;
                }
            };

            if entry.depth() > 0 && !entry.file_type().is_dir() {
                continue;
            }

            let skill_dir = entry.path();
            if !skill_dir.join(SKILL_FILE).is_file() {
                continue;
            }

            let dir_name = entry.file_name().to_string_lossy().into_owned();
            if SKIP_SKILL_NAMES.contains(&dir_name.as_str()) {
                continue;
            }

            if !seen.insert((provider.to_string(), dir_name.clone())) {
                tracing::debug!(provider, dir_name = %dir_name, "Skipping duplicate skill");
                continue;
            }

            let fm = self.read_frontmatter(skill_dir);
            skills.push(build_skill(
                provider,
                provider_path,
                skill_dir,
                dir_name,
                fm.as_ref(),
            ));
        }
    }

    fn read_frontmatter(&self, skill_dir: &Path) -> Option<Frontmatter> {
        let skill_md = skill_dir.join(SKILL_FILE);
        match frontmatter::load_frontmatter(&self.parser, &skill_md) {
            Ok(fm) => Some(fm),
            Err(e) => {
                tracing::debug!(path = %skill_md.display(), error = %e, "No usable frontmatter");
                None
            }
        }
    }
}

fn list_providers(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(root).map_err(|e| Error::io(root, e))?;

    let mut providers = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }
        providers.push((name, path));
    }
    providers.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(providers)
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

fn build_skill(
    provider: &str,
    provider_path: &Path,
    skill_dir: &Path,
    dir_name: String,
    fm: Option<&Frontmatter>,
) -> Skill {
    let name = fm
        .and_then(|fm| fm.text("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| dir_name.clone());

    let description = fm
        .and_then(|fm| fm.text("description"))
        .map(frontmatter::clean_description)
        .unwrap_or_default();

    Skill {
        name,
        dir_name,
        description,
        provider: provider.to_string(),
        path: skill_dir.to_path_buf(),
        category: category_for(provider_path, skill_dir),
    }
}

/// First dot-prefixed segment between the provider and the skill directory.
fn category_for(provider_path: &Path, skill_dir: &Path) -> Option<String> {
    let rel = skill_dir.strip_prefix(provider_path).ok()?;
    let mut segments: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    segments.pop();

    segments
        .into_iter()
        .find(|s| s.starts_with('.'))
        .map(|s| s.trim_start_matches('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::frontmatter::{FieldValue, FrontmatterError};
    use tempfile::TempDir;

    fn write_skill(root: &Path, rel: &str, content: &str) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SKILL_FILE), content).unwrap();
        dir
    }

    fn discover(root: &Path) -> SkillCatalog {
        SkillDiscoverer::new().discover(root).unwrap()
    }

    #[test]
    fn discovers_skill_with_frontmatter() {
        let tmp = TempDir::new().unwrap();
        let dir = write_skill(
            tmp.path(),
            "acme/tools/helper",
            "---\nname: Helper Tool\ndescription: \"Does a thing\"\n---\n# Helper\n",
        );

        let catalog = discover(tmp.path());
        assert_eq!(catalog.count(), 1);
        let skill = catalog.iter().next().unwrap();
        assert_eq!(skill.name, "Helper Tool");
        assert_eq!(skill.dir_name, "helper");
        assert_eq!(skill.provider, "acme");
        assert_eq!(skill.description, "Does a thing");
        assert_eq!(skill.category, None);
        assert_eq!(skill.path, dir);
        assert!(skill.path.is_absolute());
    }

    #[test]
    fn falls_back_to_dir_name_without_frontmatter() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "acme/plain", "# Plain skill\nNo frontmatter.\n");
        write_skill(tmp.path(), "acme/broken", "---\nname: [unclosed\n---\n");
        write_skill(tmp.path(), "acme/open", "---\nname: never closed\n");
        write_skill(tmp.path(), "acme/blank", "---\nname: \"\"\ndescription: 7\n---\n");

        let catalog = discover(tmp.path());
        assert_eq!(catalog.count(), 4);
        for skill in &catalog {
            assert_eq!(skill.name, skill.dir_name);
            assert_eq!(skill.description, "");
        }
    }

    #[test]
    fn whitespace_name_is_kept() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "acme/spaced", "---\nname: \"  \"\n---\n");

        let catalog = discover(tmp.path());
        let skill = catalog.iter().next().unwrap();
        assert_eq!(skill.name, "  ");
        assert_eq!(skill.dir_name, "spaced");
    }

    #[test]
    fn providers_sorted_and_hidden_skipped() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "zeta/one", "");
        write_skill(tmp.path(), "acme/two", "");
        write_skill(tmp.path(), ".hidden/three", "");
        fs::write(tmp.path().join("README.md"), "not a provider").unwrap();

        let catalog = discover(tmp.path());
        let providers: Vec<_> = catalog.iter().map(|s| s.provider.as_str()).collect();
        assert_eq!(providers, vec!["acme", "zeta"]);
    }

    #[test]
    fn prunes_skip_dirs() {
        let tmp = TempDir::new().unwrap();
        for skipped in SKIP_DIRS {
            write_skill(tmp.path(), &format!("acme/{skipped}/inner"), "");
        }
        write_skill(tmp.path(), "acme/nested/node_modules/deep/pkg", "");
        write_skill(tmp.path(), "acme/kept", "");

        let catalog = discover(tmp.path());
        let names: Vec<_> = catalog.iter().map(|s| s.dir_name.as_str()).collect();
        assert_eq!(names, vec!["kept"]);
    }

    #[test]
    fn skips_template_candidates() {
        let tmp = TempDir::new().unwrap();
        // A provider named "template" is walked, but its own SKILL.md is skipped.
        write_skill(tmp.path(), "template", "");
        write_skill(tmp.path(), "template/real", "");

        let catalog = discover(tmp.path());
        assert_eq!(catalog.count(), 1);
        let skill = catalog.iter().next().unwrap();
        assert_eq!(skill.dir_name, "real");
        assert_eq!(skill.provider, "template");
    }

    #[test]
    fn dirs_without_skill_md_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("acme/empty/deeper")).unwrap();
        fs::write(tmp.path().join("acme/empty/README.md"), "hi").unwrap();

        assert!(discover(tmp.path()).is_empty());
    }

    #[test]
    fn dedups_per_provider_first_wins() {
        let tmp = TempDir::new().unwrap();
        let outer = write_skill(tmp.path(), "acme/helper", "---\nname: outer\n---\n");
        write_skill(tmp.path(), "acme/helper/vendored/helper", "---\nname: inner\n---\n");
        write_skill(tmp.path(), "zeta/helper", "");

        let catalog = discover(tmp.path());
        assert_eq!(catalog.count(), 2);
        let skills: Vec<_> = catalog.iter().collect();
        assert_eq!(skills[0].name, "outer");
        assert_eq!(skills[0].path, outer);
        assert_eq!(skills[1].provider, "zeta");

        let mut keys = HashSet::new();
        for skill in &catalog {
            assert!(keys.insert((skill.provider.clone(), skill.dir_name.clone())));
        }
    }

    #[test]
    fn category_from_dot_segment() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "acme/.curated/group/one", "");
        write_skill(tmp.path(), "acme/group/.system/two", "");
        write_skill(tmp.path(), "acme/.hidden-skill", "");
        write_skill(tmp.path(), "acme/plain", "");

        let catalog = discover(tmp.path());
        let category = |dir: &str| {
            catalog
                .iter()
                .find(|s| s.dir_name == dir)
                .unwrap()
                .category
                .clone()
        };
        assert_eq!(category("one"), Some("curated".to_string()));
        assert_eq!(category("two"), Some("system".to_string()));
        assert_eq!(category(".hidden-skill"), None);
        assert_eq!(category("plain"), None);
    }

    #[test]
    fn provider_dir_itself_can_be_a_skill() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "solo", "---\ndescription: '  standalone '\n---\n");

        let catalog = discover(tmp.path());
        let skill = catalog.iter().next().unwrap();
        assert_eq!(skill.dir_name, "solo");
        assert_eq!(skill.provider, "solo");
        assert_eq!(skill.description, "standalone");
        assert_eq!(skill.category, None);
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = SkillDiscoverer::new()
            .discover(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, Error::RootNotFound { .. }));
    }

    #[test]
    fn file_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, "").unwrap();
        let err = SkillDiscoverer::new().discover(&file).unwrap_err();
        assert!(matches!(err, Error::RootNotADirectory { .. }));
    }

    struct FixedParser;

    impl FrontmatterParser for FixedParser {
        fn parse(&self, block: &str) -> std::result::Result<Frontmatter, FrontmatterError> {
            if block.contains("fail") {
                return Err(FrontmatterError::NotAMapping);
            }
            Ok(Frontmatter::new()
                .with_field("name", FieldValue::Text("Injected".to_string()))
                .with_field("description", FieldValue::Text("\"from fake\"".to_string())))
        }
    }

    #[test]
    fn uses_injected_parser() {
        let tmp = TempDir::new().unwrap();
        write_skill(tmp.path(), "acme/good", "---\nanything\n---\n");
        write_skill(tmp.path(), "acme/bad", "---\nfail\n---\n");

        let catalog = SkillDiscoverer::with_parser(FixedParser)
            .discover(tmp.path())
            .unwrap();
        let good = catalog.iter().find(|s| s.dir_name == "good").unwrap();
        assert_eq!(good.name, "Injected");
        assert_eq!(good.description, "from fake");
        let bad = catalog.iter().find(|s| s.dir_name == "bad").unwrap();
        assert_eq!(bad.name, "bad");
    }
}
