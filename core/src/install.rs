use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::skills::{Skill, SkillCatalog};

/// Per-project skill mount points, relative to the project root.
pub const DEFAULT_TARGETS: &[&str] = &[".claude/skills", ".codex/skills", ".agents/skills"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Symlink(PathBuf),
    /// A real directory; left alone by install and uninstall.
    NotSymlink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedLink {
    pub path: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Default)]
pub struct UninstallReport {
    pub removed: Vec<RemovedLink>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Installer {
    targets: Vec<PathBuf>,
}

impl Default for Installer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGETS.iter().copied().map(PathBuf::from))
    }
}

impl Installer {
    pub fn new(targets: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::new();
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        Self { targets: unique }
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn target_dirs(&self, project: &Path) -> Vec<PathBuf> {
        self.targets.iter().map(|t| project.join(t)).collect()
    }

    /// Installed entries across all targets. A name found in several
    /// targets reports the state from the first one.
    pub fn list_installed(&self, project: &Path) -> Result<BTreeMap<String, LinkState>> {
        let mut installed = BTreeMap::new();
        for (_, entries) in self.list_installed_by_target(project)? {
            for (name, state) in entries {
                installed.entry(name).or_insert(state);
            }
        }
        Ok(installed)
    }

    pub fn list_installed_by_target(
        &self,
        project: &Path,
    ) -> Result<Vec<(PathBuf, BTreeMap<String, LinkState>)>> {
        self.target_dirs(project)
            .into_iter()
            .map(|dir| {
                let entries = scan_target(&dir)?;
                Ok((dir, entries))
            })
            .collect()
    }

    /// Links `skill` into every target directory. All targets are checked
    /// before anything is created; returns only the links made by this call.
    pub fn install(&self, skill: &Skill, project: &Path) -> Result<Vec<PathBuf>> {
        let mut pending = Vec::new();

        for dir in self.target_dirs(project) {
            let link = dir.join(&skill.dir_name);
            match fs::symlink_metadata(&link) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    let current = fs::read_link(&link).map_err(|e| Error::io(&link, e))?;
                    if current != skill.path {
                        return Err(Error::SymlinkConflict {
                            dir,
                            current,
                            desired: skill.path.clone(),
                        });
                    }
                    tracing::debug!(link = %link.display(), "Skill already linked");
                }
                Ok(_) => return Err(Error::NotASymlink { path: link }),
                Err(e) if e.kind() == io::ErrorKind::NotFound => pending.push((dir, link)),
                Err(e) => return Err(Error::io(&link, e)),
            }
        }

        let mut created = Vec::with_capacity(pending.len());
        for (dir, link) in pending {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            create_symlink(&skill.path, &link).map_err(|e| Error::io(&link, e))?;
            tracing::info!(
                link = %link.display(),
                target = %skill.path.display(),
                "Skill linked"
            );
            created.push(link);
        }

        Ok(created)
    }

    /// Removes the `name` symlink from every target directory. Real
    /// directories become warnings rather than failures.
    pub fn uninstall(&self, name: &str, project: &Path) -> Result<UninstallReport> {
        if is_unsafe_skill_name(name) {
            return Err(Error::InvalidSkillName {
                name: name.to_string(),
            });
        }

        let mut report = UninstallReport::default();

        for dir in self.target_dirs(project) {
            let link = dir.join(name);
            match fs::symlink_metadata(&link) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    let target = fs::read_link(&link).map_err(|e| Error::io(&link, e))?;
                    remove_symlink(&link).map_err(|e| Error::io(&link, e))?;
                    tracing::info!(link = %link.display(), target = %target.display(), "Skill unlinked");
                    report.removed.push(RemovedLink { path: link, target });
                }
                Ok(_) => {
                    tracing::warn!(path = %link.display(), "Refusing to remove non-symlink");
                    report.warnings.push(format!(
                        "'{}' is not a symlink. It appears to be a local copy. Remove it manually if you're sure: rm -rf {}",
                        link.display(),
                        link.display()
                    ));
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                    ) => {}
                Err(e) => return Err(Error::io(&link, e)),
            }
        }

        if report.removed.is_empty() && report.warnings.is_empty() {
            return Err(Error::NotInstalled {
                name: name.to_string(),
            });
        }

        Ok(report)
    }
}

/// Picks the catalog entry for a user-supplied name, optionally narrowed
/// to one provider.
pub fn resolve<'a>(
    catalog: &'a SkillCatalog,
    name: &str,
    provider: Option<&str>,
) -> Result<&'a Skill> {
    let matches = catalog.matching(name);
    if matches.is_empty() {
        return Err(Error::SkillNotFound {
            name: name.to_string(),
        });
    }

    let Some(provider) = provider else {
        if matches.len() > 1 {
            return Err(Error::SkillAmbiguous {
                name: name.to_string(),
                candidates: matches.into_iter().cloned().collect(),
            });
        }
        return Ok(matches[0]);
    };

    matches
        .into_iter()
        .find(|s| s.provider == provider)
        .ok_or_else(|| Error::SkillNotFoundFromProvider {
            name: name.to_string(),
            provider: provider.to_string(),
        })
}

fn scan_target(dir: &Path) -> Result<BTreeMap<String, LinkState>> {
    let mut entries = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(entries);
    }

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }

        let state = if path.is_symlink() {
            LinkState::Symlink(fs::read_link(&path).map_err(|e| Error::io(&path, e))?)
        } else {
            LinkState::NotSymlink
        };
        entries.insert(name, state);
    }

    Ok(entries)
}

/// A name must be exactly one plain path component, so `dir.join(name)`
/// stays inside `dir`.
fn is_unsafe_skill_name(name: &str) -> bool {
    if name.contains(['/', '\\', '\0']) {
        return true;
    }
    let mut components = Path::new(name).components();
    !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(unix)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))
}
