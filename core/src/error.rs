use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::skills::Skill;

#[derive(Error, Debug)]
pub enum Error {
    #[error("skills root not found: {}", .path.display())]
    RootNotFound { path: PathBuf },

    #[error("skills root is not a directory: {}", .path.display())]
    RootNotADirectory { path: PathBuf },

    #[error("skill '{name}' not found")]
    SkillNotFound { name: String },

    #[error("skill '{name}' not found from provider '{provider}'")]
    SkillNotFoundFromProvider { name: String, provider: String },

    #[error(
        "multiple skills named '{name}' found:\n{}\nUse --provider to specify which one.",
        describe_candidates(.candidates)
    )]
    SkillAmbiguous { name: String, candidates: Vec<Skill> },

    #[error(
        "skill already linked in {} but points to a different location\n  Current: {}\n  New:     {}\nRemove the existing link first with 'uninstall'.",
        .dir.display(),
        .current.display(),
        .desired.display()
    )]
    SymlinkConflict {
        dir: PathBuf,
        current: PathBuf,
        desired: PathBuf,
    },

    #[error(
        "'{}' exists and is not a symlink. Remove it manually if you want to replace it.",
        .path.display()
    )]
    NotASymlink { path: PathBuf },

    #[error("skill '{name}' is not installed for this project")]
    NotInstalled { name: String },

    #[error("invalid skill name: {name}")]
    InvalidSkillName { name: String },

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn describe_candidates(candidates: &[Skill]) -> String {
    let mut out = String::new();
    for skill in candidates {
        let category = skill
            .category
            .as_deref()
            .map(|c| format!(" [{c}]"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  - {}{}: {}",
            skill.provider,
            category,
            skill.path.display()
        );
    }
    out.truncate(out.trim_end().len());
    out
}
