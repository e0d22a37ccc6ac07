use anyhow::Result;
use console::style;
use skillink_core::config::Config;
use skillink_core::{Error, Installer, LinkState, SkillDiscoverer, install};
use std::path::{Path, PathBuf};

const DESCRIPTION_WIDTH: usize = 120;

#[derive(clap::Args, Clone, Debug)]
pub struct PathArgs {
    /// Root directory containing provider skill directories
    #[arg(long, env = "SKILLINK_SKILLS_ROOT")]
    skills_root: Option<PathBuf>,

    /// Project directory (defaults to current working directory)
    #[arg(long)]
    project: Option<PathBuf>,
}

impl PathArgs {
    fn skills_root(&self, config: &Config) -> PathBuf {
        config.clone().with_skills_root(self.skills_root.clone()).skills_root
    }

    fn project(&self) -> Result<PathBuf> {
        match &self.project {
            Some(project) => Ok(project.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum SkillsCommands {
    /// List available skills
    List {
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Show installed skills for a project
    Installed {
        /// Show every target directory instead of the merged view
        #[arg(long)]
        by_target: bool,
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Install a skill via symlink
    Install {
        /// Name of the skill to install
        skill_name: String,
        /// Provider name if skill name is ambiguous
        #[arg(long)]
        provider: Option<String>,
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Uninstall a skill (remove symlink)
    Uninstall {
        /// Name of the skill to uninstall
        skill_name: String,
        #[command(flatten)]
        paths: PathArgs,
    },
}

pub fn handle_command(command: SkillsCommands, config: &Config) -> Result<()> {
    let installer = config.installer();
    tracing::debug!(?command, targets = ?installer.targets(), "Running skills command");
    match command {
        SkillsCommands::List { paths } => {
            list_skills(&paths.skills_root(config), &paths.project()?, &installer)
        }
        SkillsCommands::Installed { by_target, paths } => {
            let project = paths.project()?;
            if by_target {
                list_installed_by_target(&project, &installer)
            } else {
                list_installed(&project, &installer)
            }
        }
        SkillsCommands::Install {
            skill_name,
            provider,
            paths,
        } => install_skill(
            &skill_name,
            provider.as_deref(),
            &paths.skills_root(config),
            &paths.project()?,
            &installer,
        ),
        SkillsCommands::Uninstall { skill_name, paths } => {
            uninstall_skill(&skill_name, &paths.project()?, &installer)
        }
    }
}

fn list_skills(skills_root: &Path, project: &Path, installer: &Installer) -> Result<()> {
    let catalog = SkillDiscoverer::new().discover(skills_root)?;

    if catalog.is_empty() {
        println!(
            "{} No skills found in {}",
            style("!").yellow(),
            skills_root.display()
        );
        return Ok(());
    }

    let installed = installer.list_installed(project)?;
    let grouped = catalog.by_provider();
    let provider_count = grouped.len();

    for (provider, mut skills) in grouped {
        println!();
        println!("{}", style(format!("## {provider}")).cyan().bold());
        skills.sort_by(|a, b| a.name.cmp(&b.name));

        for (i, skill) in skills.iter().enumerate() {
            let category = skill
                .category
                .as_deref()
                .map(|c| format!(" [{c}]"))
                .unwrap_or_default();
            let status = if installed.contains_key(&skill.dir_name)
                || installed.contains_key(&skill.name)
            {
                style(" (installed)").green().to_string()
            } else {
                String::new()
            };

            println!(
                "  {}. {}{}{}",
                i + 1,
                style(&skill.name).white().bold(),
                style(category).dim(),
                status
            );
            if !skill.description.is_empty() {
                println!("     {}", truncate_description(&skill.description));
            }
        }
    }

    println!();
    println!(
        "Total: {} skills from {} providers",
        catalog.count(),
        provider_count
    );

    Ok(())
}

fn list_installed(project: &Path, installer: &Installer) -> Result<()> {
    let installed = installer.list_installed(project)?;

    if installed.is_empty() {
        println!("No skills installed for project at {}", project.display());
        return Ok(());
    }

    println!("Installed skills for {}:", project.display());
    println!();
    for (name, state) in &installed {
        println!("  - {}", describe_entry(name, state));
    }

    Ok(())
}

fn list_installed_by_target(project: &Path, installer: &Installer) -> Result<()> {
    for (dir, entries) in installer.list_installed_by_target(project)? {
        println!("{}", style(dir.display()).cyan().bold());
        if entries.is_empty() {
            println!("  {}", style("(none)").dim());
        }
        for (name, state) in &entries {
            println!("  - {}", describe_entry(name, state));
        }
    }

    Ok(())
}

fn install_skill(
    skill_name: &str,
    provider: Option<&str>,
    skills_root: &Path,
    project: &Path,
    installer: &Installer,
) -> Result<()> {
    let catalog = SkillDiscoverer::new().discover(skills_root)?;

    let skill = match install::resolve(&catalog, skill_name, provider) {
        Ok(skill) => skill,
        Err(e @ Error::SkillNotFound { .. }) => {
            anyhow::bail!("{e}\nRun 'skillink list' to see available skills.")
        }
        Err(e) => return Err(e.into()),
    };

    let created = installer.install(skill, project)?;

    if created.is_empty() {
        println!(
            "{} Skill '{}' is already installed (symlinked to {}).",
            style("✓").green().bold(),
            skill.name,
            skill.path.display()
        );
        return Ok(());
    }

    println!(
        "{} Installed '{}' from {}",
        style("✓").green().bold(),
        skill.name,
        skill.provider
    );
    for link in &created {
        println!("  {} -> {}", link.display(), skill.path.display());
    }

    Ok(())
}

fn uninstall_skill(skill_name: &str, project: &Path, installer: &Installer) -> Result<()> {
    let report = installer.uninstall(skill_name, project)?;

    if !report.removed.is_empty() {
        println!(
            "{} Uninstalled '{}'",
            style("✓").green().bold(),
            skill_name
        );
        for removed in &report.removed {
            println!(
                "  Removed symlink: {} -> {}",
                removed.path.display(),
                removed.target.display()
            );
        }
    }

    for warning in &report.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    Ok(())
}

fn describe_entry(name: &str, state: &LinkState) -> String {
    match state {
        LinkState::Symlink(target) => format!("{} -> {}", name, target.display()),
        LinkState::NotSymlink => format!("{} (local copy, not symlinked)", name),
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_WIDTH {
        return description.to_string();
    }
    let mut cut: String = description.chars().take(DESCRIPTION_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}
