use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};
use skillink_core::config::{self, Config};
use skillink_core::install::DEFAULT_TARGETS;
use std::path::{Path, PathBuf};

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

pub fn run_onboard() -> Result<Config> {
    let current = Config::load_or_init()?;

    println!("{}", style("skillink setup").white().bold());

    print_step(1, 2, "Skills root");
    let root: String = Input::new()
        .with_prompt("Directory containing provider skill folders")
        .default(current.skills_root.display().to_string())
        .interact_text()?;
    let skills_root = config::expand_home(Path::new(root.trim()));

    if !skills_root.is_dir() {
        println!(
            "{} {} does not exist yet",
            style("!").yellow(),
            skills_root.display()
        );
    }

    print_step(2, 2, "Install targets");
    let options = [
        format!("Default ({})", DEFAULT_TARGETS.join(", ")),
        format!("Claude only ({})", DEFAULT_TARGETS[0]),
        "Custom".to_string(),
    ];
    let selection = Select::new()
        .with_prompt("Where should skills be linked inside each project?")
        .items(&options)
        .default(0)
        .interact()?;

    let targets = match selection {
        0 => DEFAULT_TARGETS.iter().copied().map(PathBuf::from).collect(),
        1 => vec![PathBuf::from(DEFAULT_TARGETS[0])],
        _ => {
            let raw: String = Input::new()
                .with_prompt("Comma-separated directories, relative to the project")
                .interact_text()?;
            parse_targets(&raw)
        }
    };

    if targets.is_empty() {
        anyhow::bail!("At least one install target is required");
    }

    Ok(Config {
        skills_root,
        targets,
    })
}

fn parse_targets(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_targets() {
        assert_eq!(
            parse_targets(" .claude/skills, ,.agents/skills "),
            vec![
                PathBuf::from(".claude/skills"),
                PathBuf::from(".agents/skills")
            ]
        );
        assert!(parse_targets(" , ").is_empty());
    }
}
