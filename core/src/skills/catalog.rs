use std::collections::BTreeMap;

use super::Skill;

/// Ordered result of one discovery pass. Providers appear in sorted order,
/// skills within a provider in walk order.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
}

impl SkillCatalog {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Skill> {
        self.skills.iter()
    }

    pub fn count(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Entries whose display name or directory name equals `name`, in catalog order.
    pub fn matching(&self, name: &str) -> Vec<&Skill> {
        self.skills.iter().filter(|s| s.matches(name)).collect()
    }

    pub fn by_provider(&self) -> BTreeMap<&str, Vec<&Skill>> {
        let mut grouped: BTreeMap<&str, Vec<&Skill>> = BTreeMap::new();
        for skill in &self.skills {
            grouped.entry(skill.provider.as_str()).or_default().push(skill);
        }
        grouped
    }
}

impl<'a> IntoIterator for &'a SkillCatalog {
    type Item = &'a Skill;
    type IntoIter = std::slice::Iter<'a, Skill>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter()
    }
}
