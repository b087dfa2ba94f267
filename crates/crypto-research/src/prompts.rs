//! Prompt and Skill Loading
//!
//! Agent prompts live as markdown files under a prompts directory; skills
//! are directories with a `SKILL.md` and optional `references/` files.
//! Missing prompts are an error the caller can fall back from; missing
//! skills degrade to empty content so a bare checkout still runs.

use std::path::{Path, PathBuf};

use crate::error::{ResearchError, Result};

const DEFAULT_PROMPTS_DIR: &str = "prompts";
const DEFAULT_SKILLS_DIR: &str = "skills";

/// Filesystem-backed store for agent prompts and skills
#[derive(Debug, Clone)]
pub struct PromptStore {
    prompts_dir: PathBuf,
    skills_dir: PathBuf,
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPTS_DIR, DEFAULT_SKILLS_DIR)
    }
}

impl PromptStore {
    pub fn new(prompts_dir: impl Into<PathBuf>, skills_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            skills_dir: skills_dir.into(),
        }
    }

    /// Honor `PROMPTS_DIR` and `SKILLS_DIR` overrides
    pub fn from_env() -> Self {
        let dir = |name: &str, default: &str| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| PathBuf::from(default), PathBuf::from)
        };
        Self {
            prompts_dir: dir("PROMPTS_DIR", DEFAULT_PROMPTS_DIR),
            skills_dir: dir("SKILLS_DIR", DEFAULT_SKILLS_DIR),
        }
    }

    /// Load a prompt by name (without the `.md` extension)
    pub fn load_prompt(&self, name: &str) -> Result<String> {
        let path = self.prompts_dir.join(format!("{name}.md"));
        std::fs::read_to_string(&path)
            .map_err(|_| ResearchError::Prompt(format!("prompt not found: {}", path.display())))
    }

    /// Load a prompt, falling back to a built-in default when missing
    pub fn prompt_or(&self, name: &str, fallback: &str) -> String {
        match self.load_prompt(name) {
            Ok(prompt) => prompt,
            Err(_) => {
                tracing::warn!(prompt = name, "prompt file missing, using built-in default");
                fallback.to_string()
            }
        }
    }

    /// A skill's `SKILL.md`, or empty when the skill is not installed
    pub fn load_skill(&self, skill: &str) -> String {
        read_or_empty(&self.skills_dir.join(skill).join("SKILL.md"))
    }

    /// A skill's reference file (progressive disclosure), or empty
    pub fn load_skill_reference(&self, skill: &str, reference: &str) -> String {
        read_or_empty(&self.skills_dir.join(skill).join("references").join(reference))
    }

    /// Names of all prompt files present, sorted
    pub fn available_prompts(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.prompts_dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "md") {
                    path.file_stem()
                        .and_then(|stem| stem.to_str())
                        .map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names
    }
}

fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store(tag: &str) -> (PromptStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("prompt-store-{tag}-{}", std::process::id()));
        let prompts = root.join("prompts");
        let skills = root.join("skills");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::create_dir_all(&skills).unwrap();
        (PromptStore::new(&prompts, &skills), root)
    }

    #[test]
    fn test_load_prompt_round_trip() {
        let (store, root) = scratch_store("load");
        std::fs::write(
            root.join("prompts/price_analyst.md"),
            "You analyze prices.",
        )
        .unwrap();

        assert_eq!(store.load_prompt("price_analyst").unwrap(), "You analyze prices.");
        assert!(store.load_prompt("missing").is_err());
    }

    #[test]
    fn test_prompt_or_falls_back() {
        let (store, _root) = scratch_store("fallback");
        let prompt = store.prompt_or("absent", "default prompt");
        assert_eq!(prompt, "default prompt");
    }

    #[test]
    fn test_missing_skill_is_empty() {
        let (store, root) = scratch_store("skill");

        assert_eq!(store.load_skill("not-installed"), "");

        let skill_dir = root.join("skills/technical-analysis");
        std::fs::create_dir_all(skill_dir.join("references")).unwrap();
        std::fs::write(skill_dir.join("SKILL.md"), "# Technical Analysis").unwrap();
        std::fs::write(skill_dir.join("references/indicators.md"), "RSI notes").unwrap();

        assert_eq!(store.load_skill("technical-analysis"), "# Technical Analysis");
        assert_eq!(
            store.load_skill_reference("technical-analysis", "indicators.md"),
            "RSI notes"
        );
        assert_eq!(store.load_skill_reference("technical-analysis", "nope.md"), "");
    }

    #[test]
    fn test_available_prompts_sorted() {
        let (store, root) = scratch_store("list");
        std::fs::write(root.join("prompts/social_sentinel.md"), "b").unwrap();
        std::fs::write(root.join("prompts/news_aggregator.md"), "a").unwrap();
        std::fs::write(root.join("prompts/notes.txt"), "ignored").unwrap();

        assert_eq!(
            store.available_prompts(),
            vec!["news_aggregator".to_string(), "social_sentinel".to_string()]
        );
    }
}
