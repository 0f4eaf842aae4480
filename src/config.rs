use crate::ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::path::PathBuf;

const KEY_VARS: [&str; 3] = ["TOOLHUB_API_KEY", "API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub api_key: Option<String>,
    pub ai_base_url: String,
    pub ai_model: String,
    pub data_dir: PathBuf,
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = KEY_VARS.iter().find_map(|name| non_blank(name));
        let ai_base_url = non_blank("TOOLHUB_AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let ai_model = non_blank("TOOLHUB_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let data_dir = match non_blank("TOOLHUB_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => preferred_base_dir(non_blank("TMPDIR")).join("toolhub"),
        };

        Self {
            api_key,
            ai_base_url,
            ai_model,
            data_dir,
        }
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}

fn preferred_base_dir(tmpdir: Option<String>) -> PathBuf {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = tmpdir {
        candidates.push(PathBuf::from(dir));
    }
    candidates.push(std::env::temp_dir());

    for dir in candidates {
        if let Ok(meta) = std::fs::metadata(&dir) {
            if meta.is_dir() {
                return dir;
            }
        }
    }
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HubConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HubConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.ai_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.ai_model, DEFAULT_MODEL);
        assert!(cfg.data_dir.ends_with("toolhub"));
    }

    #[test]
    fn api_key_falls_back_in_order() {
        assert_eq!(
            config(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]).api_key.as_deref(),
            Some("a")
        );
        assert_eq!(
            config(&[("TOOLHUB_API_KEY", "t"), ("API_KEY", "a")]).api_key.as_deref(),
            Some("t")
        );
        assert_eq!(
            config(&[("TOOLHUB_API_KEY", " "), ("GEMINI_API_KEY", "g")]).api_key.as_deref(),
            Some("g")
        );
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().to_string_lossy().to_string();
        let cfg = config(&[("TOOLHUB_DATA_DIR", raw.as_str())]);
        assert_eq!(cfg.data_dir, dir.path());
        assert_eq!(cfg.preferences_path(), dir.path().join("preferences.json"));
    }

    #[test]
    fn tmpdir_used_when_it_exists() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().to_string_lossy().to_string();
        let cfg = config(&[("TMPDIR", raw.as_str())]);
        assert_eq!(cfg.data_dir, dir.path().join("toolhub"));
    }
}
