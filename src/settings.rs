use anyhow::{anyhow, Context, Result};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::options::FeedbackOptions;

/// Feedback options backed by a JSON file. A missing or unreadable file
/// yields the defaults.
pub struct OptionsStore {
    path: PathBuf,
    data: RwLock<FeedbackOptions>,
}

impl OptionsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read options from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Invalid options in {}, using defaults: {err}", path.display());
                FeedbackOptions::default()
            })
        } else {
            FeedbackOptions::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn options(&self) -> FeedbackOptions {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, options: FeedbackOptions) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("options lock poisoned"))?;
        *guard = options;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read options from {}", self.path.display()))?;
        let data: FeedbackOptions = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid options in {}", self.path.display()))?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("options lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &FeedbackOptions) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write options to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SyllabMode;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("readfeed-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let store = OptionsStore::new(temp_path("missing")).unwrap();
        assert_eq!(store.options(), FeedbackOptions::default());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let path = temp_path("roundtrip");
        let store = OptionsStore::new(path.clone()).unwrap();

        let mut options = FeedbackOptions::default();
        options.syllab.language = "fi".into();
        options.syllab.mode = SyllabMode::Hyphen;
        options.syllab.exceptions = crate::options::Exceptions::from_text("auto=au to");
        store.update(options.clone()).unwrap();

        let reopened = OptionsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.options(), options);
        reopened.reload().unwrap();
        assert_eq!(reopened.options(), options);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = temp_path("invalid");
        fs::write(&path, "{ not json").unwrap();

        let store = OptionsStore::new(path.clone()).unwrap();
        assert_eq!(store.options(), FeedbackOptions::default());
        assert!(store.reload().is_err());

        let _ = fs::remove_file(path);
    }
}
