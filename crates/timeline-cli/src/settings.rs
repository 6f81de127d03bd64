//! Runtime settings resolved from flags and the environment.

use std::path::{Path, PathBuf};

use timeline_core::defaults::{DATA_DIR_NAME, EVENT_BUS_CAPACITY};

pub const ENV_DATA_DIR: &str = "TIMELINE_DATA_DIR";
pub const ENV_EVENT_CAPACITY: &str = "TIMELINE_EVENT_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub event_capacity: usize,
}

impl Settings {
    /// Resolve settings for this process.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `TIMELINE_DATA_DIR` | `$HOME/.timeline` | Directory for the JSON files |
    /// | `TIMELINE_EVENT_CAPACITY` | `256` | Event bus buffer |
    ///
    /// `--data-dir` wins over the environment.
    pub fn resolve(data_dir_flag: Option<PathBuf>) -> Self {
        let data_dir = resolve_data_dir(
            data_dir_flag,
            std::env::var(ENV_DATA_DIR).ok(),
            std::env::var_os("HOME").map(PathBuf::from),
        );
        let event_capacity = std::env::var(ENV_EVENT_CAPACITY)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(EVENT_BUS_CAPACITY);
        Self {
            data_dir,
            event_capacity,
        }
    }
}

fn resolve_data_dir(flag: Option<PathBuf>, env: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = env.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    home.as_deref()
        .unwrap_or(Path::new("."))
        .join(DATA_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let dir = resolve_data_dir(
            Some(PathBuf::from("/tmp/a")),
            Some("/tmp/b".to_string()),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(dir, PathBuf::from("/tmp/a"));
    }

    #[test]
    fn test_env_before_home() {
        let dir = resolve_data_dir(None, Some("/srv/timeline".to_string()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/srv/timeline"));
    }

    #[test]
    fn test_blank_env_ignored() {
        let dir = resolve_data_dir(None, Some("  ".to_string()), Some(PathBuf::from("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.timeline"));
    }

    #[test]
    fn test_no_home_uses_cwd() {
        assert_eq!(resolve_data_dir(None, None, None), PathBuf::from("./.timeline"));
    }
}
