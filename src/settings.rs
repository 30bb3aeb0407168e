use std::{
    fs::{self, File, OpenOptions},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Settings {
    /// Repository used by `push` when `--repo` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<PathBuf>,
}

pub(crate) fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("blogcard").join("settings.json"))
        .unwrap_or_else(|| PathBuf::from(".blogcard.json"))
}

pub(crate) fn load_settings(settings_path: &Path) -> anyhow::Result<Settings> {
    if settings_path.exists() {
        let fd = File::open(settings_path)
            .with_context(|| format!("while opening {settings_path:?}"))?;
        let reader = BufReader::new(fd);
        serde_json::from_reader(reader).with_context(|| format!("while reading {settings_path:?}"))
    } else {
        info!("Settings file({settings_path:?}) does not exist. using defaults...");
        Ok(Settings::default())
    }
}

pub(crate) fn save_settings(settings_path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = settings_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let settings_fd = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(settings_path)?;
    let writer = BufWriter::new(settings_fd);
    serde_json::to_writer_pretty(writer, settings)?;
    info!("Saved settings to {settings_path:?}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(&temp.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("settings.json");
        let settings = Settings {
            repo_path: Some(PathBuf::from("/srv/blog")),
        };

        save_settings(&path, &settings).unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains("\"repoPath\""));
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_save_truncates_previous_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, format!("{{\"repoPath\": \"{}\"}}", "x".repeat(200))).unwrap();

        save_settings(&path, &Settings::default()).unwrap();

        assert_eq!(load_settings(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_settings(&path).is_err());
    }
}
