use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub data_path: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5000".into(),
            data_path: "./data.csv".into(),
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_settings(&mut settings, &raw);
    }

    // Hosting platforms hand over only a port.
    if let Ok(v) = std::env::var("PORT") {
        if let Ok(port) = v.parse::<u16>() {
            settings.server_bind = format!("0.0.0.0:{port}");
        }
    }
    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("DATA_PATH") {
        settings.data_path = v;
    }
    if let Ok(v) = std::env::var("APP__DATA_PATH") {
        settings.data_path = v;
    }

    if let Ok(v) = std::env::var("RUST_LOG") {
        settings.log_filter = v;
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("data_path") {
        settings.data_path = v.clone();
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
}

/// Resolves the CSV location and makes sure its directory exists so that the
/// admin tool can save next to it.
pub fn prepare_data_path(raw_data_path: &str) -> anyhow::Result<PathBuf> {
    let path = normalize_data_path(raw_data_path);
    ensure_parent_dir_exists(&path)?;
    Ok(path)
}

fn normalize_data_path(raw_data_path: &str) -> PathBuf {
    let raw_data_path = raw_data_path.trim();

    if raw_data_path.is_empty() {
        return PathBuf::from(Settings::default().data_path);
    }

    let raw_data_path = raw_data_path
        .strip_prefix("file://")
        .unwrap_or(raw_data_path);
    PathBuf::from(raw_data_path.replace('\\', "/"))
}

fn ensure_parent_dir_exists(path: &Path) -> anyhow::Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for data file '{}'",
            parent.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
