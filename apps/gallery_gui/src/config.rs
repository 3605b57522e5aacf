use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use catalog_core::{HostAllowlist, DEFAULT_API_BASE_URL, DEFAULT_IMAGE_HOSTS};
use clap::Parser;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "gallery.toml";

#[derive(Parser, Debug, Default)]
#[command(name = "gallery_gui", about = "Browse vehicle renderings by model and paint")]
pub struct CliArgs {
    /// TOML settings file; defaults to <config dir>/vehicle_gallery/gallery.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub api_url: Option<String>,
    /// Preferred language for localized names (falls back to en)
    #[arg(long)]
    pub language: Option<String>,
    /// Replaces the image host allowlist; repeat for several hosts
    #[arg(long = "allowed-host")]
    pub allowed_hosts: Vec<String>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    pub api_base_url: String,
    pub allowed_image_hosts: Vec<String>,
    pub language: String,
    pub request_timeout_secs: u64,
    pub max_texture_dimension: u32,
    pub tab_animation_secs: f32,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            allowed_image_hosts: DEFAULT_IMAGE_HOSTS.iter().map(|h| h.to_string()).collect(),
            language: "en".into(),
            request_timeout_secs: 30,
            max_texture_dimension: 2048,
            tab_animation_secs: 0.4,
        }
    }
}

impl GallerySettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn allowlist(&self) -> HostAllowlist {
        HostAllowlist::new(&self.allowed_image_hosts)
    }
}

/// Defaults, then the TOML file, then environment, then command line.
pub fn load_settings(args: &CliArgs) -> anyhow::Result<GallerySettings> {
    let mut settings = match &args.config {
        Some(path) => read_settings_file(path)?,
        None => match default_config_path().filter(|path| path.exists()) {
            Some(path) => read_settings_file(&path)?,
            None => GallerySettings::default(),
        },
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    apply_cli_overrides(&mut settings, args);
    Ok(settings)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vehicle_gallery").join(CONFIG_FILE_NAME))
}

fn read_settings_file(path: &Path) -> anyhow::Result<GallerySettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env_overrides(settings: &mut GallerySettings, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("GALLERY_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = non_empty("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = non_empty("APP__LANGUAGE") {
        settings.language = v;
    }
    if let Some(v) = non_empty("APP__ALLOWED_IMAGE_HOSTS") {
        settings.allowed_image_hosts = v
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = non_empty("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => tracing::warn!("ignoring APP__REQUEST_TIMEOUT_SECS='{v}': {err}"),
        }
    }
}

fn apply_cli_overrides(settings: &mut GallerySettings, args: &CliArgs) {
    if let Some(v) = &args.api_url {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = &args.language {
        settings.language = v.clone();
    }
    if !args.allowed_hosts.is_empty() {
        settings.allowed_image_hosts = args.allowed_hosts.clone();
    }
    if let Some(v) = args.timeout_secs {
        settings.request_timeout_secs = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
