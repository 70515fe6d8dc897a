//! Configuration management for `nozbe_org`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`NOZBE2ORG_<KEY>`)
//! 3. Config file (`--config PATH`, else `./nozbe2org.yaml` when present)
//! 4. Defaults

use crate::error::{ConvertError, Result};
use crate::loader::{DeletedComments, LoadOptions};
use crate::render::{RenderOptions, StateMarkers};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "nozbe2org.yaml";
/// Default output file for the combined layout.
pub const DEFAULT_COMBINED_OUTPUT: &str = "Nozbe.org";
/// Default output directory for the per-project layout.
pub const DEFAULT_PER_PROJECT_OUTPUT: &str = ".";

const ENV_PREFIX: &str = "NOZBE2ORG_";

/// How projects map onto output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    /// One file, one top-level heading per project.
    #[default]
    Combined,
    /// One `<project name>.org` file per project inside a directory.
    PerProject,
}

impl OutputLayout {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::PerProject => "per-project",
        }
    }

    #[must_use]
    pub const fn default_output(self) -> &'static str {
        match self {
            Self::Combined => DEFAULT_COMBINED_OUTPUT,
            Self::PerProject => DEFAULT_PER_PROJECT_OUTPUT,
        }
    }
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputLayout {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "combined" | "single" => Ok(Self::Combined),
            "per-project" | "split" => Ok(Self::PerProject),
            other => Err(ConvertError::config(format!(
                "layout must be 'combined' or 'per-project', got '{other}'"
            ))),
        }
    }
}

/// A flat key/value configuration layer.
///
/// List settings given as real lists (YAML sequences, repeated CLI flags) are
/// kept element by element in `lists`; a key lives in at most one of the maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
    pub lists: HashMap<String, Vec<String>>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.lists.remove(key);
            self.values.insert(key.clone(), value.clone());
        }
        for (key, items) in &other.lists {
            self.values.remove(key);
            self.lists.insert(key.clone(), items.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        self.lists.remove(&key);
        self.values.insert(key, value.into());
    }

    pub fn insert_list(&mut self, key: &str, items: Vec<String>) {
        let key = normalize_key(key);
        self.values.remove(&key);
        self.lists.insert(key, items);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// A list setting. Scalar values (env vars, plain YAML strings) are split
    /// on commas; real lists are returned as given.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        let key = normalize_key(key);
        if let Some(items) = self.lists.get(&key) {
            return Some(items.clone());
        }
        self.values.get(&key).map(String::as_str).map(split_list)
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut layer = Self::default();
        flatten_yaml(&value, "", &mut layer);
        Ok(layer)
    }

    /// Build a layer from `NOZBE2ORG_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from arbitrary `(name, value)` pairs.
    #[must_use]
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }
        layer
    }
}

/// CLI overrides for config loading (all optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub layout: Option<String>,
    pub state_markers: Option<String>,
    pub deleted_comments: Option<String>,
    pub no_download: bool,
    pub attachments_dir: Option<PathBuf>,
    pub download_timeout: Option<u64>,
    pub projects: Vec<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.output {
            layer.insert("output", path.to_string_lossy());
        }
        if let Some(layout) = &self.layout {
            layer.insert("layout", layout.clone());
        }
        if let Some(markers) = &self.state_markers {
            layer.insert("state-markers", markers.clone());
        }
        if let Some(policy) = &self.deleted_comments {
            layer.insert("deleted-comments", policy.clone());
        }
        if self.no_download {
            layer.insert("download", "false");
        }
        if let Some(dir) = &self.attachments_dir {
            layer.insert("attachments-dir", dir.to_string_lossy());
        }
        if let Some(timeout) = self.download_timeout {
            layer.insert("download-timeout", timeout.to_string());
        }
        if !self.projects.is_empty() {
            layer.insert_list("projects", self.projects.clone());
        }

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("layout", OutputLayout::default().as_str());
    layer.insert("state-markers", StateMarkers::default().as_str());
    layer.insert("deleted-comments", DeletedComments::default().as_str());
    layer.insert("download", "true");
    layer.insert("attachments-dir", ".");
    layer
}

/// Load configuration with the documented precedence order.
///
/// # Errors
///
/// Returns an error if an explicit config file is missing, or any config file
/// cannot be read or parsed.
pub fn load_config(config_path: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    let file_layer = match config_path {
        Some(path) => {
            if !path.is_file() {
                return Err(ConvertError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            ConfigLayer::from_yaml(path)?
        }
        None => ConfigLayer::from_yaml(Path::new(DEFAULT_CONFIG_FILENAME))?,
    };

    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        file_layer,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

/// Fully resolved settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub layout: OutputLayout,
    pub output: PathBuf,
    pub state_markers: StateMarkers,
    pub deleted_comments: DeletedComments,
    pub download: bool,
    pub attachments_dir: PathBuf,
    pub download_timeout: Option<Duration>,
    /// Project names to convert; empty means all.
    pub projects: Vec<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            layout: OutputLayout::Combined,
            output: PathBuf::from(DEFAULT_COMBINED_OUTPUT),
            state_markers: StateMarkers::Contexts,
            deleted_comments: DeletedComments::Stop,
            download: true,
            attachments_dir: PathBuf::from("."),
            download_timeout: None,
            projects: Vec::new(),
        }
    }
}

impl ConvertConfig {
    /// Resolve a merged layer into typed settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] for any invalid value.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let layout = layer
            .get("layout")
            .map(OutputLayout::from_str)
            .transpose()?
            .unwrap_or_default();
        let output = layer
            .get("output")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(layout.default_output()), PathBuf::from);
        let state_markers = layer
            .get("state-markers")
            .map(StateMarkers::from_str)
            .transpose()?
            .unwrap_or_default();
        let deleted_comments = layer
            .get("deleted-comments")
            .map(DeletedComments::from_str)
            .transpose()?
            .unwrap_or_default();
        let download = match layer.get("download") {
            Some(value) => parse_bool(value).ok_or_else(|| {
                ConvertError::config(format!("download must be a boolean, got '{value}'"))
            })?,
            None => true,
        };
        let attachments_dir = PathBuf::from(layer.get("attachments-dir").unwrap_or("."));
        let download_timeout = match layer.get("download-timeout") {
            Some(value) if !value.trim().is_empty() => {
                let secs = value.trim().parse::<u64>().map_err(|_| {
                    ConvertError::config(format!(
                        "download-timeout must be whole seconds, got '{value}'"
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };
        let projects = layer.get_list("projects").unwrap_or_default();

        Ok(Self {
            layout,
            output,
            state_markers,
            deleted_comments,
            download,
            attachments_dir,
            download_timeout,
            projects,
        })
    }

    #[must_use]
    pub const fn load_options(&self) -> LoadOptions {
        LoadOptions {
            deleted_comments: self.deleted_comments,
        }
    }

    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            state_markers: self.state_markers,
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['_', '.'], "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut ConfigLayer) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let items = values.iter().filter_map(yaml_scalar_to_string).collect();
            out.insert_list(prefix, items);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix, value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
