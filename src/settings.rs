//! Configuration loader
//!
//! `defaults/streamdoc.default.toml` is embedded into the binary so the documented defaults and
//! runtime behavior stay in sync. Callers layer user files and single-key overrides on top via
//! [`Loader`] before deserializing into [`StreamdocConfig`].

use crate::editor::{EditorOptions, MountPolicy};
use crate::formats::html::serializer::MarkupOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/streamdoc.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct StreamdocConfig {
    pub editor: EditorConfig,
    pub export: MarkupOptions,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub chart_enabled: bool,
    pub mount_policy: MountPolicy,
}

/// Pacing used when replaying a file as a stream
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub chunk_size: usize,
    pub delay_ms: u64,
    pub tick_ms: u64,
}

impl StreamConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl StreamdocConfig {
    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            chart_enabled: self.editor.chart_enabled,
            mount_policy: self.editor.mount_policy,
            markup: self.export.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start from the embedded defaults
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file; a missing file is an error at build time
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one dotted key, e.g. `stream.chunk_size`
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<StreamdocConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<StreamdocConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.editor.chart_enabled);
        assert_eq!(config.editor.mount_policy, MountPolicy::PerTick);
        assert_eq!(config.export, MarkupOptions::default());
        assert_eq!(config.stream.chunk_size, 2);
        assert_eq!(config.stream.tick(), Duration::from_millis(16));
    }

    #[test]
    fn defaults_match_editor_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.editor_options(), EditorOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("editor.mount_policy", "eager")
            .expect("override to apply")
            .set_override("stream.chunk_size", 8)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.editor.mount_policy, MountPolicy::Eager);
        assert_eq!(config.stream.chunk_size, 8);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[export]\nplaceholder = \"(no chart)\"").expect("write config");

        let config = Loader::new().with_file(file.path()).build().expect("config to build");
        assert_eq!(config.export.placeholder, "(no chart)");
        assert_eq!(config.export.image_alt, "chart");
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new().with_file("/nonexistent/streamdoc.toml").build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/streamdoc.toml")
            .build()
            .expect("config to build");
        assert!(config.editor.chart_enabled);
    }
}
