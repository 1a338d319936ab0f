use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::paths;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

pub(crate) const DEFAULT_MAX_STEPS: usize = 10_000;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    macros: MacrosConfig,
    #[serde(default)]
    processor: ProcessorConfig,
    #[serde(default)]
    mappings: MappingsConfig,
    #[serde(default)]
    girder: GirderConfig,
}

#[derive(Deserialize, Default)]
struct MacrosConfig {
    folder: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
struct ProcessorConfig {
    max_steps: Option<usize>,
    skip_unsupported: Option<bool>,
}

#[derive(Deserialize, Default)]
struct MappingsConfig {
    file: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
struct GirderConfig {
    plugin: Option<PathBuf>,
}

pub struct Config {
    macros: MacrosConfig,
    processor: ProcessorConfig,
    mappings: MappingsConfig,
    girder: GirderConfig,
}

impl Config {
    /// Embedded defaults overlaid with `<config dir>/irss/config.toml`.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults overlaid with the file at `user`, if it exists.
    ///
    /// An unreadable or malformed user file is logged and ignored.
    pub fn load_from(user: Option<&Path>) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => merge(&mut base, user),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            macros: base.macros,
            processor: base.processor,
            mappings: base.mappings,
            girder: base.girder,
        }
    }

    pub fn macro_folder(&self) -> PathBuf {
        self.macros
            .folder
            .clone()
            .unwrap_or_else(paths::default_macro_folder)
    }

    /// Step ceiling for one macro run; 0 disables the limit.
    pub fn max_steps(&self) -> usize {
        self.processor.max_steps.unwrap_or(DEFAULT_MAX_STEPS)
    }

    pub fn skip_unsupported(&self) -> bool {
        self.processor.skip_unsupported.unwrap_or(false)
    }

    pub fn mappings_file(&self) -> PathBuf {
        self.mappings
            .file
            .clone()
            .unwrap_or_else(paths::default_mappings_file)
    }

    pub fn girder_plugin(&self) -> Option<&Path> {
        self.girder.plugin.as_deref()
    }
}

fn user_config_path() -> Option<PathBuf> {
    paths::config_dir().map(|d| d.join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.macros.folder.is_some() {
        base.macros.folder = user.macros.folder;
    }
    if user.processor.max_steps.is_some() {
        base.processor.max_steps = user.processor.max_steps;
    }
    if user.processor.skip_unsupported.is_some() {
        base.processor.skip_unsupported = user.processor.skip_unsupported;
    }
    if user.mappings.file.is_some() {
        base.mappings.file = user.mappings.file;
    }
    if user.girder.plugin.is_some() {
        base.girder.plugin = user.girder.plugin;
    }
}
