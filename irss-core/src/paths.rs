use std::path::PathBuf;

const APP_DIR: &str = "irss";

/// `<config dir>/irss`, e.g. `~/.config/irss` on Linux.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// Default macro folder.
///
/// Fallback chain:
/// 1. `IRSS_MACRO_DIR` env var (runtime override)
/// 2. `<data dir>/irss/Macro`
/// 3. `./Macro` relative to CWD
pub fn default_macro_folder() -> PathBuf {
    if let Some(dir) = std::env::var_os("IRSS_MACRO_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR).join("Macro"))
        .unwrap_or_else(|| PathBuf::from("Macro"))
}

pub fn default_mappings_file() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("MultiMapping.xml")
}

/// Log file written by the `irss` binary.
pub fn log_file() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("irss.log")
}
