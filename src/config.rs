use std::env::consts::ARCH;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const DEFAULT_OS: &str = "linux";

const DOTENV_FILE: &str = ".env";

/// Load `.env` from the working directory into the process environment.
pub fn load_dotenv() -> Result<Option<PathBuf>, AppError> {
    load_dotenv_from(Path::new(DOTENV_FILE))
}

/// Load an env file into the process environment.
///
/// Returns the path of the loaded file, or `None` when it does not exist.
/// Variables already set in the environment are left alone.
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>, AppError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(AppError::ConfigLoad(e)),
    }
}

/// Keys the original tool read, paired with the variables clap reads now.
const LEGACY_KEYS: [(&str, &str); 3] = [
    ("arch", "LDI_ARCH"),
    ("os", "LDI_OS"),
    ("tag", "LDI_TAG"),
];

/// Values for `LDI_*` variables taken from the old `arch`, `os` and `tag` keys.
///
/// A set `LDI_*` variable always wins. `os` is skipped on Windows, where the
/// environment is case-insensitive and `OS` names the platform.
pub fn legacy_env_fallbacks<F>(lookup: F) -> Vec<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    LEGACY_KEYS
        .iter()
        .filter(|(legacy, _)| !(cfg!(windows) && *legacy == "os"))
        .filter(|(_, key)| lookup(key).is_none())
        .filter_map(|(legacy, key)| lookup(legacy).map(|value| (*key, value)))
        .collect()
}

/// Copy the old lowercase keys into their `LDI_*` names.
pub fn apply_legacy_env() {
    for (key, value) in legacy_env_fallbacks(|name| std::env::var(name).ok()) {
        std::env::set_var(key, value);
    }
}

/// Architecture of this host, spelled the way registries name platforms.
pub fn host_architecture() -> &'static str {
    registry_architecture(ARCH)
}

fn registry_architecture(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        "mips64" if cfg!(target_endian = "little") => "mips64le",
        "loongarch64" => "loong64",
        other => other,
    }
}
