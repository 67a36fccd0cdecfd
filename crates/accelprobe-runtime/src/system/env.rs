//! Environment variables that commonly explain a broken CUDA setup.
//!
//! Collected for display only; nothing here changes probe behavior.

use std::env;
use std::ffi::OsString;

use accelprobe_core::EnvHints;

/// Variables reported verbatim, set or not.
pub const HINT_VARIABLES: [&str; 4] = ["CUDA_PATH", "CUDA_HOME", "CUDA_ROOT", "CUDA_VISIBLE_DEVICES"];

/// Variable holding the dynamic library search path on this platform.
#[cfg(target_os = "macos")]
pub const LIBRARY_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
#[cfg(target_os = "windows")]
pub const LIBRARY_PATH_VAR: &str = "PATH";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Read hints from the process environment.
pub fn collect_env_hints() -> EnvHints {
    collect_env_hints_from(|name| env::var_os(name))
}

/// Read hints through `lookup`, so tests never touch the real environment.
pub fn collect_env_hints_from<F>(lookup: F) -> EnvHints
where
    F: Fn(&str) -> Option<OsString>,
{
    let variables = HINT_VARIABLES
        .iter()
        .map(|name| {
            let value = lookup(name).map(|v| v.to_string_lossy().into_owned());
            ((*name).to_string(), value)
        })
        .collect();

    EnvHints {
        variables,
        cuda_path_entries: cuda_entries(lookup("PATH")),
        cuda_library_entries: cuda_entries(lookup(LIBRARY_PATH_VAR)),
    }
}

fn cuda_entries(value: Option<OsString>) -> Vec<String> {
    value
        .map(|paths| {
            env::split_paths(&paths)
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| p.to_ascii_lowercase().contains("cuda"))
                .collect()
        })
        .unwrap_or_default()
}
