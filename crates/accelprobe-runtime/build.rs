//! Build script for accelprobe-runtime.
//!
//! Emits two compile-time environment variables consumed via `env!()`:
//!
//! - `ACCELPROBE_CANDLE_VERSION`: the locked candle-core version
//! - `ACCELPROBE_BUILD_CUDA_VERSION`: the CUDA toolkit release this build was
//!   compiled against (only probed when the `cuda` feature is enabled)
//!
//! Never fails the build: every probe falls back to `"unknown"`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ACCELPROBE_BUILD_CUDA_VERSION");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_default();

    let candle_version = find_workspace_root(Path::new(&manifest_dir))
        .and_then(|root| {
            let lock = root.join("Cargo.lock");
            println!("cargo:rerun-if-changed={}", lock.display());
            fs::read_to_string(lock).ok()
        })
        .and_then(|content| locked_version(&content, "candle-core"))
        .unwrap_or_else(|| UNKNOWN.to_string());
    println!("cargo:rustc-env=ACCELPROBE_CANDLE_VERSION={candle_version}");

    // Packagers can pin the value without a toolkit on the build host.
    let cuda_version = env::var("ACCELPROBE_BUILD_CUDA_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            env::var_os("CARGO_FEATURE_CUDA")
                .is_some()
                .then(nvcc_release)
                .flatten()
        })
        .unwrap_or_else(|| UNKNOWN.to_string());
    println!("cargo:rustc-env=ACCELPROBE_BUILD_CUDA_VERSION={cuda_version}");
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join("Cargo.lock").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Find `version = "..."` right after `name = "<package>"` in a lock file.
fn locked_version(lock: &str, package: &str) -> Option<String> {
    let name_line = format!("name = \"{package}\"");
    let mut lines = lock.lines().map(str::trim);
    while let Some(line) = lines.next() {
        if line == name_line {
            let version_line = lines.next()?;
            let version = version_line
                .strip_prefix("version = \"")?
                .strip_suffix('"')?;
            return Some(version.to_string());
        }
    }
    None
}

fn nvcc_release() -> Option<String> {
    let nvcc = env::var_os("CUDA_HOME")
        .or_else(|| env::var_os("CUDA_PATH"))
        .map(|home| PathBuf::from(home).join("bin").join("nvcc"))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from("nvcc"));

    let output = Command::new(nvcc).arg("--version").output().ok()?;
    if !output.status.success() {
        println!("cargo:warning=accelprobe-runtime: nvcc --version failed");
        return None;
    }

    // "Cuda compilation tools, release 12.4, V12.4.131" -> "12.4"
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().find(|l| l.contains("release"))?;
    let version = line.split("release").nth(1)?.split(',').next()?.trim();
    (!version.is_empty()).then(|| version.to_string())
}
