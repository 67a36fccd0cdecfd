//! Host, build, tool and environment facts that surround a [`DeviceReport`].

use serde::Serialize;

use super::device::DeviceReport;

/// Text shown wherever a value could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Outcome of asking an external tool for its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolStatus {
    /// Tool ran and reported a version.
    Found { version: String },
    /// Tool is not installed or not on the search path.
    Missing,
    /// Tool did not answer within the configured timeout.
    TimedOut,
    /// Tool ran but exited unsuccessfully or printed nothing useful.
    Failed { reason: String },
}

/// Version report for one external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolVersion {
    pub tool: String,
    #[serde(flatten)]
    pub status: ToolStatus,
}

impl ToolVersion {
    pub fn new(tool: impl Into<String>, status: ToolStatus) -> Self {
        Self {
            tool: tool.into(),
            status,
        }
    }

    pub fn found(tool: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(
            tool,
            ToolStatus::Found {
                version: version.into(),
            },
        )
    }

    pub fn version(&self) -> Option<&str> {
        match &self.status {
            ToolStatus::Found { version } => Some(version),
            _ => None,
        }
    }

    /// The version, or `"unknown"` for every other status.
    pub fn version_or_unknown(&self) -> &str {
        self.version().unwrap_or(UNKNOWN)
    }
}

/// Result of comparing the driver's CUDA support with the runtime build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriverCompatibility {
    /// Driver supports at least the CUDA version the runtime was built with.
    Compatible,
    /// Driver is older than the CUDA version the runtime was built with.
    DriverTooOld { driver: String, runtime: String },
    /// One of the two versions is missing or unparseable.
    Unknown,
}

/// Informational environment variables. None of them change behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvHints {
    /// `(name, value)` for each inspected variable; `None` when unset.
    pub variables: Vec<(String, Option<String>)>,
    /// `PATH` entries that mention CUDA.
    pub cuda_path_entries: Vec<String>,
    /// Library search path entries that mention CUDA.
    pub cuda_library_entries: Vec<String>,
}

impl EnvHints {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }
}

/// Facts about the host machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub os: String,
    pub arch: String,
    pub os_version: Option<String>,
    pub cpu_count: usize,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
    pub executable: Option<String>,
}

/// Compile-time capabilities of the runtime build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildFeatures {
    pub avx: bool,
    pub neon: bool,
    pub simd128: bool,
    pub f16c: bool,
    pub mkl: bool,
    pub accelerate: bool,
    pub cuda: bool,
    pub cudnn: bool,
    pub metal: bool,
    pub num_threads: usize,
}

impl BuildFeatures {
    /// Names of the enabled boolean features, in declaration order.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("avx", self.avx),
            ("neon", self.neon),
            ("simd128", self.simd128),
            ("f16c", self.f16c),
            ("mkl", self.mkl),
            ("accelerate", self.accelerate),
            ("cuda", self.cuda),
            ("cudnn", self.cudnn),
            ("metal", self.metal),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

/// Timing of one square matmul size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchSample {
    pub size: usize,
    pub cpu_secs: Option<f64>,
    pub accelerator_secs: Option<f64>,
    /// Set when this size could not be measured; other sizes still run.
    pub error: Option<String>,
}

impl BenchSample {
    /// CPU time divided by accelerator time, when both are known.
    pub fn speedup(&self) -> Option<f64> {
        match (self.cpu_secs, self.accelerator_secs) {
            (Some(cpu), Some(accel)) if accel > 0.0 => Some(cpu / accel),
            _ => None,
        }
    }
}

/// Everything one invocation of the probe learned.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReport {
    pub probe_version: String,
    pub device: DeviceReport,
    pub build: BuildFeatures,
    pub host: HostInfo,
    pub env: EnvHints,
    pub tools: Vec<ToolVersion>,
    /// Highest CUDA version the installed driver supports.
    pub driver_cuda_version: Option<String>,
    pub driver_version: Option<String>,
    pub driver_compatibility: DriverCompatibility,
}

impl EnvironmentReport {
    pub fn tool(&self, name: &str) -> Option<&ToolVersion> {
        self.tools.iter().find(|t| t.tool == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_or_unknown() {
        assert_eq!(
            ToolVersion::found("nvcc", "12.4").version_or_unknown(),
            "12.4"
        );
        for status in [
            ToolStatus::Missing,
            ToolStatus::TimedOut,
            ToolStatus::Failed {
                reason: "exit status 9".to_string(),
            },
        ] {
            assert_eq!(
                ToolVersion::new("nvcc", status).version_or_unknown(),
                UNKNOWN
            );
        }
    }

    #[test]
    fn test_speedup() {
        let sample = BenchSample {
            size: 1000,
            cpu_secs: Some(2.0),
            accelerator_secs: Some(0.5),
            error: None,
        };
        assert_eq!(sample.speedup(), Some(4.0));

        let cpu_only = BenchSample {
            accelerator_secs: None,
            ..sample
        };
        assert_eq!(cpu_only.speedup(), None);
    }

    #[test]
    fn test_enabled_features() {
        let build = BuildFeatures {
            avx: true,
            cuda: true,
            num_threads: 8,
            ..BuildFeatures::default()
        };
        assert_eq!(build.enabled(), vec!["avx", "cuda"]);
    }

    #[test]
    fn test_env_hints_lookup() {
        let hints = EnvHints {
            variables: vec![
                ("CUDA_HOME".to_string(), Some("/usr/local/cuda".to_string())),
                ("CUDA_PATH".to_string(), None),
            ],
            ..EnvHints::default()
        };
        assert_eq!(hints.get("CUDA_HOME"), Some("/usr/local/cuda"));
        assert_eq!(hints.get("CUDA_PATH"), None);
        assert_eq!(hints.get("CUDA_ROOT"), None);
    }
}
