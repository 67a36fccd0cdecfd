//! NVIDIA driver and toolkit detection via `nvidia-smi` and `nvcc`.
//!
//! These are the only two external tools the probe ever runs. Their output
//! is parsed by pure functions so the parsing can be tested without a GPU.

use accelprobe_core::{ComputeCapability, DeviceInfo, ToolVersion};
use tracing::{debug, warn};

use super::commands::{ToolRunner, tool_version};

pub const NVIDIA_SMI: &str = "nvidia-smi";
pub const NVCC: &str = "nvcc";

const MIB: u64 = 1024 * 1024;

const QUERY_WITH_CAPABILITY: &str =
    "--query-gpu=index,name,memory.total,memory.used,memory.free,compute_cap";
// Drivers older than R510 reject the compute_cap field.
const QUERY_WITHOUT_CAPABILITY: &str =
    "--query-gpu=index,name,memory.total,memory.used,memory.free";
const QUERY_FORMAT: &str = "--format=csv,noheader,nounits";

/// Driver facts from the `nvidia-smi` banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmiBanner {
    pub driver_version: Option<String>,
    /// Highest CUDA version the driver supports.
    pub cuda_version: Option<String>,
}

/// One row of the `nvidia-smi --query-gpu` table. Memory is in MiB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuRow {
    pub index: usize,
    pub name: String,
    pub total_mib: Option<u64>,
    pub used_mib: Option<u64>,
    pub free_mib: Option<u64>,
    pub compute_capability: Option<ComputeCapability>,
}

impl GpuRow {
    /// Convert to a [`DeviceInfo`] at `index`.
    ///
    /// Used memory is reported as allocated; everything that is not free
    /// (used plus driver-reserved) is reported as reserved.
    pub fn to_device_info(&self, index: usize) -> DeviceInfo {
        let total = self.total_mib.unwrap_or(0).saturating_mul(MIB);
        let allocated = self.used_mib.unwrap_or(0).saturating_mul(MIB);
        let reserved = self
            .free_mib
            .map_or(allocated, |free| total.saturating_sub(free.saturating_mul(MIB)));

        DeviceInfo::new(index, self.name.clone(), total)
            .with_compute_capability(self.compute_capability)
            .with_memory_usage(allocated, reserved.max(allocated))
    }
}

/// Everything learned from the NVIDIA tools in one pass.
#[derive(Debug, Clone)]
pub struct GpuToolReport {
    pub nvidia_smi: ToolVersion,
    pub nvcc: ToolVersion,
    pub banner: SmiBanner,
    /// `None` when `nvidia-smi` could not list devices.
    pub devices: Option<Vec<GpuRow>>,
}

impl GpuToolReport {
    pub fn tools(&self) -> Vec<ToolVersion> {
        vec![self.nvidia_smi.clone(), self.nvcc.clone()]
    }
}

/// Program names used for the NVIDIA tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuToolNames<'a> {
    pub nvidia_smi: &'a str,
    pub nvcc: &'a str,
}

impl GpuToolNames<'static> {
    /// The tools as found on `PATH`.
    pub const DEFAULT: Self = Self {
        nvidia_smi: NVIDIA_SMI,
        nvcc: NVCC,
    };
}

/// Query `nvidia-smi` (banner and device table) and `nvcc`.
///
/// Never fails: a missing or hung tool is recorded in the returned report.
pub async fn query_gpu_tools(runner: &ToolRunner) -> GpuToolReport {
    query_gpu_tools_named(runner, GpuToolNames::DEFAULT).await
}

/// [`query_gpu_tools`] with explicit program names.
pub async fn query_gpu_tools_named(runner: &ToolRunner, names: GpuToolNames<'_>) -> GpuToolReport {
    let banner_output = runner.capture(names.nvidia_smi, &[]).await;
    let banner = banner_output
        .as_ref()
        .map(|text| parse_smi_banner(text))
        .unwrap_or_default();
    let nvidia_smi = tool_version(names.nvidia_smi, &banner_output, |text| {
        parse_smi_banner(text).driver_version
    });

    // Skip the table query when the tool is plainly not usable.
    let devices = if banner_output.is_ok() {
        query_device_table(runner, names.nvidia_smi).await
    } else {
        None
    };

    let nvcc_output = runner.capture(names.nvcc, &["--version"]).await;
    let nvcc = tool_version(names.nvcc, &nvcc_output, parse_nvcc_release);

    debug!(
        driver = nvidia_smi.version_or_unknown(),
        nvcc = nvcc.version_or_unknown(),
        devices = devices.as_ref().map(Vec::len),
        "Queried NVIDIA tools"
    );

    GpuToolReport {
        nvidia_smi,
        nvcc,
        banner,
        devices,
    }
}

async fn query_device_table(runner: &ToolRunner, program: &str) -> Option<Vec<GpuRow>> {
    match runner
        .capture(program, &[QUERY_WITH_CAPABILITY, QUERY_FORMAT])
        .await
    {
        Ok(text) => return Some(parse_gpu_query(&text, true)),
        Err(e) => debug!(error = %e, "GPU query with compute_cap failed, retrying without"),
    }

    match runner
        .capture(program, &[QUERY_WITHOUT_CAPABILITY, QUERY_FORMAT])
        .await
    {
        Ok(text) => Some(parse_gpu_query(&text, false)),
        Err(e) => {
            warn!(error = %e, "nvidia-smi could not list GPUs");
            None
        }
    }
}

/// Extract driver and CUDA versions from the `nvidia-smi` banner.
///
/// The banner line looks like
/// `| NVIDIA-SMI 550.54.14   Driver Version: 550.54.14   CUDA Version: 12.4 |`.
pub fn parse_smi_banner(text: &str) -> SmiBanner {
    SmiBanner {
        driver_version: value_after(text, "Driver Version:"),
        cuda_version: value_after(text, "CUDA Version:"),
    }
}

fn value_after(text: &str, marker: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let rest = line.split(marker).nth(1)?;
        let value = rest.split_whitespace().next()?.trim_end_matches('|');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Extract the release from `nvcc --version` output.
pub fn parse_nvcc_release(text: &str) -> Option<String> {
    // "Cuda compilation tools, release 12.4, V12.4.131" -> "12.4"
    let line = text.lines().find(|l| l.contains("release"))?;
    let version = line.split("release").nth(1)?;
    let version = version.trim().split(',').next().unwrap_or("").trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// Parse `nvidia-smi --query-gpu ... --format=csv,noheader,nounits` output.
///
/// Malformed lines are skipped. Names may contain commas, so the name is
/// everything between the index and the trailing numeric columns.
pub fn parse_gpu_query(text: &str, with_capability: bool) -> Vec<GpuRow> {
    let trailing = if with_capability { 4 } else { 3 };

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < trailing + 2 {
                debug!(line, "Skipping short nvidia-smi row");
                return None;
            }
            let index = fields[0].parse().ok()?;
            let tail = &fields[fields.len() - trailing..];
            let name = fields[1..fields.len() - trailing].join(", ");

            Some(GpuRow {
                index,
                name,
                total_mib: tail[0].parse().ok(),
                used_mib: tail[1].parse().ok(),
                free_mib: tail[2].parse().ok(),
                compute_capability: if with_capability {
                    ComputeCapability::parse(tail[3])
                } else {
                    None
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use accelprobe_core::ToolStatus;

    const BANNER: &str = "\
Tue Mar 12 10:00:00 2024
+-----------------------------------------------------------------------------------------+
| NVIDIA-SMI 550.54.14              Driver Version: 550.54.14      CUDA Version: 12.4     |
|-----------------------------------------+------------------------+----------------------+
";

    #[test]
    fn test_parse_smi_banner() {
        let banner = parse_smi_banner(BANNER);
        assert_eq!(banner.driver_version.as_deref(), Some("550.54.14"));
        assert_eq!(banner.cuda_version.as_deref(), Some("12.4"));
    }

    #[test]
    fn test_parse_smi_banner_without_versions() {
        assert_eq!(parse_smi_banner("No devices were found"), SmiBanner::default());
    }

    #[test]
    fn test_parse_nvcc_release() {
        let text = "\
nvcc: NVIDIA (R) Cuda compiler driver
Copyright (c) 2005-2024 NVIDIA Corporation
Built on Thu_Mar_28_02:18:24_PDT_2024
Cuda compilation tools, release 12.4, V12.4.131
Build cuda_12.4.r12.4/compiler.34097967_0
";
        assert_eq!(parse_nvcc_release(text).as_deref(), Some("12.4"));
        assert_eq!(parse_nvcc_release("nvcc: command not found"), None);
    }

    #[test]
    fn test_parse_gpu_query_with_capability() {
        let text = "\
0, NVIDIA GeForce RTX 4090, 24564, 1032, 23124, 8.9
1, NVIDIA A100-SXM4-80GB, 81920, 0, 81050, 8.0
";
        let rows = parse_gpu_query(text, true);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "NVIDIA GeForce RTX 4090");
        assert_eq!(rows[0].total_mib, Some(24564));
        assert_eq!(
            rows[0].compute_capability,
            Some(ComputeCapability::new(8, 9))
        );
        assert_eq!(rows[1].index, 1);
        assert_eq!(rows[1].free_mib, Some(81050));
    }

    #[test]
    fn test_parse_gpu_query_name_with_comma_and_na_fields() {
        let text = "0, Tesla, Custom Edition, [N/A], [N/A], [N/A], [N/A]\ngarbage\n";
        let rows = parse_gpu_query(text, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Tesla, Custom Edition");
        assert_eq!(rows[0].total_mib, None);
        assert_eq!(rows[0].compute_capability, None);
    }

    #[test]
    fn test_parse_gpu_query_without_capability() {
        let rows = parse_gpu_query("0, Quadro P4000, 8192, 100, 8000\n", false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Quadro P4000");
        assert_eq!(rows[0].compute_capability, None);
    }

    #[test]
    fn test_row_to_device_info_keeps_memory_ordering() {
        let row = GpuRow {
            index: 0,
            name: "X".to_string(),
            total_mib: Some(8192),
            used_mib: Some(1024),
            free_mib: Some(6144),
            compute_capability: Some(ComputeCapability::new(7, 5)),
        };
        let info = row.to_device_info(0);
        assert_eq!(info.name, "X");
        assert_eq!(info.total_memory_bytes, 8 * 1024 * 1024 * 1024);
        assert_eq!(info.allocated_bytes, 1024 * MIB);
        assert_eq!(info.reserved_bytes, 2048 * MIB);
        assert!(info.allocated_bytes <= info.reserved_bytes);
        assert!(info.reserved_bytes <= info.total_memory_bytes);
    }

    #[test]
    fn test_garbage_memory_figures_saturate() {
        let row = GpuRow {
            index: 0,
            name: "X".to_string(),
            total_mib: Some(u64::MAX),
            used_mib: Some(u64::MAX / 2),
            free_mib: Some(u64::MAX),
            compute_capability: None,
        };
        let info = row.to_device_info(0);
        assert_eq!(info.total_memory_bytes, u64::MAX);
        assert_eq!(info.allocated_bytes, u64::MAX);
        assert!(info.reserved_bytes <= info.total_memory_bytes);
    }

    #[tokio::test]
    async fn test_missing_tools_are_reported_as_unknown() {
        let runner = ToolRunner::new(std::time::Duration::from_secs(5));
        let names = GpuToolNames {
            nvidia_smi: "accelprobe-no-such-smi",
            nvcc: "accelprobe-no-such-nvcc",
        };
        let report = query_gpu_tools_named(&runner, names).await;

        assert_eq!(report.nvidia_smi.status, ToolStatus::Missing);
        assert_eq!(report.nvcc.status, ToolStatus::Missing);
        assert_eq!(report.nvidia_smi.version_or_unknown(), "unknown");
        assert_eq!(report.nvcc.version_or_unknown(), "unknown");
        assert_eq!(report.devices, None);
        assert_eq!(report.banner, SmiBanner::default());
    }

    #[test]
    fn test_row_with_unknown_memory() {
        let row = GpuRow {
            index: 0,
            name: "Orin".to_string(),
            total_mib: None,
            used_mib: None,
            free_mib: None,
            compute_capability: None,
        };
        let info = row.to_device_info(0);
        assert!(info.memory_unknown());
        assert_eq!(info.reserved_bytes, 0);
    }
}
