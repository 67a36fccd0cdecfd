//! Environment handler: build, host, tools and variables.

use accelprobe_core::{
    BuildFeatures, DriverCompatibility, EnvHints, EnvironmentReport, HostInfo, ToolVersion,
};
use serde::Serialize;

use crate::bootstrap::CliContext;
use crate::error::CliResult;
use crate::presentation::{OutputFormat, RenderOptions, render_environment, to_json};

#[derive(Serialize)]
struct EnvironmentView<'a> {
    probe_version: &'a str,
    build: &'a BuildFeatures,
    host: &'a HostInfo,
    env: &'a EnvHints,
    tools: &'a [ToolVersion],
    driver_version: Option<&'a str>,
    driver_cuda_version: Option<&'a str>,
    driver_compatibility: &'a DriverCompatibility,
}

impl<'a> From<&'a EnvironmentReport> for EnvironmentView<'a> {
    fn from(report: &'a EnvironmentReport) -> Self {
        Self {
            probe_version: &report.probe_version,
            build: &report.build,
            host: &report.host,
            env: &report.env,
            tools: &report.tools,
            driver_version: report.driver_version.as_deref(),
            driver_cuda_version: report.driver_cuda_version.as_deref(),
            driver_compatibility: &report.driver_compatibility,
        }
    }
}

/// Render the environment sections of the full report.
pub fn execute(ctx: &CliContext, opts: RenderOptions) -> CliResult<String> {
    let report = ctx
        .session
        .collect_environment_without_checks(&ctx.config.probe_version);
    match opts.format {
        OutputFormat::Text => Ok(render_environment(&report, opts.style)),
        OutputFormat::Json => to_json(&EnvironmentView::from(&report)),
    }
}
