//! Host machine facts via sysinfo.

use std::env;

use accelprobe_core::HostInfo;
use sysinfo::System;

/// Snapshot OS, CPU and RAM facts for the current host.
pub fn host_info() -> HostInfo {
    let mut sys = System::new();
    sys.refresh_memory();

    HostInfo {
        os: env::consts::OS.to_string(),
        arch: env::consts::ARCH.to_string(),
        os_version: System::long_os_version(),
        cpu_count: num_cpus::get(),
        total_memory_bytes: sys.total_memory(),
        available_memory_bytes: sys.available_memory(),
        executable: env::current_exe()
            .ok()
            .map(|path| path.display().to_string()),
    }
}
