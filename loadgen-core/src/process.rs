//! Process-level memory sampling
//!
//! The figure reported here is the resident set size of the whole process at
//! the moment of sampling. It is informational only and says nothing precise
//! about the allocations of any single request.

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Resident memory of the current process in bytes, or 0 if unavailable.
pub fn resident_memory_bytes() -> u64 {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(e) => {
            tracing::debug!("Unable to resolve current pid: {}", e);
            return 0;
        }
    };

    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::nothing().with_memory(),
    );

    system.process(pid).map(|p| p.memory()).unwrap_or(0)
}

/// Resident memory of the current process in megabytes.
pub fn resident_memory_mb() -> f64 {
    resident_memory_bytes() as f64 / BYTES_PER_MB
}
