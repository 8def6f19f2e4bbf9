#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ResourceSnapshot {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

/// 記錄每個日期處理後的 CPU / 記憶體用量 (`--monitor`)
#[cfg(feature = "cli")]
pub struct ResourceMonitor {
    system: Option<(System, Pid)>,
    started: Instant,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl ResourceMonitor {
    pub fn new(enabled: bool) -> Self {
        let system = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => {
                    let mut system = System::new_with_specifics(RefreshKind::everything());
                    system.refresh_all();
                    Some((system, pid))
                }
                Err(e) => {
                    tracing::warn!("⚠️  Resource monitoring unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            system,
            started: Instant::now(),
            peak_memory_mb: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.system.is_some()
    }

    pub fn snapshot(&mut self) -> Option<ResourceSnapshot> {
        let (system, pid) = self.system.as_mut()?;
        system.refresh_all();
        let process = system.process(*pid)?;

        let memory_mb = process.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);

        Some(ResourceSnapshot {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            peak_memory_mb: self.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn checkpoint(&mut self, label: &str) {
        if let Some(stats) = self.snapshot() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Elapsed: {:?}",
                label,
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn finish(&mut self, partitions: usize) {
        if let Some(stats) = self.snapshot() {
            tracing::info!(
                "📊 Final Stats - {} partition(s) in {:?}, Peak Memory: {}MB",
                partitions,
                stats.elapsed,
                stats.peak_memory_mb
            );
        }
    }
}

// 非 CLI 建置 (lambda) 不帶 sysinfo
#[cfg(not(feature = "cli"))]
pub struct ResourceMonitor;

#[cfg(not(feature = "cli"))]
impl ResourceMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn checkpoint(&mut self, _label: &str) {}

    pub fn finish(&mut self, _partitions: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_is_silent() {
        let mut monitor = ResourceMonitor::new(false);
        assert!(!monitor.is_enabled());
        monitor.checkpoint("2021-01-01");
        monitor.finish(3);
    }
}
