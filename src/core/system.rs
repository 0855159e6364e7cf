//! Host resource sampling for the metrics summary.
//!
//! Readings are best-effort: anything the host cannot report comes back
//! as [`Utilization::Unavailable`] rather than an error, and serializes
//! as zero so the presentation layer never has to special-case it.

use serde::{Serialize, Serializer};
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

/// A single utilization reading.
///
/// `Unavailable` is distinct from `Percent(0.0)` so callers can tell
/// "no GPU on this host" apart from "GPU idle".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Utilization {
    /// Measured utilization in percent
    Percent(f32),

    /// The host could not report this reading
    Unavailable,
}

impl Utilization {
    /// Reading as a percentage, zero when unavailable
    pub fn as_percent(&self) -> f32 {
        match self {
            Self::Percent(value) => *value,
            Self::Unavailable => 0.0,
        }
    }

    /// Check if the reading was actually measured
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

impl Serialize for Utilization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.as_percent())
    }
}

/// Point-in-time host utilization snapshot
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SystemSample {
    /// CPU utilization across all cores
    pub cpu_percent: Utilization,

    /// Physical memory utilization
    pub memory_percent: Utilization,

    /// GPU utilization
    pub gpu_percent: Utilization,

    /// GPU memory utilization
    pub gpu_memory_percent: Utilization,
}

impl SystemSample {
    /// A sample with every reading unavailable
    pub fn unavailable() -> Self {
        Self {
            cpu_percent: Utilization::Unavailable,
            memory_percent: Utilization::Unavailable,
            gpu_percent: Utilization::Unavailable,
            gpu_memory_percent: Utilization::Unavailable,
        }
    }
}

/// Samples host CPU and memory utilization on demand.
///
/// Keeps the `sysinfo` state between samples; CPU usage is computed
/// from the delta between two refreshes.
pub struct ResourceMonitor {
    system: System,
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceMonitor {
    /// Create a monitor with no pre-loaded state
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Take a point-in-time sample of host utilization.
    ///
    /// Blocks briefly (the minimum CPU update interval) so the CPU
    /// reading reflects current load rather than the previous call.
    pub fn sample(&mut self) -> SystemSample {
        SystemSample {
            cpu_percent: self.sample_cpu(),
            memory_percent: self.sample_memory(),
            // No GPU probe on this backend; hosts without one report zero
            // in the summary either way.
            gpu_percent: Utilization::Unavailable,
            gpu_memory_percent: Utilization::Unavailable,
        }
    }

    fn sample_cpu(&mut self) -> Utilization {
        self.system.refresh_cpu_usage();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu_usage();

        if self.system.cpus().is_empty() {
            return Utilization::Unavailable;
        }

        let usage = self.system.global_cpu_usage();
        if usage.is_finite() {
            Utilization::Percent(usage)
        } else {
            Utilization::Unavailable
        }
    }

    fn sample_memory(&mut self) -> Utilization {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Utilization::Unavailable;
        }

        let used = self.system.used_memory();
        Utilization::Percent(used as f32 / total as f32 * 100.0)
    }
}
