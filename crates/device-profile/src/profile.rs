// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device capability snapshots.
//!
//! A [`DeviceProfile`] is captured once per device and never changes. The
//! host profile comes from CPU introspection and degrades to defaults; an
//! accelerator profile comes from capability queries and fails on the first
//! unreadable field.

use crate::cpuinfo::CpuInfo;
use crate::DeviceQueryError;
use std::fmt;

/// Device type code reported for CPU-class accelerators.
pub const DEVICE_TYPE_CPU: u64 = 1 << 1;
/// Device type code reported for GPU-class accelerators.
pub const DEVICE_TYPE_GPU: u64 = 1 << 2;

/// Default local memory assumed for a host whose cache size is unknown.
pub const DEFAULT_HOST_LOCAL_MEMORY: u64 = 32 * 1024;

/// Identifier used when the host CPU model cannot be determined.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Where a profile's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Host,
    Accelerator,
}

/// Broad hardware class of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Cpu,
    Gpu,
    #[default]
    Other,
}

impl DeviceClass {
    /// Maps a backend device type code to a class.
    pub fn from_type_code(code: u64) -> Self {
        if code & DEVICE_TYPE_GPU != 0 {
            DeviceClass::Gpu
        } else if code & DEVICE_TYPE_CPU != 0 {
            DeviceClass::Cpu
        } else {
            DeviceClass::Other
        }
    }

    /// Backend type code for this class.
    pub fn type_code(self) -> u64 {
        match self {
            DeviceClass::Cpu => DEVICE_TYPE_CPU,
            DeviceClass::Gpu => DEVICE_TYPE_GPU,
            DeviceClass::Other => 1,
        }
    }
}

/// A capability a backend can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    DeviceType,
    ComputeUnits,
    MaxItemsPerUnit,
    ClockMhz,
    GlobalMemory,
    LocalMemory,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::DeviceType,
        Capability::ComputeUnits,
        Capability::MaxItemsPerUnit,
        Capability::ClockMhz,
        Capability::GlobalMemory,
        Capability::LocalMemory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::DeviceType => "device type",
            Capability::ComputeUnits => "compute unit count",
            Capability::MaxItemsPerUnit => "max items per compute unit",
            Capability::ClockMhz => "clock frequency",
            Capability::GlobalMemory => "global memory size",
            Capability::LocalMemory => "local memory size",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable capability snapshot of one compute device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProfile {
    /// Human-readable name; benchmark records are keyed by it.
    pub identifier: String,
    pub device_kind: DeviceKind,
    #[serde(default)]
    pub device_class: DeviceClass,
    pub compute_unit_count: u64,
    /// Largest work-group a compute unit accepts.
    pub max_items_per_unit: u64,
    pub clock_mhz: u64,
    /// `u64::MAX` means unbounded (the host).
    pub global_memory_bytes: u64,
    pub local_memory_bytes: u64,
}

impl DeviceProfile {
    /// Sentinel global memory of the host.
    pub const UNBOUNDED_MEMORY: u64 = u64::MAX;

    /// Captures the host profile from `/proc/cpuinfo`.
    ///
    /// Never fails: unreadable fields fall back to defaults and a warning
    /// is logged.
    pub fn host() -> Self {
        let info = CpuInfo::read().unwrap_or_else(|e| {
            tracing::warn!("host CPU introspection failed, using defaults: {e}");
            CpuInfo::default()
        });
        Self::host_from(&info)
    }

    /// Builds a host profile from already-parsed CPU information.
    pub fn host_from(info: &CpuInfo) -> Self {
        let compute_unit_count = info.siblings.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get() as u64)
                .unwrap_or(1)
        });

        Self {
            identifier: info
                .model_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_IDENTIFIER.to_string()),
            device_kind: DeviceKind::Host,
            device_class: DeviceClass::Cpu,
            compute_unit_count,
            max_items_per_unit: 1,
            clock_mhz: info.clock_mhz.unwrap_or(0),
            global_memory_bytes: Self::UNBOUNDED_MEMORY,
            local_memory_bytes: info.cache_bytes.unwrap_or(DEFAULT_HOST_LOCAL_MEMORY),
        }
    }

    /// Captures an accelerator profile by querying every [`Capability`].
    ///
    /// The first failed query aborts with a [`DeviceQueryError`] naming the
    /// device and the capability.
    pub fn from_capabilities<F, E>(identifier: impl Into<String>, mut query: F) -> Result<Self, DeviceQueryError>
    where
        F: FnMut(Capability) -> Result<u64, E>,
        E: fmt::Display,
    {
        let identifier = identifier.into();
        let mut read = |capability: Capability| {
            query(capability).map_err(|e| DeviceQueryError {
                device: identifier.clone(),
                capability,
                detail: e.to_string(),
            })
        };

        let device_class = DeviceClass::from_type_code(read(Capability::DeviceType)?);
        let compute_unit_count = read(Capability::ComputeUnits)?;
        let max_items_per_unit = read(Capability::MaxItemsPerUnit)?;
        let clock_mhz = read(Capability::ClockMhz)?;
        let global_memory_bytes = read(Capability::GlobalMemory)?;
        let local_memory_bytes = read(Capability::LocalMemory)?;

        Ok(Self {
            identifier,
            device_kind: DeviceKind::Accelerator,
            device_class,
            compute_unit_count,
            max_items_per_unit,
            clock_mhz,
            global_memory_bytes,
            local_memory_bytes,
        })
    }

    /// Builds an accelerator profile from known numbers.
    pub fn accelerator(
        identifier: impl Into<String>,
        compute_unit_count: u64,
        max_items_per_unit: u64,
        clock_mhz: u64,
        global_memory_bytes: u64,
        local_memory_bytes: u64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            device_kind: DeviceKind::Accelerator,
            device_class: DeviceClass::Gpu,
            compute_unit_count,
            max_items_per_unit,
            clock_mhz,
            global_memory_bytes,
            local_memory_bytes,
        }
    }

    /// Returns the value this profile reports for `capability`.
    pub fn capability(&self, capability: Capability) -> u64 {
        match capability {
            Capability::DeviceType => self.device_class.type_code(),
            Capability::ComputeUnits => self.compute_unit_count,
            Capability::MaxItemsPerUnit => self.max_items_per_unit,
            Capability::ClockMhz => self.clock_mhz,
            Capability::GlobalMemory => self.global_memory_bytes,
            Capability::LocalMemory => self.local_memory_bytes,
        }
    }

    pub fn is_host(&self) -> bool {
        self.device_kind == DeviceKind::Host
    }

    pub fn has_unbounded_memory(&self) -> bool {
        self.global_memory_bytes == Self::UNBOUNDED_MEMORY
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        let memory = if self.has_unbounded_memory() {
            "unbounded".to_string()
        } else {
            format!("{} MB", self.global_memory_bytes / (1024 * 1024))
        };
        format!(
            "{} [{:?}]: {} units x {} items @ {} MHz, global {}, local {} KB",
            self.identifier,
            self.device_kind,
            self.compute_unit_count,
            self.max_items_per_unit,
            self.clock_mhz,
            memory,
            self.local_memory_bytes / 1024,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gtx560() -> DeviceProfile {
        DeviceProfile::accelerator("GeForce GTX 560", 7, 1024, 1620, 1 << 30, 48 * 1024)
    }

    #[test]
    fn test_host_defaults_when_info_missing() {
        let p = DeviceProfile::host_from(&CpuInfo::default());
        assert!(p.is_host());
        assert_eq!(p.identifier, UNKNOWN_IDENTIFIER);
        assert_eq!(p.max_items_per_unit, 1);
        assert_eq!(p.clock_mhz, 0);
        assert_eq!(p.local_memory_bytes, DEFAULT_HOST_LOCAL_MEMORY);
        assert!(p.compute_unit_count >= 1);
        assert!(p.has_unbounded_memory());
    }

    #[test]
    fn test_host_capture_never_fails() {
        let p = DeviceProfile::host();
        assert_eq!(p.device_kind, DeviceKind::Host);
        assert_eq!(p.global_memory_bytes, DeviceProfile::UNBOUNDED_MEMORY);
    }

    #[test]
    fn test_from_capabilities_roundtrip() {
        let expected = gtx560();
        let p = DeviceProfile::from_capabilities("GeForce GTX 560", |c| {
            Ok::<_, String>(expected.capability(c))
        })
        .unwrap();
        assert_eq!(p, expected);
    }

    #[test]
    fn test_from_capabilities_names_failed_field() {
        let err = DeviceProfile::from_capabilities("flaky", |c| match c {
            Capability::LocalMemory => Err("status -30"),
            _ => Ok(1),
        })
        .unwrap_err();
        assert_eq!(err.device, "flaky");
        assert_eq!(err.capability, Capability::LocalMemory);
        assert!(err.to_string().contains("local memory size"));
    }

    #[test]
    fn test_device_class_codes() {
        assert_eq!(DeviceClass::from_type_code(DEVICE_TYPE_GPU), DeviceClass::Gpu);
        assert_eq!(DeviceClass::from_type_code(DEVICE_TYPE_CPU), DeviceClass::Cpu);
        assert_eq!(DeviceClass::from_type_code(0), DeviceClass::Other);
    }

    #[test]
    fn test_summary_and_serde() {
        let p = gtx560();
        assert!(p.summary().contains("GeForce GTX 560"));
        assert!(p.summary().contains("1024 MB"));
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"device_kind\":\"accelerator\""));
        let back: DeviceProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
