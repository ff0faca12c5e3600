// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Regression features.
//!
//! A prediction is linear in twelve features derived from the device
//! profile and the problem size. Feature names are the keys used in the
//! corpus JSON.

use device_profile::DeviceProfile;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Constant,
    ComputeUnits,
    ComputeUnitsSquared,
    ItemsPerComputeUnit,
    ItemsPerComputeUnitSquared,
    ClockFrequency,
    GlobalMemory,
    GlobalMemorySquared,
    LocalMemory,
    LocalMemorySquared,
    Size,
    SizeSquared,
}

impl Feature {
    pub const COUNT: usize = 12;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Constant,
        Feature::ComputeUnits,
        Feature::ComputeUnitsSquared,
        Feature::ItemsPerComputeUnit,
        Feature::ItemsPerComputeUnitSquared,
        Feature::ClockFrequency,
        Feature::GlobalMemory,
        Feature::GlobalMemorySquared,
        Feature::LocalMemory,
        Feature::LocalMemorySquared,
        Feature::Size,
        Feature::SizeSquared,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Constant => "constant",
            Feature::ComputeUnits => "compute_units",
            Feature::ComputeUnitsSquared => "compute_units^2",
            Feature::ItemsPerComputeUnit => "items_per_compute_unit",
            Feature::ItemsPerComputeUnitSquared => "items_per_compute_unit^2",
            Feature::ClockFrequency => "clock_frequency",
            Feature::GlobalMemory => "global_memory",
            Feature::GlobalMemorySquared => "global_memory^2",
            Feature::LocalMemory => "local_memory",
            Feature::LocalMemorySquared => "local_memory^2",
            Feature::Size => "size",
            Feature::SizeSquared => "size^2",
        }
    }

    /// Position in [`Feature::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Value of this feature for `profile` at `size`.
    pub fn value(self, profile: &DeviceProfile, size: u64) -> f64 {
        let square = |v: u64| (v as f64) * (v as f64);
        match self {
            Feature::Constant => 1.0,
            Feature::ComputeUnits => profile.compute_unit_count as f64,
            Feature::ComputeUnitsSquared => square(profile.compute_unit_count),
            Feature::ItemsPerComputeUnit => profile.max_items_per_unit as f64,
            Feature::ItemsPerComputeUnitSquared => square(profile.max_items_per_unit),
            Feature::ClockFrequency => profile.clock_mhz as f64,
            Feature::GlobalMemory => profile.global_memory_bytes as f64,
            Feature::GlobalMemorySquared => square(profile.global_memory_bytes),
            Feature::LocalMemory => profile.local_memory_bytes as f64,
            Feature::LocalMemorySquared => square(profile.local_memory_bytes),
            Feature::Size => size as f64,
            Feature::SizeSquared => square(size),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for f in Feature::ALL {
            assert_eq!(f.as_str().parse::<Feature>().unwrap(), f);
        }
        assert!("size^3".parse::<Feature>().is_err());
    }

    #[test]
    fn test_index_matches_all() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn test_values() {
        let p = DeviceProfile::accelerator("gpu", 7, 1024, 1620, 1 << 30, 49152);
        assert_eq!(Feature::Constant.value(&p, 99), 1.0);
        assert_eq!(Feature::ComputeUnitsSquared.value(&p, 0), 49.0);
        assert_eq!(Feature::ClockFrequency.value(&p, 0), 1620.0);
        assert_eq!(Feature::Size.value(&p, 1000), 1000.0);
        assert_eq!(Feature::SizeSquared.value(&p, 1000), 1_000_000.0);
    }
}
