// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A software accelerator.
//!
//! [`SimulatedBackend`] implements [`ComputeBackend`] entirely in host
//! memory. It enforces the limits in each device's [`DeviceProfile`]:
//!
//! - a single allocation may not exceed global memory;
//! - a work-group may not exceed `max_items_per_unit`;
//! - local scratch may not exceed local memory;
//! - the global size must be a multiple of the local size.
//!
//! Compilation resolves the source's entry points to built-in emulations;
//! unknown entry points fail with a build log. Selected capabilities can be
//! made unreadable to exercise query failures.

mod emulation;

use crate::kernels::KernelSource;
use crate::{BackendError, BufferId, ComputeBackend, DeviceId, KernelArg, KernelCompileError, ProgramId};
use device_profile::{Capability, DeviceProfile};
use emulation::{BuiltinKernel, Launch};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One simulated device.
#[derive(Debug, Clone)]
struct SimulatedDevice {
    profile: DeviceProfile,
    unreadable: Vec<Capability>,
}

#[derive(Debug)]
struct SimBuffer {
    device: DeviceId,
    data: Vec<u8>,
}

#[derive(Debug)]
struct SimProgram {
    device: DeviceId,
    kernels: Vec<BuiltinKernel>,
}

/// Live allocations, keyed by id.
#[derive(Debug, Default)]
pub(crate) struct BufferTable {
    buffers: HashMap<BufferId, SimBuffer>,
}

impl BufferTable {
    fn get(&self, device: DeviceId, buffer: BufferId) -> Result<&SimBuffer, BackendError> {
        self.buffers
            .get(&buffer)
            .filter(|b| b.device == device)
            .ok_or(BackendError::UnknownBuffer { device, buffer })
    }

    pub(crate) fn bytes(&self, device: DeviceId, buffer: BufferId) -> Result<&[u8], BackendError> {
        Ok(&self.get(device, buffer)?.data)
    }

    pub(crate) fn write(&mut self, device: DeviceId, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError> {
        let target = self
            .buffers
            .get_mut(&buffer)
            .filter(|b| b.device == device)
            .ok_or(BackendError::UnknownBuffer { device, buffer })?;
        let range = checked_range(offset, data.len(), target.data.len())?;
        target.data[range].copy_from_slice(data);
        Ok(())
    }
}

fn checked_range(offset: u64, len: usize, size: usize) -> Result<std::ops::Range<usize>, BackendError> {
    let out_of_bounds = || BackendError::OutOfBounds {
        offset,
        len: len as u64,
        size: size as u64,
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
    if end > size {
        return Err(out_of_bounds());
    }
    Ok(start..end)
}

#[derive(Debug, Default)]
struct SimState {
    buffers: BufferTable,
    programs: HashMap<ProgramId, SimProgram>,
}

/// Software implementation of [`ComputeBackend`].
#[derive(Debug)]
pub struct SimulatedBackend {
    devices: Vec<SimulatedDevice>,
    state: Mutex<SimState>,
    next_id: AtomicU64,
    compilations: AtomicU64,
    kernel_launches: AtomicU64,
}

impl SimulatedBackend {
    /// Creates a backend with one device per profile, in order.
    pub fn new(profiles: Vec<DeviceProfile>) -> Self {
        Self {
            devices: profiles
                .into_iter()
                .map(|profile| SimulatedDevice {
                    profile,
                    unreadable: Vec::new(),
                })
                .collect(),
            state: Mutex::new(SimState::default()),
            next_id: AtomicU64::new(1),
            compilations: AtomicU64::new(0),
            kernel_launches: AtomicU64::new(0),
        }
    }

    /// A backend with no devices: only the host remains available.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Makes `capability` of device `index` fail to read.
    pub fn with_unreadable_capability(mut self, index: usize, capability: Capability) -> Self {
        if let Some(device) = self.devices.get_mut(index) {
            device.unreadable.push(capability);
        }
        self
    }

    /// Number of successful compilations so far.
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Number of kernel launches so far.
    pub fn kernel_launches(&self) -> u64 {
        self.kernel_launches.load(Ordering::Relaxed)
    }

    /// Number of buffers currently allocated.
    pub fn live_buffers(&self) -> usize {
        self.lock().buffers.buffers.len()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn device(&self, device: DeviceId) -> Result<&SimulatedDevice, BackendError> {
        self.devices
            .get(device.0 as usize)
            .ok_or(BackendError::UnknownDevice(device))
    }

    fn fresh_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn check_work_size(
        kernel: &str,
        profile: &DeviceProfile,
        args: &[KernelArg],
        global_size: u64,
        local_size: u64,
    ) -> Result<(), BackendError> {
        let invalid = |detail: String| BackendError::InvalidWorkSize {
            kernel: kernel.to_string(),
            detail,
        };
        if local_size == 0 || global_size == 0 {
            return Err(invalid(format!("global {global_size} / local {local_size} must be non-zero")));
        }
        if local_size > profile.max_items_per_unit {
            return Err(invalid(format!(
                "work-group of {local_size} exceeds the device maximum of {}",
                profile.max_items_per_unit
            )));
        }
        if global_size % local_size != 0 {
            return Err(invalid(format!(
                "global size {global_size} is not a multiple of local size {local_size}"
            )));
        }
        let local_bytes: u64 = args
            .iter()
            .filter_map(|a| match a {
                KernelArg::Local(bytes) => Some(*bytes),
                _ => None,
            })
            .sum();
        if local_bytes > profile.local_memory_bytes {
            return Err(BackendError::LocalMemoryExceeded {
                requested: local_bytes,
                limit: profile.local_memory_bytes,
            });
        }
        Ok(())
    }
}

impl ComputeBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn enumerate_devices(&self) -> Vec<DeviceId> {
        (0..self.devices.len() as u32).map(DeviceId).collect()
    }

    fn device_identifier(&self, device: DeviceId) -> Result<String, BackendError> {
        Ok(self.device(device)?.profile.identifier.clone())
    }

    fn query_capability(&self, device: DeviceId, capability: Capability) -> Result<u64, BackendError> {
        let sim = self.device(device)?;
        if sim.unreadable.contains(&capability) {
            return Err(BackendError::CapabilityUnavailable {
                device,
                capability,
                detail: "query rejected by device".to_string(),
            });
        }
        Ok(sim.profile.capability(capability))
    }

    fn compile(&self, device: DeviceId, source: &KernelSource) -> Result<ProgramId, KernelCompileError> {
        let fail = |build_log: String| KernelCompileError {
            device,
            source_name: source.name.to_string(),
            build_log,
        };
        if self.device(device).is_err() {
            return Err(fail(format!("error: device {device} does not exist")));
        }

        let entry_points = source.entry_points();
        if entry_points.is_empty() {
            return Err(fail("error: source declares no kernel entry points".to_string()));
        }

        let mut kernels = Vec::with_capacity(entry_points.len());
        let mut log = Vec::new();
        for name in entry_points {
            match BuiltinKernel::from_entry_point(name) {
                Some(kernel) => kernels.push(kernel),
                None => log.push(format!("error: kernel '{name}' has no implementation on this device")),
            }
        }
        if !log.is_empty() {
            return Err(fail(log.join("\n")));
        }

        let id = ProgramId(self.fresh_id());
        self.lock().programs.insert(id, SimProgram { device, kernels });
        self.compilations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("simulated: compiled '{}' for device {device}", source.name);
        Ok(id)
    }

    fn allocate_buffer(&self, device: DeviceId, size_bytes: u64) -> Result<BufferId, BackendError> {
        let limit = self.device(device)?.profile.global_memory_bytes;
        let invalid = BackendError::InvalidAllocation {
            device,
            requested: size_bytes,
            limit,
        };
        if size_bytes == 0 || size_bytes > limit {
            return Err(invalid);
        }
        let len = usize::try_from(size_bytes).map_err(|_| invalid)?;

        let id = BufferId(self.fresh_id());
        self.lock().buffers.buffers.insert(
            id,
            SimBuffer {
                device,
                data: vec![0; len],
            },
        );
        Ok(id)
    }

    fn write_buffer(&self, device: DeviceId, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError> {
        self.lock().buffers.write(device, buffer, offset, data)
    }

    fn read_buffer(&self, device: DeviceId, buffer: BufferId, offset: u64, out: &mut [u8]) -> Result<(), BackendError> {
        let state = self.lock();
        let bytes = state.buffers.bytes(device, buffer)?;
        let range = checked_range(offset, out.len(), bytes.len())?;
        out.copy_from_slice(&bytes[range]);
        Ok(())
    }

    fn release_buffer(&self, device: DeviceId, buffer: BufferId) {
        let mut state = self.lock();
        if state.buffers.get(device, buffer).is_ok() {
            state.buffers.buffers.remove(&buffer);
        }
    }

    fn enqueue_kernel(
        &self,
        device: DeviceId,
        program: ProgramId,
        kernel: &str,
        args: &[KernelArg],
        global_size: u64,
        local_size: u64,
    ) -> Result<(), BackendError> {
        let profile = &self.device(device)?.profile;
        let mut state = self.lock();

        let builtin = {
            let prog = state
                .programs
                .get(&program)
                .filter(|p| p.device == device)
                .ok_or(BackendError::UnknownProgram { device, program })?;
            prog.kernels
                .iter()
                .copied()
                .find(|k| k.entry_point() == kernel)
                .ok_or_else(|| BackendError::UnknownKernel {
                    program,
                    kernel: kernel.to_string(),
                })?
        };
        Self::check_work_size(kernel, profile, args, global_size, local_size)?;

        let launch = Launch {
            kernel: builtin,
            device,
            args,
            global_size,
            local_size,
        };
        emulation::execute(&launch, &mut state.buffers)?;
        self.kernel_launches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("simulated: {kernel} global={global_size} local={local_size} on {device}");
        Ok(())
    }

    fn finish(&self, device: DeviceId) -> Result<(), BackendError> {
        self.device(device).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{AREA, AREA_KERNEL};
    use geometry::Point2;

    fn device() -> DeviceProfile {
        DeviceProfile::accelerator("sim-gpu", 4, 8, 1000, 1024, 256)
    }

    fn upload(sim: &SimulatedBackend, points: &[Point2]) -> BufferId {
        let bytes: &[u8] = bytemuck::cast_slice(points);
        let id = sim.allocate_buffer(DeviceId(0), bytes.len() as u64).unwrap();
        sim.write_buffer(DeviceId(0), id, 0, bytes).unwrap();
        id
    }

    #[test]
    fn test_enumeration_order() {
        let sim = SimulatedBackend::new(vec![device(), DeviceProfile::accelerator("second", 1, 1, 1, 64, 64)]);
        assert_eq!(sim.enumerate_devices(), vec![DeviceId(0), DeviceId(1)]);
        assert_eq!(sim.device_identifier(DeviceId(1)).unwrap(), "second");
        assert!(matches!(sim.device_identifier(DeviceId(2)), Err(BackendError::UnknownDevice(_))));
    }

    #[test]
    fn test_unreadable_capability() {
        let sim = SimulatedBackend::new(vec![device()]).with_unreadable_capability(0, Capability::ClockMhz);
        assert_eq!(sim.query_capability(DeviceId(0), Capability::ComputeUnits).unwrap(), 4);
        assert!(matches!(
            sim.query_capability(DeviceId(0), Capability::ClockMhz),
            Err(BackendError::CapabilityUnavailable { .. })
        ));
    }

    #[test]
    fn test_compile_unknown_entry_point_logs() {
        const BOGUS: KernelSource = KernelSource {
            name: "bogus",
            code: "__kernel void area_reduce() {}\n__kernel void mystery(int x) {}",
        };
        let sim = SimulatedBackend::new(vec![device()]);
        let err = sim.compile(DeviceId(0), &BOGUS).unwrap_err();
        assert!(err.build_log.contains("mystery"));
        assert!(!err.build_log.contains("area_reduce"));
        assert_eq!(sim.compilations(), 0);
    }

    #[test]
    fn test_area_kernel_two_groups() {
        let sim = SimulatedBackend::new(vec![device()]);
        let program = sim.compile(DeviceId(0), &AREA).unwrap();
        // Square with its pivot appended: 4 edges.
        let square = [
            Point2::new(0, 0),
            Point2::new(10, 0),
            Point2::new(10, 10),
            Point2::new(0, 10),
            Point2::new(0, 0),
        ];
        let input = upload(&sim, &square);
        let output = sim.allocate_buffer(DeviceId(0), 16).unwrap();
        sim.enqueue_kernel(
            DeviceId(0),
            program,
            AREA_KERNEL,
            &[KernelArg::Buffer(input), KernelArg::U64(4), KernelArg::Buffer(output), KernelArg::Local(24)],
            6,
            3,
        )
        .unwrap();
        sim.finish(DeviceId(0)).unwrap();

        let mut raw = [0u8; 16];
        sim.read_buffer(DeviceId(0), output, 0, &mut raw).unwrap();
        let partials: Vec<i64> = bytemuck::pod_collect_to_vec(&raw);
        assert_eq!(partials.iter().sum::<i64>(), 200);
        assert_eq!(sim.kernel_launches(), 1);
    }

    #[test]
    fn test_work_size_limits() {
        let sim = SimulatedBackend::new(vec![device()]);
        let program = sim.compile(DeviceId(0), &AREA).unwrap();
        let input = upload(&sim, &[Point2::new(0, 0); 20]);
        let output = sim.allocate_buffer(DeviceId(0), 64).unwrap();
        let args = |local: u64| {
            [KernelArg::Buffer(input), KernelArg::U64(16), KernelArg::Buffer(output), KernelArg::Local(local * 8)]
        };

        let too_wide = sim.enqueue_kernel(DeviceId(0), program, AREA_KERNEL, &args(16), 16, 16);
        assert!(matches!(too_wide, Err(BackendError::InvalidWorkSize { .. })));

        let ragged = sim.enqueue_kernel(DeviceId(0), program, AREA_KERNEL, &args(5), 16, 5);
        assert!(matches!(ragged, Err(BackendError::InvalidWorkSize { .. })));

        let big_scratch = [KernelArg::Buffer(input), KernelArg::U64(16), KernelArg::Buffer(output), KernelArg::Local(512)];
        let local_overflow = sim.enqueue_kernel(DeviceId(0), program, AREA_KERNEL, &big_scratch, 16, 8);
        assert!(matches!(local_overflow, Err(BackendError::LocalMemoryExceeded { .. })));

        let unknown = sim.enqueue_kernel(DeviceId(0), program, "winding_reduce", &args(8), 16, 8);
        assert!(matches!(unknown, Err(BackendError::UnknownKernel { .. })));
    }

    #[test]
    fn test_release_is_device_scoped() {
        let sim = SimulatedBackend::new(vec![device(), device()]);
        let id = sim.allocate_buffer(DeviceId(0), 8).unwrap();
        sim.release_buffer(DeviceId(1), id);
        assert_eq!(sim.live_buffers(), 1);
        sim.release_buffer(DeviceId(0), id);
        assert_eq!(sim.live_buffers(), 0);
    }
}
