// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: selection through execution on the simulated backend.
//!
//! These tests drive [`Dispatcher`] end to end and check that every
//! accelerator path, multi-pass and partitioned runs included, agrees with
//! the host reference implementations.

use batch_planner::Batch;
use benchmark_corpus::{BenchmarkCorpus, Feature, PredictorCoefficients};
use compute_backend::{
    kernels, BackendError, BufferId, ComputeBackend, DeviceId, DeviceTarget, KernelArg,
    KernelCompileError, KernelSource, ProgramId, SimulatedBackend,
};
use device_profile::{Capability, CpuInfo, DeviceProfile};
use dispatch::{
    DispatchContext, DispatchError, Dispatcher, FallbackPolicy, SelectError, StrategySelector,
};
use geometry::{EdgeInclusion, FillType, Point2, Polygon, SimplePolygon};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// ── Helpers ────────────────────────────────────────────────────

fn coefficients(constant: f64, size: f64) -> PredictorCoefficients {
    Feature::ALL
        .iter()
        .fold(PredictorCoefficients::new(), |c, &f| c.with(f, 0.0))
        .with(Feature::Constant, constant)
        .with(Feature::Size, size)
}

/// A corpus that only predicts the given algorithms, all equally fast.
fn corpus_for(algorithms: &[&str]) -> Arc<BenchmarkCorpus> {
    let corpus = algorithms
        .iter()
        .fold(BenchmarkCorpus::empty(), |c, name| c.with_predictor(*name, coefficients(1e-3, 0.0)));
    Arc::new(corpus)
}

fn device_only() -> Arc<BenchmarkCorpus> {
    corpus_for(&["area_device", "contains_device", "batch_area_device"])
}

fn gpu(global_memory: u64) -> DeviceProfile {
    DeviceProfile::accelerator("sim-gpu", 4, 64, 1000, global_memory, 4096)
}

fn context(backend: Arc<dyn ComputeBackend>, corpus: Arc<BenchmarkCorpus>) -> Arc<DispatchContext> {
    DispatchContext::builder(backend)
        .corpus(corpus)
        .host_profile(DeviceProfile::host_from(&CpuInfo::default()))
        .memory_overhead(0)
        .build()
}

fn square() -> SimplePolygon {
    SimplePolygon::new(vec![
        Point2::new(0, 0),
        Point2::new(1000, 0),
        Point2::new(1000, 1000),
        Point2::new(0, 1000),
    ])
}

/// Five-pointed star drawn as a single self-crossing path around the origin.
fn star() -> SimplePolygon {
    SimplePolygon::new(vec![
        Point2::new(0, 500),
        Point2::new(-294, -405),
        Point2::new(476, 155),
        Point2::new(-476, 155),
        Point2::new(294, -405),
    ])
}

/// A jagged polygon with `n` vertices, alternating between two radii.
fn jagged(n: usize) -> SimplePolygon {
    (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            let radius = if i % 2 == 0 { 900.0 } else { 450.0 };
            Point2::new((radius * angle.cos()) as i32, (radius * angle.sin()) as i32)
        })
        .collect()
}

fn triangles(count: usize) -> Vec<SimplePolygon> {
    (0..count as i32)
        .map(|i| {
            SimplePolygon::new(vec![
                Point2::new(i, 0),
                Point2::new(i + 10 + i, 0),
                Point2::new(i, 7 + i),
            ])
        })
        .collect()
}

// ── Recording backend ──────────────────────────────────────────

/// Wraps the simulator, records calls and injects failures.
struct RecordingBackend {
    inner: SimulatedBackend,
    calls: Mutex<Vec<String>>,
    fail_compile: bool,
    fail_enqueue: bool,
    enqueue_attempts: AtomicU64,
}

impl RecordingBackend {
    fn new(inner: SimulatedBackend) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_compile: false,
            fail_enqueue: false,
            enqueue_attempts: AtomicU64::new(0),
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl ComputeBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn enumerate_devices(&self) -> Vec<DeviceId> {
        self.record("enumerate");
        self.inner.enumerate_devices()
    }

    fn device_identifier(&self, device: DeviceId) -> Result<String, BackendError> {
        self.inner.device_identifier(device)
    }

    fn query_capability(&self, device: DeviceId, capability: Capability) -> Result<u64, BackendError> {
        self.record(format!("query {capability}"));
        self.inner.query_capability(device, capability)
    }

    fn compile(&self, device: DeviceId, source: &KernelSource) -> Result<ProgramId, KernelCompileError> {
        self.record(format!("compile {}", source.name));
        if self.fail_compile {
            return Err(KernelCompileError {
                device,
                source_name: source.name.to_string(),
                build_log: "error: unsupported extension cl_khr_int64".to_string(),
            });
        }
        self.inner.compile(device, source)
    }

    fn allocate_buffer(&self, device: DeviceId, size_bytes: u64) -> Result<BufferId, BackendError> {
        self.record(format!("allocate {size_bytes}"));
        self.inner.allocate_buffer(device, size_bytes)
    }

    fn write_buffer(&self, device: DeviceId, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError> {
        self.record("write");
        self.inner.write_buffer(device, buffer, offset, data)
    }

    fn read_buffer(&self, device: DeviceId, buffer: BufferId, offset: u64, out: &mut [u8]) -> Result<(), BackendError> {
        self.record("read");
        self.inner.read_buffer(device, buffer, offset, out)
    }

    fn release_buffer(&self, device: DeviceId, buffer: BufferId) {
        self.record("release");
        self.inner.release_buffer(device, buffer)
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
        self.record(format!("enqueue {kernel}"));
        self.enqueue_attempts.fetch_add(1, Ordering::Relaxed);
        if self.fail_enqueue {
            return Err(BackendError::Status {
                status: -5,
                detail: "CL_OUT_OF_RESOURCES".to_string(),
            });
        }
        self.inner.enqueue_kernel(device, program, kernel, args, global_size, local_size)
    }

    fn finish(&self, device: DeviceId) -> Result<(), BackendError> {
        self.record("finish");
        self.inner.finish(device)
    }
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_square_area_host_and_device_agree() {
    let square = square();
    assert_eq!(square.area(), 1_000_000);

    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let device = Dispatcher::new(context(sim.clone(), device_only()));
    assert_eq!(device.area(&square).unwrap(), 1_000_000);
    assert_eq!(sim.kernel_launches(), 1);

    let host = Dispatcher::new(context(sim.clone(), corpus_for(&["area_host"])));
    assert_eq!(host.area(&square).unwrap(), 1_000_000);
    assert_eq!(sim.kernel_launches(), 1);
}

#[test]
fn test_star_fill_rules_on_host_and_device() {
    let star = star();
    let origin = Point2::new(0, 0);
    for corpus in [corpus_for(&["contains_host"]), device_only()] {
        let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
        let d = Dispatcher::new(context(sim, corpus));
        assert!(!d.contains(&star, origin, EdgeInclusion::Inside, FillType::EvenOdd).unwrap());
        assert!(d.contains(&star, origin, EdgeInclusion::Inside, FillType::NonZero).unwrap());
    }
}

#[test]
fn test_choose_prefers_only_predicted_candidate() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let selector = StrategySelector::new(context(sim, corpus_for(&["area_host"])));
    let strategy = selector.choose(&["area_host", "area_device"], &[5]).unwrap();
    assert_eq!(strategy.algorithm, "area_host");
    assert_eq!(strategy.device, DeviceTarget::Host);
}

#[test]
fn test_choose_is_pure() {
    let backend = Arc::new(RecordingBackend::new(SimulatedBackend::new(vec![gpu(1 << 20), gpu(1 << 24)])));
    let selector = StrategySelector::new(context(backend.clone(), BenchmarkCorpus::shared()));
    let first = selector.choose(&["area_host", "area_device"], &[250_000]).unwrap();
    let second = selector.choose(&["area_host", "area_device"], &[250_000]).unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.count("enqueue"), 0);
    assert_eq!(backend.count("enumerate"), 1);
}

#[test]
fn test_embedded_corpus_crossover() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let selector = StrategySelector::new(context(sim, BenchmarkCorpus::shared()));
    let small = selector.choose(&["area_host", "area_device"], &[100]).unwrap();
    assert_eq!(small.algorithm, "area_host");
    let large = selector.choose(&["area_host", "area_device"], &[10_000_000]).unwrap();
    assert_eq!(large.algorithm, "area_device");
}

// ── Multi-pass execution ───────────────────────────────────────

#[test]
fn test_multi_pass_area_matches_host() {
    // 32 bytes holds four vertices: three edges plus a pivot per pass.
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(32)]));
    let d = Dispatcher::new(context(sim.clone(), device_only()));
    for n in [3, 4, 5, 7, 50, 101] {
        let polygon = jagged(n);
        assert_eq!(d.area(&polygon).unwrap(), polygon.area(), "n = {n}");
    }
    assert_eq!(sim.live_buffers(), 0);
}

#[test]
fn test_multi_pass_launch_count() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(32)]));
    let d = Dispatcher::new(context(sim.clone(), device_only()));
    d.area(&jagged(50)).unwrap();
    assert_eq!(sim.kernel_launches(), 17);
}

#[test]
fn test_multi_pass_contains_matches_host() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(24)]));
    let d = Dispatcher::new(context(sim, device_only()));
    let shapes = [star(), square(), jagged(40), jagged(41)];
    let probes = [
        Point2::new(0, 0),
        Point2::new(500, 500),
        Point2::new(1000, 500),
        Point2::new(0, 500),
        Point2::new(-200, 100),
        Point2::new(2000, 0),
        Point2::new(900, 0),
    ];
    for shape in &shapes {
        for &p in &probes {
            for inclusion in [EdgeInclusion::Inside, EdgeInclusion::Outside] {
                for fill in [FillType::EvenOdd, FillType::NonZero] {
                    assert_eq!(
                        d.contains(shape, p, inclusion, fill).unwrap(),
                        shape.contains(p, inclusion, fill),
                        "{p} {inclusion:?} {fill:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_device_too_small() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(15)]));
    let d = Dispatcher::new(context(sim, device_only()));
    let err = d.area(&square()).unwrap_err();
    assert!(matches!(err, DispatchError::DeviceTooSmall { capacity: 1, .. }));
}

#[test]
fn test_polygon_with_hole() {
    let outer = square();
    let hole: SimplePolygon = vec![
        Point2::new(250, 250),
        Point2::new(250, 750),
        Point2::new(750, 750),
        Point2::new(750, 250),
    ]
    .into();
    let polygon = Polygon::new(vec![outer, hole]);

    let sim = Arc::new(SimulatedBackend::new(vec![gpu(40)]));
    let d = Dispatcher::new(context(sim, device_only()));
    assert_eq!(d.polygon_area(&polygon).unwrap(), 750_000);
    let centre = Point2::new(500, 500);
    let ring = Point2::new(100, 100);
    assert!(!d.polygon_contains(&polygon, centre, EdgeInclusion::Inside, FillType::NonZero).unwrap());
    assert!(d.polygon_contains(&polygon, ring, EdgeInclusion::Inside, FillType::NonZero).unwrap());
    assert!(d.polygon_contains(&polygon, Point2::new(250, 500), EdgeInclusion::Inside, FillType::EvenOdd).unwrap());
}

// ── Batches ────────────────────────────────────────────────────

#[test]
fn test_batch_area_partitioned_on_device() {
    let items = triangles(20);
    let expected: Vec<i64> = items.iter().map(SimplePolygon::area).collect();

    // Each triangle packs into 32 bytes; 256 bytes fits eight.
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(256)]));
    let d = Dispatcher::new(context(sim.clone(), device_only()));
    let mut batch = Batch::new(&items);
    assert_eq!(d.batch_area(&mut batch).unwrap(), expected);
    assert!(batch.is_partitioned());
    assert_eq!(batch.subbatches().len(), 3);
    assert_eq!(sim.kernel_launches(), 3);
    assert_eq!(sim.live_buffers(), 0);
}

#[test]
fn test_batch_area_whole_on_device() {
    let items = triangles(10);
    let expected: Vec<i64> = items.iter().map(SimplePolygon::area).collect();
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let d = Dispatcher::new(context(sim.clone(), device_only()));
    let mut batch = Batch::new(&items);
    assert_eq!(d.batch_area(&mut batch).unwrap(), expected);
    assert!(!batch.is_partitioned());
    assert_eq!(sim.kernel_launches(), 1);
}

#[test]
fn test_batch_with_degenerate_items() {
    let mut items = triangles(3);
    items.insert(1, SimplePolygon::new(vec![]));
    items.insert(2, SimplePolygon::new(vec![Point2::new(4, 4), Point2::new(9, 1)]));
    let expected: Vec<i64> = items.iter().map(SimplePolygon::area).collect();

    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let d = Dispatcher::new(context(sim, device_only()));
    assert_eq!(d.batch_area(&mut Batch::new(&items)).unwrap(), expected);
}

#[test]
fn test_batch_area_with_unit_size_below_entry_size() {
    let items = triangles(4);
    let expected: Vec<i64> = items.iter().map(SimplePolygon::area).collect();

    let sim = Arc::new(SimulatedBackend::new(vec![gpu(100)]));
    let ctx = DispatchContext::builder(sim.clone())
        .corpus(device_only())
        .host_profile(DeviceProfile::host_from(&CpuInfo::default()))
        .memory_overhead(0)
        .unit_size(4)
        .build();
    let d = Dispatcher::new(ctx);
    let mut batch = Batch::with_unit_size(&items, d.context().unit_size());
    assert_eq!(d.batch_area(&mut batch).unwrap(), expected);
    assert_eq!(batch.subbatches().len(), 2);
    assert_eq!(sim.kernel_launches(), 2);
    assert_eq!(sim.live_buffers(), 0);
}

#[test]
fn test_batch_too_large_falls_back_to_host() {
    let items = vec![jagged(20), jagged(4)];
    let expected: Vec<i64> = items.iter().map(SimplePolygon::area).collect();

    let sim = Arc::new(SimulatedBackend::new(vec![gpu(64)]));
    let d = Dispatcher::new(context(sim.clone(), device_only()));
    let mut batch = Batch::new(&items);
    assert_eq!(d.batch_area(&mut batch).unwrap(), expected);
    assert_eq!(sim.kernel_launches(), 0);
    assert!(batch.subbatches().is_empty());
}

#[test]
fn test_empty_batch() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let d = Dispatcher::new(context(sim, device_only()));
    assert!(d.batch_area(&mut Batch::new(&[])).unwrap().is_empty());
}

// ── Fallback and errors ────────────────────────────────────────

#[test]
fn test_missing_predictions_fall_back_to_host() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let d = Dispatcher::new(context(sim.clone(), Arc::new(BenchmarkCorpus::empty())));
    assert_eq!(d.area(&square()).unwrap(), 1_000_000);
    assert_eq!(sim.kernel_launches(), 0);
}

#[test]
fn test_missing_predictions_fail_policy() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let ctx = DispatchContext::builder(sim)
        .corpus(Arc::new(BenchmarkCorpus::empty()))
        .host_profile(DeviceProfile::host_from(&CpuInfo::default()))
        .fallback(FallbackPolicy::Fail)
        .build();
    let err = Dispatcher::new(ctx).area(&square()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Select(SelectError::AllPredictionsMissing { .. })
    ));
}

#[test]
fn test_unreadable_capability_surfaces_device_query_error() {
    let sim = SimulatedBackend::new(vec![gpu(1 << 20)]).with_unreadable_capability(0, Capability::LocalMemory);
    let d = Dispatcher::new(context(Arc::new(sim), device_only()));
    match d.area(&square()).unwrap_err() {
        DispatchError::DeviceQuery(e) => assert_eq!(e.capability, Capability::LocalMemory),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_unknown_entry_point_reports_build_log() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    let ctx = context(sim, device_only());
    let source = KernelSource {
        name: "mystery",
        code: "__kernel void mystery_kernel(__global int* out) { out[0] = 1; }",
    };
    let err = ctx.program(DeviceId(0), &source).unwrap_err();
    assert!(err.build_log.contains("mystery_kernel"));
}

#[test]
fn test_compile_failure_is_fatal() {
    let mut backend = RecordingBackend::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    backend.fail_compile = true;
    let d = Dispatcher::new(context(Arc::new(backend), device_only()));
    match d.area(&square()).unwrap_err() {
        DispatchError::KernelCompile(e) => assert!(e.build_log.contains("cl_khr_int64")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_enqueue_failure_is_not_retried() {
    let mut backend = RecordingBackend::new(SimulatedBackend::new(vec![gpu(1 << 20)]));
    backend.fail_enqueue = true;
    let backend = Arc::new(backend);
    let d = Dispatcher::new(context(backend.clone(), device_only()));
    let err = d.area(&jagged(10)).unwrap_err();
    assert!(matches!(err, DispatchError::Backend(BackendError::Status { status: -5, .. })));
    assert_eq!(backend.enqueue_attempts.load(Ordering::Relaxed), 1);
    assert_eq!(backend.count("allocate"), backend.count("release"));
}

#[test]
fn test_programs_and_profiles_cached() {
    let backend = Arc::new(RecordingBackend::new(SimulatedBackend::new(vec![gpu(1 << 20)])));
    let d = Dispatcher::new(context(backend.clone(), device_only()));
    for _ in 0..3 {
        d.area(&square()).unwrap();
        d.contains(&square(), Point2::new(1, 1), EdgeInclusion::Inside, FillType::EvenOdd).unwrap();
    }
    assert_eq!(backend.count(&format!("compile {}", kernels::AREA.name)), 1);
    assert_eq!(backend.count(&format!("compile {}", kernels::CONTAINS.name)), 1);
    assert_eq!(backend.count("enumerate"), 1);
    assert_eq!(backend.count("enqueue"), 6);
}

#[test]
fn test_concurrent_dispatch_shares_context() {
    let sim = Arc::new(SimulatedBackend::new(vec![gpu(64)]));
    let ctx = context(sim.clone(), device_only());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || {
                let polygon = jagged(20 + i);
                let area = Dispatcher::new(ctx).area(&polygon).unwrap();
                assert_eq!(area, polygon.area());
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(sim.compilations(), 1);
}
