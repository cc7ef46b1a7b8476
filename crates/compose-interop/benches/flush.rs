use std::rc::Rc;
use std::sync::Arc;

use compose_core::{DefaultScheduler, Runtime};
use compose_interop::memory_host::MemoryNativeHost;
use compose_interop::{
    InteropComposition, InteropEnvironment, LayoutCoordinates, NativeView, NativeViewArgs,
};
use compose_ui_graphics::{IntSize, Point};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const NODE_COUNT_SAMPLES: &[usize] = &[8, 32, 128];

struct FlushFixture {
    _runtime: Runtime,
    host: Rc<MemoryNativeHost>,
    composition: InteropComposition,
    nodes: usize,
}

impl FlushFixture {
    fn new(nodes: usize) -> Self {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let host = Rc::new(MemoryNativeHost::new());
        let root = host.create_view();
        let env = InteropEnvironment::new(host.clone(), root, runtime.handle());
        Self {
            _runtime: runtime,
            host,
            composition: InteropComposition::new(env),
            nodes,
        }
    }

    fn compose(&mut self) {
        let host = Rc::clone(&self.host);
        let nodes = self.nodes;
        self.composition.compose(|scope| {
            for key in 0..nodes as u64 {
                let host = Rc::clone(&host);
                NativeView(scope, key, NativeViewArgs::new(move || host.create_view()));
            }
        });
    }

    fn place(&mut self, offset: f32) {
        for key in 0..self.nodes as u64 {
            self.composition.on_placed(
                key,
                LayoutCoordinates::new(
                    Point::new(offset, key as f32 * 20.0),
                    IntSize::new(100, 20),
                ),
            );
        }
    }

    fn flush(&self) -> usize {
        match self.composition.env().context.flush() {
            Ok(transaction) => transaction.actions_run,
            Err(err) => panic!("bench flush failed: {err}"),
        }
    }
}

fn bench_mount_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("interop_mount_flush");
    for &nodes in NODE_COUNT_SAMPLES {
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, &nodes| {
            b.iter(|| {
                let mut fixture = FlushFixture::new(nodes);
                fixture.compose();
                fixture.place(0.0);
                black_box(fixture.flush());
                fixture.composition.dispose();
                black_box(fixture.flush())
            });
        });
    }
    group.finish();
}

fn bench_translation_flush(c: &mut Criterion) {
    let mut fixture = FlushFixture::new(64);
    fixture.compose();
    fixture.place(0.0);
    fixture.flush();
    let mut offset = 0.0;
    c.bench_function("interop_translation_flush", |b| {
        b.iter(|| {
            offset += 1.0;
            fixture.place(offset);
            fixture.host.clear_ops();
            black_box(fixture.flush())
        });
    });
}

criterion_group!(flush, bench_mount_flush, bench_translation_flush);
criterion_main!(flush);
