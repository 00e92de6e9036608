// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dragline::context::DragContext;
use dragline::handler::Handler;
use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions};
use dragline::types::EdgeThresholds;
use dragline_driver::driver::Driver;
use dragline_driver::memory::{MemoryHost, NodeId};
use dragline_driver::types::{NativeEvent, NativeEventKind};
use kurbo::{Point, Rect};

type BenchHandler = Handler<u32, u32, u32>;

struct Board {
    driver: Driver<NodeId, MemoryHost>,
    source: NodeId,
}

/// A row of `lanes` targets, each holding `depth` nested unconnected
/// children, plus one source to the left.
fn build_board(lanes: usize, depth: usize) -> Board {
    let mut host = MemoryHost::new();
    let width = 100.0 * lanes as f64 + 100.0;
    let root = host.insert(None, Rect::new(0.0, 0.0, width, 400.0));
    let source = host.insert(Some(root), Rect::new(10.0, 10.0, 90.0, 90.0));

    let ctx = DragContext::new();
    let mut src: BenchHandler = Handler::new(
        ctx.clone(),
        HandlerOptions::new().drag_source(DragSource::new(1).collect(|p: Option<&u32>| p.copied())),
    )
    .unwrap();
    src.set_source_props(Some(42));

    let mut driver = Driver::new(host);
    driver.connect_source(source, Rc::new(RefCell::new(src))).unwrap();

    for i in 0..lanes {
        let x0 = 100.0 + 100.0 * i as f64;
        let lane = driver
            .host_mut()
            .insert(Some(root), Rect::new(x0, 0.0, x0 + 100.0, 400.0));
        let mut parent = lane;
        for d in 0..depth {
            let inset = 1.0 + d as f64;
            parent = driver.host_mut().insert(
                Some(parent),
                Rect::new(x0 + inset, inset, x0 + 100.0 - inset, 400.0 - inset),
            );
        }
        let target: BenchHandler = Handler::new(
            ctx.clone(),
            HandlerOptions::new().drop_target(
                DropTarget::new(AcceptedTypes::list([1, 2])).edges(EdgeThresholds::uniform(10.0)),
            ),
        )
        .unwrap();
        driver
            .connect_target(lane, Rc::new(RefCell::new(target)))
            .unwrap();
    }
    Board { driver, source }
}

/// Sweep the pointer across every lane and drop on the last one.
fn sweep(board: &mut Board, steps: usize, width: f64) {
    let Board { driver, source } = board;
    let source = *source;
    let send = |driver: &mut Driver<NodeId, MemoryHost>, kind, at, pt| {
        driver.handle(NativeEvent::new(kind, at, pt)).unwrap()
    };
    send(driver, NativeEventKind::DragStart, Some(source), Point::new(50.0, 50.0));
    let mut pt = Point::new(50.0, 50.0);
    for s in 0..steps {
        pt = Point::new(100.0 + width * s as f64 / steps as f64, 200.0);
        send(driver, NativeEventKind::Drag, Some(source), pt);
        let under = driver.host().hit_test(pt);
        black_box(send(driver, NativeEventKind::DragOver, under, pt));
    }
    let under = driver.host().hit_test(pt);
    send(driver, NativeEventKind::Drop, under, pt);
    send(driver, NativeEventKind::DragEnd, Some(source), pt);
}

fn bench_gesture(c: &mut Criterion) {
    let mut group = c.benchmark_group("gesture");
    for &lanes in &[4_usize, 32, 128] {
        let steps = lanes * 10;
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_function(format!("sweep_lanes{lanes}"), |b| {
            b.iter_batched(
                || build_board(lanes, 0),
                |mut board| sweep(&mut board, steps, 100.0 * lanes as f64),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_nested_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_resolution");
    for &depth in &[1_usize, 8, 32] {
        group.throughput(Throughput::Elements(80));
        group.bench_function(format!("depth{depth}"), |b| {
            b.iter_batched(
                || build_board(8, depth),
                |mut board| sweep(&mut board, 80, 800.0),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gesture, bench_nested_resolution);
criterion_main!(benches);
