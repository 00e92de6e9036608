// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag events from a misbehaving host.
//!
//! Replays a gesture the way some browsers deliver it: the custom payload
//! format is refused, drag ticks report (0, 0), the hovered target disappears
//! without a leave, and the drag end comes back at the origin. The handlers
//! still observe a clean enter/leave sequence and a sensible end position.
//!
//! Run:
//! - `RUST_LOG=dragline_driver=debug cargo run -p dragline_demos --example quirky_host`

use std::cell::RefCell;
use std::rc::Rc;

use dragline::context::DragContext;
use dragline::handler::Handler;
use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions};
use dragline_driver::driver::{Driver, PAYLOAD_FORMAT};
use dragline_driver::error::DragError;
use dragline_driver::memory::{MemoryHost, NodeId};
use dragline_driver::types::{NativeEvent, NativeEventKind};
use kurbo::{Point, Rect};

type QuirkHandler = Handler<&'static str, (), (), &'static str>;

fn main() -> Result<(), DragError<NodeId>> {
    env_logger::init();

    let mut host = MemoryHost::new();
    let page = host.insert(None, Rect::new(0.0, 0.0, 300.0, 200.0));
    let icon = host.insert(Some(page), Rect::new(10.0, 10.0, 60.0, 60.0));
    let bin = host.insert(Some(page), Rect::new(100.0, 10.0, 290.0, 190.0));
    host.reject_format(PAYLOAD_FORMAT);

    let ctx = DragContext::new();
    let source: QuirkHandler = Handler::new(
        ctx.clone(),
        HandlerOptions::new().drag_source(
            DragSource::new("FILE")
                .on_drag(|ev| println!("  drag tick at {:?}", ev.position))
                .on_drag_end(|ev| println!("  drag ended at {:?}", ev.position)),
        ),
    )
    .expect("icon has a drag source");
    let mut target: QuirkHandler = Handler::new(
        ctx,
        HandlerOptions::new().drop_target(
            DropTarget::new(AcceptedTypes::single("FILE"))
                .on_drag_enter(|ev| {
                    println!("  entered {:?}", ev.target);
                    None
                })
                .on_drag_leave(|ev| println!("  left {:?}", ev.target)),
        ),
    )
    .expect("bin has a drop target");
    target.set_target(Some("bin"));
    let source = Rc::new(RefCell::new(source));
    let target = Rc::new(RefCell::new(target));

    let mut driver = Driver::new(host);
    driver.connect_source(icon, source.clone())?;
    driver.connect_target(bin, target.clone())?;

    let send = |driver: &mut Driver<NodeId, MemoryHost>,
                kind: NativeEventKind,
                at: Option<NodeId>,
                x: f64,
                y: f64| { driver.handle(NativeEvent::new(kind, at, Point::new(x, y))) };

    println!("drag start, custom payload refused:");
    send(&mut driver, NativeEventKind::DragStart, Some(icon), 30.0, 30.0)?;
    println!("  payload written as {:?}", driver.host().drag_data());

    println!("drag ticks at the origin:");
    send(&mut driver, NativeEventKind::Drag, Some(icon), 0.0, 0.0)?;
    send(&mut driver, NativeEventKind::Drag, Some(icon), 0.0, 0.0)?;
    println!("  fallback active: {}", driver.fallback_active());
    send(&mut driver, NativeEventKind::DragOver, Some(page), 80.0, 100.0)?;

    println!("first genuine tick, then over the bin:");
    send(&mut driver, NativeEventKind::Drag, Some(icon), 90.0, 100.0)?;
    println!("  fallback active: {}", driver.fallback_active());
    send(&mut driver, NativeEventKind::DragOver, Some(bin), 150.0, 100.0)?;
    assert!(target.borrow().is_over(), "bin is hovered");

    println!("bin removed while hovered:");
    driver.host_mut().remove(bin);
    send(&mut driver, NativeEventKind::Drag, Some(icon), 150.0, 100.0)?;
    send(&mut driver, NativeEventKind::Drag, Some(icon), 152.0, 100.0)?;
    assert!(!target.borrow().is_over(), "leave was synthesized");
    driver.disconnect_target(bin);

    println!("drag end reported at the origin:");
    send(&mut driver, NativeEventKind::DragEnd, Some(icon), 0.0, 0.0)?;
    assert!(!driver.is_dragging(), "operation finished");

    driver.disconnect_all();
    Ok(())
}
