// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A two-lane card board driven by a simulated pointer.
//!
//! A card is dragged from the `todo` lane to the `done` lane. Every pointer
//! sample produces a drag tick on the card and a drag-over at whatever element
//! is under the pointer; the driver resolves nested elements and turns the
//! stream into enter/over/leave/drop calls.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p dragline_demos --example card_board`

use std::cell::RefCell;
use std::rc::Rc;

use dragline::context::DragContext;
use dragline::handler::Handler;
use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions, PropMap};
use dragline::props::Props;
use dragline::types::{DropEffect, EdgeThresholds, EffectAllowed};
use dragline_driver::driver::Driver;
use dragline_driver::error::DragError;
use dragline_driver::memory::{MemoryHost, NodeId};
use dragline_driver::types::{NativeEvent, NativeEventKind, ParentLookup};
use kurbo::{Point, Rect};

type BoardHandler = Handler<&'static str, u32, u32, &'static str>;

fn show(name: &str, props: &Props) {
    let fields: Vec<String> = props.iter().map(|(k, v)| format!("{k}={v:?}")).collect();
    println!("  {name:<5} {}", fields.join(" "));
}

fn main() -> Result<(), DragError<NodeId>> {
    env_logger::init();

    let mut host = MemoryHost::new();
    let board = host.insert(None, Rect::new(0.0, 0.0, 420.0, 300.0));
    let todo = host.insert(Some(board), Rect::new(10.0, 10.0, 200.0, 290.0));
    let done = host.insert(Some(board), Rect::new(220.0, 10.0, 410.0, 290.0));
    let card = host.insert(Some(todo), Rect::new(20.0, 20.0, 190.0, 70.0));

    let ctx = DragContext::new();
    let moves = Rc::new(RefCell::new(Vec::new()));

    let mut card_handler: BoardHandler = Handler::new(
        ctx.clone(),
        HandlerOptions::new().drag_source(
            DragSource::new("CARD")
                .collect(|id: Option<&u32>| id.copied())
                .on_drag_start(|ev| {
                    println!("picked up card {:?}", ev.source.user_data);
                    Some(EffectAllowed::MOVE)
                }),
        ),
    )
    .expect("card has a drag source");
    card_handler.set_source_props(Some(7));
    let card_handler = Rc::new(RefCell::new(card_handler));

    let lane = |name: &'static str| {
        let moves = Rc::clone(&moves);
        let mut handler: BoardHandler = Handler::new(
            ctx.clone(),
            HandlerOptions::new()
                .drop_target(
                    DropTarget::new(AcceptedTypes::map([("CARD", DropEffect::Move)]))
                        .edges(EdgeThresholds::uniform(16.0))
                        .on_drop(move |ev| {
                            let slot = if ev.edges.top {
                                "top"
                            } else if ev.edges.bottom {
                                "bottom"
                            } else {
                                "middle"
                            };
                            let lane = ev.target.copied().unwrap_or("?");
                            moves.borrow_mut().push((ev.source.user_data, lane, slot));
                        }),
                )
                .prop_map(PropMap::default().is_over("highlighted")),
        )
        .expect("lane has a drop target");
        handler.set_target(Some(name));
        Rc::new(RefCell::new(handler))
    };
    let todo_handler = lane("todo");
    let done_handler = lane("done");

    let mut driver = Driver::new(host);
    driver.connect_source(card, card_handler.clone())?;
    driver.connect_target(todo, todo_handler.clone())?;
    driver.connect_target(done, done_handler.clone())?;

    let start = Point::new(100.0, 45.0);
    driver.handle(NativeEvent::new(NativeEventKind::DragStart, Some(card), start))?;

    let path = [
        Point::new(120.0, 45.0),
        Point::new(180.0, 40.0),
        Point::new(210.0, 35.0),
        Point::new(260.0, 30.0),
        Point::new(300.0, 20.0),
    ];
    for pt in path {
        driver.handle(NativeEvent::new(NativeEventKind::Drag, Some(card), pt))?;
        let under = driver.host().hit_test(pt);
        driver.handle(NativeEvent::new(NativeEventKind::DragOver, under, pt))?;
        println!("pointer at ({}, {}), over {:?}", pt.x, pt.y, driver.over());
        show("card", &card_handler.borrow().props());
        show("todo", &todo_handler.borrow().props());
        show("done", &done_handler.borrow().props());
    }

    let end = path[path.len() - 1];
    let under = driver.host().hit_test(end);
    driver.handle(NativeEvent::new(NativeEventKind::Drop, under, end))?;
    driver.handle(NativeEvent::new(NativeEventKind::DragEnd, Some(card), end))?;

    for (id, lane, slot) in moves.borrow().iter() {
        println!("card {id:?} dropped at the {slot} of {lane}");
    }
    assert_eq!(moves.borrow().len(), 1, "exactly one drop lands");
    assert!(!card_handler.borrow().is_dragging(), "drag end resets the source");

    // The application moves the card; the connection stays.
    driver.host_mut().reparent(card, Some(done));
    driver
        .host_mut()
        .set_bounds(card, Rect::new(230.0, 20.0, 400.0, 70.0));
    println!(
        "card now under {:?}, draggable: {}",
        driver.host().parent_of(&card),
        driver.host().is_draggable(card)
    );

    driver.disconnect_all();
    Ok(())
}
