//! Headless walkthrough of native interop: a map view and a settings screen
//! controller embedded in a composition, driven frame by frame over the
//! in-memory host.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use compose_app_shell::InteropShell;
use compose_core::{mutable_state_of, MutableState};
use compose_interop::memory_host::MemoryNativeHost;
use compose_interop::{
    ControllerId, InteropEnvironment, InteropScope, LayoutCoordinates, NativeControllerArgs,
    NativeView, NativeViewArgs, NativeViewController, UpdateFn, ViewId,
};
use compose_runtime_std::StdRuntime;
use compose_ui_graphics::{Color, Density, IntSize, Point};

const MAP_KEY: u64 = 1;
const SETTINGS_KEY: u64 = 2;

#[derive(Clone)]
struct DemoState {
    zoom: MutableState<u32>,
    show_settings: MutableState<bool>,
    map_origin: MutableState<(f32, f32)>,
    map_size: MutableState<(i32, i32)>,
    map_update: UpdateFn<ViewId>,
}

fn main() {
    env_logger::init();

    println!("=== Compose-RS Native Interop Demo ===");
    println!("Run with RUST_LOG=debug to see deferred actions and flushes.");
    println!();

    let runtime = StdRuntime::new();
    let wakes = Arc::new(AtomicUsize::new(0));
    runtime.set_frame_waker({
        let wakes = Arc::clone(&wakes);
        move || {
            wakes.fetch_add(1, Ordering::SeqCst);
        }
    });

    let host = Rc::new(MemoryNativeHost::new());
    let root_view = host.create_view();
    let root_controller = host.create_controller();
    let env = InteropEnvironment::new(host.clone(), root_view, runtime.runtime_handle())
        .with_density(Density::new(2.0))
        .with_root_controller(root_controller);

    let zoom = mutable_state_of(3);
    let state = DemoState {
        zoom: zoom.clone(),
        show_settings: mutable_state_of(false),
        map_origin: mutable_state_of((0.0, 0.0)),
        map_size: mutable_state_of((600, 400)),
        map_update: Rc::new(move |view: &ViewId| {
            log::info!("map {view} zoom set to {}", zoom.value())
        }),
    };
    let map_view = host.create_view();
    let settings = host.create_controller();

    let mut shell = InteropShell::new(runtime, env, {
        let state = state.clone();
        move |scope| demo_content(scope, &state, map_view, settings)
    });
    shell.set_placer({
        let state = state.clone();
        move |composition| {
            let (x, y) = state.map_origin.value();
            let (width, height) = state.map_size.value();
            composition.on_placed(
                MAP_KEY,
                LayoutCoordinates::new(Point::new(x, y), IntSize::new(width, height)),
            );
            if state.show_settings.value() {
                composition.on_placed(
                    SETTINGS_KEY,
                    LayoutCoordinates::new(Point::new(0.0, 400.0), IntSize::new(600, 200)),
                );
            }
        }
    });

    run_frame(&mut shell, &host, "initial mount");

    state.zoom.set(5);
    run_frame(&mut shell, &host, "zoom changed");

    state.map_origin.set((40.0, 0.0));
    run_frame(&mut shell, &host, "map translated");

    state.map_size.set((600, 300));
    run_frame(&mut shell, &host, "map resized");

    state.show_settings.set(true);
    run_frame(&mut shell, &host, "settings shown");

    match shell.pointer_target(Point::new(50.0, 220.0)) {
        Some(view) => println!("pointer at (50, 220) lands on container {view}"),
        None => println!("pointer at (50, 220) lands on composed content"),
    }

    state.show_settings.set(false);
    run_frame(&mut shell, &host, "settings hidden");

    match shell.dispose() {
        Ok(transaction) => println!("disposed: {transaction:?}"),
        Err(err) => log::error!("dispose failed: {err}"),
    }
    println!("frame requests woke the loop {} times", wakes.load(Ordering::SeqCst));
}

fn demo_content(
    scope: &mut InteropScope<'_>,
    state: &DemoState,
    map_view: ViewId,
    settings: ControllerId,
) {
    NativeView(
        scope,
        MAP_KEY,
        NativeViewArgs::new(move || map_view)
            .update_shared(Rc::clone(&state.map_update))
            .background(Color::WHITE)
            .on_resize(|view, bounds| {
                log::info!("map {view} laid out at {}x{}", bounds.width, bounds.height)
            })
            .on_release(|view| log::info!("map {view} released")),
    );
    if state.show_settings.value() {
        NativeViewController(
            scope,
            SETTINGS_KEY,
            NativeControllerArgs::new(move || settings)
                .on_release(|controller| log::info!("settings {controller} released")),
        );
    }
}

fn run_frame(shell: &mut InteropShell, host: &MemoryNativeHost, label: &str) {
    println!("--- {label} ---");
    println!("frame requested: {}", shell.take_should_render());
    match shell.update() {
        Ok(transaction) => println!(
            "frame {}: {} actions, +{} -{} views, {:?}",
            shell.frame_count(),
            transaction.actions_run,
            transaction.views_added,
            transaction.views_removed,
            transaction.state
        ),
        Err(err) => log::error!("frame {} failed: {err}", shell.frame_count()),
    }
    for op in host.take_ops() {
        println!("  {op:?}");
    }
}
