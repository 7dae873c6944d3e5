// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A million-item activity feed, driven headlessly.
//!
//! This example seeds one million items into a `PanelHost` and drives both
//! layout engines through measure/arrange passes at a few simulated scroll
//! offsets, printing which indices were realized at each stop. It is the
//! headless equivalent of hosting the layouts in a scrolling panel.
//!
//! Run:
//! - `cargo run -p understory_demos --example activity_feed`

use kurbo::{Rect, Size};
use understory_virtual_panel::harness::PanelHost;
use understory_virtual_panel::{StackLayout, StaggeredGridLayout, VirtualizingLayout};

const ITEM_COUNT: usize = 1_000_000;
const VIEWPORT: Size = Size::new(820.0, 600.0);

/// Measures and arranges at each scroll offset, reporting what got realized.
fn drive(name: &str, layout: &mut dyn VirtualizingLayout, host: &mut PanelHost, offsets: &[f64]) {
    layout.initialize(host);
    for &scroll in offsets {
        host.clear_logs();
        host.set_realization_rect(Rect::new(
            0.0,
            scroll,
            VIEWPORT.width,
            scroll + VIEWPORT.height,
        ));

        let desired = layout.measure(host, VIEWPORT);
        layout.arrange(host, desired);

        let log = host.arrange_log();
        match (log.first(), log.last()) {
            (Some((first, _)), Some((last, _))) => println!(
                "{name}: scroll {scroll:>12.0}  realized {first}..={last} ({} items) of {ITEM_COUNT}, content {:.0} tall",
                log.len(),
                desired.height,
            ),
            _ => println!("{name}: scroll {scroll:>12.0}  realized nothing"),
        }
    }
    layout.uninitialize(host);
}

fn main() {
    // Every feed entry renders as a 200x120 card; the hosts hand these out
    // as natural sizes when a layout probes item 0.
    let mut host = PanelHost::with_uniform_size(ITEM_COUNT, Size::new(200.0, 120.0));

    let mut stack = StackLayout::new();
    stack.set_spacing(1.0);
    stack.set_item_extent(Some(100.0));
    drive(
        "stack    ",
        &mut stack,
        &mut host,
        &[0.0, 5_000.0, 100_000_000.0],
    );

    // Reconfiguring raises the invalidation the host polls before arranging.
    stack.set_spacing(4.0);
    assert!(stack.take_measure_invalidation());
    drive("stack    ", &mut stack, &mut host, &[5_000.0]);

    let mut grid = StaggeredGridLayout::new();
    grid.set_row_spacing(8.0);
    grid.set_column_spacing(8.0);
    drive(
        "staggered",
        &mut grid,
        &mut host,
        &[0.0, 5_000.0, 40_000_000.0],
    );
}
