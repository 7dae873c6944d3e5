// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_virtual_panel --heading-base-level=0

//! Understory Virtual Panel: virtualized stack and staggered-grid layouts.
//!
//! This crate provides two panel layout engines that realize only the items
//! intersecting a realization window, so collections of a million items
//! never materialize more than a handful of proxies:
//!
//! - [`StackLayout`]: items along one axis (vertical or horizontal) with a
//!   uniform extent, configured or probed once from the first item.
//! - [`StaggeredGridLayout`]: rows of three items over a four-unit column
//!   grid, alternating wide-last and wide-first row patterns.
//!
//! Both implement the same [`VirtualizingLayout`] capability set against one
//! host-supplied [`RealizationContext`]. A measurement pass computes the
//! realized index range and one rectangle per realized index; the following
//! arrangement pass replays those rectangles against proxies re-resolved by
//! index. Pass-to-pass state lives in the context's [`StateSlot`], so one
//! layout instance can serve any number of contexts.
//!
//! Hosts are responsible for:
//!
//! - owning items and proxies, including their memoization/recycling policy,
//! - supplying the realization rect (viewport plus look-ahead),
//! - re-running measurement whenever the collection, the window, or a layout
//!   configuration option changes (see
//!   [`VirtualizingLayout::take_measure_invalidation`]).
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_virtual_panel::harness::PanelHost;
//! use understory_virtual_panel::{StackLayout, VirtualizingLayout};
//!
//! // A million 120x40 items, viewing the first 400x600 of content.
//! let mut host = PanelHost::with_uniform_size(1_000_000, Size::new(120.0, 40.0));
//! host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 600.0));
//!
//! let mut stack = StackLayout::new();
//! stack.initialize(&mut host);
//!
//! let desired = stack.measure(&mut host, Size::new(400.0, 600.0));
//! assert_eq!(desired.height, 40.0 * 1_000_000.0);
//!
//! // Only the items near the window were realized.
//! assert!(host.proxies_created() < 32);
//!
//! stack.arrange(&mut host, desired);
//! ```
//!
//! Geometry is [`kurbo`] (`Point`/`Size`/`Rect`); unbounded measure
//! constraints are expressed as `f64::INFINITY` components.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod context;
mod layout;
mod stack;
mod staggered;

pub mod harness;

pub use context::{RealizationContext, StateSlot};
pub use layout::{VirtualizingLayout, compute_realized_range};
pub use stack::{Orientation, StackLayout};
pub use staggered::StaggeredGridLayout;
