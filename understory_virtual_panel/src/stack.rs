// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A virtualizing stack: uniformly sized items along one axis.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::{RealizationContext, VirtualizingLayout, compute_realized_range};

/// Stacking direction for [`StackLayout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Items stack top to bottom; the cross axis is horizontal.
    #[default]
    Vertical,
    /// Items stack left to right; the cross axis is vertical.
    Horizontal,
}

/// Per-context state: the realized range and its rectangles.
///
/// `rects[k]` corresponds to item `first_index + k`.
#[derive(Debug, Default)]
struct StackState {
    first_index: usize,
    rects: Vec<Rect>,
    unbounded_cross: bool,
}

/// A virtualizing layout that stacks uniformly sized items along one axis.
///
/// Items share a single extent along the stacking axis, either configured
/// via [`StackLayout::set_item_extent`] or probed once from item 0's
/// natural (unconstrained) size. Only items intersecting the context's
/// realization rect are measured and placed; the reported desired size
/// still accounts for the full collection.
///
/// When the cross-axis constraint is unbounded, each realized item is
/// captured at its natural cross-axis size and the reported cross-axis
/// extent is that of the **last** realized item, not a maximum over the
/// realized range; arrangement then stretches every rectangle to the final
/// cross-axis size.
#[derive(Debug, Default)]
pub struct StackLayout {
    spacing: f64,
    orientation: Orientation,
    item_extent: Option<f64>,
    /// Probe cache for the auto extent; cleared on any configuration change.
    probed_extent: Option<f64>,
    measure_invalid: bool,
}

impl StackLayout {
    /// Creates a vertical stack with zero spacing and a probed item extent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gap between consecutive items.
    #[must_use]
    pub const fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Sets the gap between consecutive items.
    ///
    /// Negative values are clamped to zero. An actual value change raises
    /// the measure invalidation and starts a new probe epoch.
    pub fn set_spacing(&mut self, spacing: f64) {
        debug_assert!(
            spacing.is_finite(),
            "StackLayout spacing must be finite; got {spacing:?}"
        );
        let spacing = spacing.max(0.0);
        if spacing != self.spacing {
            self.spacing = spacing;
            self.invalidate();
        }
    }

    /// Returns the stacking direction.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Sets the stacking direction.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation != self.orientation {
            self.orientation = orientation;
            self.invalidate();
        }
    }

    /// Returns the configured item extent, or `None` when probed.
    #[must_use]
    pub const fn item_extent(&self) -> Option<f64> {
        self.item_extent
    }

    /// Sets the item extent along the stacking axis.
    ///
    /// `None` probes item 0's natural size on the next measurement pass and
    /// reuses that value until the configuration changes again. Negative
    /// extents are clamped to zero.
    pub fn set_item_extent(&mut self, extent: Option<f64>) {
        if let Some(extent) = extent {
            debug_assert!(
                extent.is_finite(),
                "StackLayout item extent must be finite; got {extent:?}"
            );
        }
        let extent = extent.map(|extent| extent.max(0.0));
        if extent != self.item_extent {
            self.item_extent = extent;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.probed_extent = None;
        self.measure_invalid = true;
    }

    /// Resolves the effective item extent, probing item 0 if needed.
    ///
    /// Returns `None` only when the extent is unset and there is no item 0
    /// to probe.
    fn effective_extent(&mut self, cx: &mut dyn RealizationContext) -> Option<f64> {
        if let Some(extent) = self.item_extent {
            return Some(extent);
        }
        if let Some(extent) = self.probed_extent {
            return Some(extent);
        }
        if cx.item_count() == 0 {
            return None;
        }
        let natural = cx.measure_item(0, Size::new(f64::INFINITY, f64::INFINITY));
        let extent = match self.orientation {
            Orientation::Vertical => natural.height,
            Orientation::Horizontal => natural.width,
        };
        self.probed_extent = Some(extent);
        Some(extent)
    }
}

impl VirtualizingLayout for StackLayout {
    fn initialize(&mut self, cx: &mut dyn RealizationContext) {
        let slot = cx.layout_state();
        if !slot.holds::<StackState>() {
            slot.put(StackState::default());
        }
    }

    fn uninitialize(&mut self, cx: &mut dyn RealizationContext) {
        cx.layout_state().clear();
    }

    fn measure(&mut self, cx: &mut dyn RealizationContext, available: Size) -> Size {
        let mut state = cx.layout_state().take::<StackState>().unwrap_or_default();
        state.rects.clear();
        state.first_index = 0;
        state.unbounded_cross = false;

        let count = cx.item_count();
        let Some(extent) = self.effective_extent(cx) else {
            cx.layout_state().put(state);
            return Size::ZERO;
        };

        let vertical = self.orientation == Orientation::Vertical;
        let window = cx.realization_rect();
        let (window_start, window_end) = if vertical {
            (window.y0, window.y1)
        } else {
            (window.x0, window.x1)
        };

        let cross_available = if vertical {
            available.width
        } else {
            available.height
        };
        let unbounded = !cross_available.is_finite();
        state.unbounded_cross = unbounded;

        let step = extent + self.spacing;
        let range = compute_realized_range(window_start, window_end, step, count);
        state.first_index = range.start;
        state.rects.reserve(range.len());

        let mut cross_extent = if unbounded { 0.0 } else { cross_available };
        for index in range {
            let constraint = if vertical {
                Size::new(cross_available, extent)
            } else {
                Size::new(extent, cross_available)
            };
            let natural = cx.measure_item(index, constraint);
            let item_cross = if unbounded {
                // Auto-sizing tracks the most recently measured item, so the
                // extent reported below is the last realized item's.
                cross_extent = if vertical { natural.width } else { natural.height };
                cross_extent
            } else {
                cross_available
            };

            let offset = index as f64 * step;
            let (origin, size) = if vertical {
                (Point::new(0.0, offset), Size::new(item_cross, extent))
            } else {
                (Point::new(offset, 0.0), Size::new(extent, item_cross))
            };
            state.rects.push(Rect::from_origin_size(origin, size));
        }

        let primary_extent = ((count as f64 - 1.0) * step + extent).max(0.0);
        cx.layout_state().put(state);

        if vertical {
            Size::new(cross_extent, primary_extent)
        } else {
            Size::new(primary_extent, cross_extent)
        }
    }

    fn arrange(&mut self, cx: &mut dyn RealizationContext, final_size: Size) -> Size {
        let Some(state) = cx.layout_state().take::<StackState>() else {
            return final_size;
        };

        let vertical = self.orientation == Orientation::Vertical;
        let cross_final = if vertical {
            final_size.width
        } else {
            final_size.height
        };
        for (offset, rect) in state.rects.iter().enumerate() {
            let index = state.first_index + offset;
            let rect = if state.unbounded_cross {
                // Measured under an unbounded constraint: stretch to the
                // final cross-axis size.
                if vertical {
                    Rect::from_origin_size(rect.origin(), Size::new(cross_final, rect.height()))
                } else {
                    Rect::from_origin_size(rect.origin(), Size::new(rect.width(), cross_final))
                }
            } else {
                *rect
            };
            cx.arrange_item(index, rect);
        }

        cx.layout_state().put(state);
        final_size
    }

    fn take_measure_invalidation(&mut self) -> bool {
        core::mem::take(&mut self.measure_invalid)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Rect, Size};

    use super::{Orientation, StackLayout, StackState};
    use crate::harness::PanelHost;
    use crate::{RealizationContext, VirtualizingLayout};

    fn host(count: usize) -> PanelHost {
        PanelHost::with_uniform_size(count, Size::new(120.0, 40.0))
    }

    #[test]
    fn realizes_only_the_window_plus_one_item_of_padding() {
        let mut host = host(100);
        host.set_realization_rect(Rect::new(0.0, 500.0, 400.0, 1000.0));

        let mut stack = StackLayout::new();
        stack.set_item_extent(Some(100.0));
        stack.set_spacing(1.0);
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(400.0, 500.0));

        // floor(500/101) - 1 = 3, floor(1000/101) + 1 = 10.
        let measured: Vec<usize> = host.measure_log().iter().map(|(i, _)| *i).collect();
        assert_eq!(measured, (3..10).collect::<Vec<_>>());

        let state = host.layout_state().get_mut::<StackState>().unwrap();
        assert_eq!(state.first_index, 3);
        assert_eq!(state.rects.len(), 7);
        assert_eq!(state.rects[0], Rect::new(0.0, 303.0, 400.0, 403.0));

        // 99 * 101 + 100.
        assert_eq!(desired, Size::new(400.0, 10099.0));
    }

    #[test]
    fn primary_extent_follows_the_gap_formula() {
        let mut host = host(10);
        host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 200.0));

        let mut stack = StackLayout::new();
        stack.set_item_extent(Some(100.0));
        stack.set_spacing(1.0);
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(400.0, 200.0));
        assert_eq!(desired.height, 991.0);
    }

    #[test]
    fn measurement_is_idempotent_for_an_unchanged_window() {
        let mut host = host(50);
        host.set_realization_rect(Rect::new(0.0, 100.0, 400.0, 400.0));

        let mut stack = StackLayout::new();
        stack.initialize(&mut host);

        let first_pass = stack.measure(&mut host, Size::new(400.0, 300.0));
        let rects: Vec<Rect> = host
            .layout_state()
            .get_mut::<StackState>()
            .unwrap()
            .rects
            .clone();

        let second_pass = stack.measure(&mut host, Size::new(400.0, 300.0));
        let state = host.layout_state().get_mut::<StackState>().unwrap();

        assert_eq!(first_pass, second_pass);
        assert_eq!(state.rects, rects);
    }

    #[test]
    fn arrange_replays_measured_rects_in_index_order() {
        let mut host = host(100);
        host.set_realization_rect(Rect::new(0.0, 500.0, 400.0, 1000.0));

        let mut stack = StackLayout::new();
        stack.set_item_extent(Some(100.0));
        stack.set_spacing(1.0);
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(400.0, 500.0));
        let rects: Vec<Rect> = host
            .layout_state()
            .get_mut::<StackState>()
            .unwrap()
            .rects
            .clone();

        host.clear_logs();
        stack.arrange(&mut host, desired);

        let arranged = host.arrange_log();
        assert_eq!(arranged.len(), rects.len());
        for (offset, (index, rect)) in arranged.iter().enumerate() {
            assert_eq!(*index, 3 + offset);
            assert_eq!(*rect, rects[offset]);
        }
    }

    #[test]
    fn auto_extent_probes_item_zero_once_per_epoch() {
        let mut host = PanelHost::with_uniform_size(100, Size::new(120.0, 40.0));
        host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 200.0));

        let mut stack = StackLayout::new();
        stack.initialize(&mut host);

        stack.measure(&mut host, Size::new(400.0, 200.0));
        stack.measure(&mut host, Size::new(400.0, 200.0));

        let probes = host
            .proxy(0)
            .unwrap()
            .measures
            .iter()
            .filter(|call| !call.constraint.width.is_finite())
            .count();
        assert_eq!(probes, 1);

        // A configuration change starts a new epoch and re-probes.
        stack.set_spacing(5.0);
        stack.measure(&mut host, Size::new(400.0, 200.0));
        let probes = host
            .proxy(0)
            .unwrap()
            .measures
            .iter()
            .filter(|call| !call.constraint.width.is_finite())
            .count();
        assert_eq!(probes, 2);
    }

    #[test]
    fn horizontal_orientation_swaps_the_axes() {
        let mut host = host(100);
        host.set_realization_rect(Rect::new(0.0, 0.0, 300.0, 200.0));

        let mut stack = StackLayout::new();
        stack.set_orientation(Orientation::Horizontal);
        stack.set_item_extent(Some(100.0));
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(300.0, 200.0));

        // 99 * 100 + 100 along x, the cross constraint along y.
        assert_eq!(desired, Size::new(10000.0, 200.0));

        let state = host.layout_state().get_mut::<StackState>().unwrap();
        assert_eq!(state.first_index, 0);
        assert_eq!(state.rects.len(), 4);
        assert_eq!(state.rects[2], Rect::new(200.0, 0.0, 300.0, 200.0));
    }

    #[test]
    fn unbounded_cross_axis_reports_the_last_realized_natural_size() {
        // Natural widths grow with the index, so last-wins is observable.
        let mut host = PanelHost::new(100, |index| Size::new(10.0 * (index + 1) as f64, 20.0));
        host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 100.0));

        let mut stack = StackLayout::new();
        stack.set_item_extent(Some(20.0));
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(f64::INFINITY, 600.0));

        // Items 0..6 realized; the reported width is item 5's, not the max.
        assert_eq!(desired.width, 60.0);

        // Arrangement stretches every rect to the final cross-axis size.
        stack.arrange(&mut host, Size::new(500.0, desired.height));
        for (_, rect) in host.arrange_log() {
            assert_eq!(rect.width(), 500.0);
        }
    }

    #[test]
    fn empty_collection_realizes_nothing() {
        let mut host = host(0);
        host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 200.0));

        let mut stack = StackLayout::new();
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(400.0, 200.0));
        stack.arrange(&mut host, desired);

        assert_eq!(desired, Size::ZERO);
        assert_eq!(host.proxies_created(), 0);
        assert!(host.arrange_log().is_empty());
    }

    #[test]
    fn zero_extent_and_spacing_realize_nothing() {
        let mut host = host(10);
        host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 200.0));

        let mut stack = StackLayout::new();
        stack.set_item_extent(Some(0.0));
        stack.initialize(&mut host);

        let desired = stack.measure(&mut host, Size::new(400.0, 200.0));
        assert!(host.measure_log().is_empty());
        assert_eq!(desired.height, 0.0);
    }

    #[test]
    fn invalidation_is_raised_only_on_actual_change() {
        let mut stack = StackLayout::new();
        assert!(!stack.take_measure_invalidation());

        stack.set_spacing(0.0);
        assert!(!stack.take_measure_invalidation());

        stack.set_spacing(3.0);
        assert!(stack.take_measure_invalidation());
        assert!(!stack.take_measure_invalidation());

        stack.set_spacing(3.0);
        assert!(!stack.take_measure_invalidation());

        stack.set_orientation(Orientation::Horizontal);
        stack.set_item_extent(Some(10.0));
        assert!(stack.take_measure_invalidation());
    }

    #[test]
    fn uninitialize_discards_the_context_state() {
        let mut host = host(10);
        host.set_realization_rect(Rect::new(0.0, 0.0, 400.0, 200.0));

        let mut stack = StackLayout::new();
        stack.initialize(&mut host);
        stack.measure(&mut host, Size::new(400.0, 200.0));
        assert!(!host.layout_state().is_empty());

        stack.uninitialize(&mut host);
        assert!(host.layout_state().is_empty());

        // Arranging without a fresh measurement places nothing.
        stack.arrange(&mut host, Size::new(400.0, 200.0));
        assert!(host.arrange_log().is_empty());
    }
}
