// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The virtualizing layout capability set and shared realization-window math.

use core::ops::Range;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Size;

use crate::RealizationContext;

/// A layout strategy that realizes only the items intersecting the
/// context's realization rect.
///
/// Both engines in this crate implement the same capability set against one
/// shared [`RealizationContext`]. A measurement pass computes the realized
/// index range and one rectangle per realized index, storing both in the
/// context's state slot; the following arrangement pass replays the stored
/// rectangles against proxies re-resolved by index. Hosts must run at least
/// one measurement pass before arranging, and must re-measure after any
/// configuration change (see
/// [`VirtualizingLayout::take_measure_invalidation`]).
pub trait VirtualizingLayout {
    /// Installs this layout's state into the context's slot if absent.
    fn initialize(&mut self, cx: &mut dyn RealizationContext);

    /// Clears the context's state slot.
    ///
    /// State is recreated, not retained, across detach/reattach.
    fn uninitialize(&mut self, cx: &mut dyn RealizationContext);

    /// Runs a measurement pass and returns the desired size.
    fn measure(&mut self, cx: &mut dyn RealizationContext, available: Size) -> Size;

    /// Replays the most recent measurement's rectangles and returns
    /// `final_size`.
    ///
    /// Without a preceding measurement pass on this context, nothing is
    /// placed.
    fn arrange(&mut self, cx: &mut dyn RealizationContext, final_size: Size) -> Size;

    /// Reports and clears the pending measure invalidation.
    ///
    /// Returns `true` once after any recognized configuration option
    /// changed value since the last call; reassigning an equal value does
    /// not raise the flag. Hosts poll this to force a fresh measurement
    /// pass before the next arrangement.
    fn take_measure_invalidation(&mut self) -> bool;
}

/// Computes the realized index range for a uniform-step strip.
///
/// `window_start..window_end` is the realization window along the scroll
/// axis, `step` the per-unit extent including spacing, and `limit` the
/// exclusive upper bound (item count for per-item strips, row count for
/// per-row strips). One unit of look-ahead/behind padding is applied on
/// either side:
///
/// `max(floor(start / step) - 1, 0) .. min(floor(end / step) + 1, limit)`
///
/// Returns an empty range when `step` is not positive or not finite (the
/// range cannot be determined from a degenerate step), when `limit` is
/// zero, or when the window lies entirely past the content.
#[must_use]
pub fn compute_realized_range(
    window_start: f64,
    window_end: f64,
    step: f64,
    limit: usize,
) -> Range<usize> {
    if step <= 0.0 || !step.is_finite() || limit == 0 {
        return 0..0;
    }
    let last = ((window_end / step).floor() + 1.0).clamp(0.0, limit as f64);
    let first = ((window_start / step).floor() - 1.0).clamp(0.0, last);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Both bounds are clamped into 0..=limit before the cast"
    )]
    let (first, last) = (first as usize, last as usize);
    first..last
}
