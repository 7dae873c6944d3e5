// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A virtualizing staggered grid: rows of three over a four-unit column grid.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::{RealizationContext, VirtualizingLayout, compute_realized_range};

/// Items per row.
const SLOTS_PER_ROW: usize = 3;
/// Width units the row's slots are carved from.
const WIDTH_UNITS: f64 = 4.0;

/// Per-context state: the realized range and its rectangles, row-major.
///
/// `rects[k]` corresponds to item `first_index + k`.
#[derive(Debug, Default)]
struct GridState {
    first_index: usize,
    rects: Vec<Rect>,
}

/// A virtualizing layout that places items in staggered rows of three.
///
/// Every row holds exactly three items carved out of a four-unit column
/// grid: even rows read narrow/narrow/wide and odd rows read
/// wide/narrow/narrow, the wide slot spanning two width units plus the
/// column gap between them. All slots in a row share the minimum item
/// height; the minimum size is either configured via
/// [`StaggeredGridLayout::set_min_item_size`] or probed once from item 0's
/// natural (unconstrained) size.
///
/// Collections whose length is not a multiple of three get their trailing
/// partial row truncated: those items are never measured or placed.
#[derive(Debug, Default)]
pub struct StaggeredGridLayout {
    row_spacing: f64,
    column_spacing: f64,
    min_item_size: Option<Size>,
    /// Probe cache for the auto size; cleared on any configuration change.
    probed_size: Option<Size>,
    measure_invalid: bool,
}

impl StaggeredGridLayout {
    /// Creates a grid with zero spacing and a probed minimum item size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gap between consecutive rows.
    #[must_use]
    pub const fn row_spacing(&self) -> f64 {
        self.row_spacing
    }

    /// Sets the gap between consecutive rows.
    ///
    /// Negative values are clamped to zero. An actual value change raises
    /// the measure invalidation and starts a new probe epoch.
    pub fn set_row_spacing(&mut self, spacing: f64) {
        debug_assert!(
            spacing.is_finite(),
            "StaggeredGridLayout row spacing must be finite; got {spacing:?}"
        );
        let spacing = spacing.max(0.0);
        if spacing != self.row_spacing {
            self.row_spacing = spacing;
            self.invalidate();
        }
    }

    /// Returns the gap between slots within a row.
    #[must_use]
    pub const fn column_spacing(&self) -> f64 {
        self.column_spacing
    }

    /// Sets the gap between slots within a row.
    ///
    /// Negative values are clamped to zero. An actual value change raises
    /// the measure invalidation and starts a new probe epoch.
    pub fn set_column_spacing(&mut self, spacing: f64) {
        debug_assert!(
            spacing.is_finite(),
            "StaggeredGridLayout column spacing must be finite; got {spacing:?}"
        );
        let spacing = spacing.max(0.0);
        if spacing != self.column_spacing {
            self.column_spacing = spacing;
            self.invalidate();
        }
    }

    /// Returns the configured minimum item size, or `None` when probed.
    #[must_use]
    pub const fn min_item_size(&self) -> Option<Size> {
        self.min_item_size
    }

    /// Sets the minimum item size.
    ///
    /// The width is the narrow slot's floor; the height is every row's
    /// height. `None` probes both from item 0's natural size on the next
    /// measurement pass and reuses that value until the configuration
    /// changes again. Negative components are clamped to zero.
    pub fn set_min_item_size(&mut self, size: Option<Size>) {
        if let Some(size) = size {
            debug_assert!(
                size.is_finite(),
                "StaggeredGridLayout minimum item size must be finite; got {size:?}"
            );
        }
        let size = size.map(|size| Size::new(size.width.max(0.0), size.height.max(0.0)));
        if size != self.min_item_size {
            self.min_item_size = size;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.probed_size = None;
        self.measure_invalid = true;
    }

    /// Resolves the effective minimum item size, probing item 0 if needed.
    ///
    /// Returns `None` only when the size is unset and there is no item 0 to
    /// probe.
    fn effective_min_size(&mut self, cx: &mut dyn RealizationContext) -> Option<Size> {
        if let Some(size) = self.min_item_size {
            return Some(size);
        }
        if let Some(size) = self.probed_size {
            return Some(size);
        }
        if cx.item_count() == 0 {
            return None;
        }
        let natural = cx.measure_item(0, Size::new(f64::INFINITY, f64::INFINITY));
        self.probed_size = Some(natural);
        Some(natural)
    }

    /// Rectangles for the three slots of `row`, given the resolved width unit.
    fn row_rects(&self, row: usize, unit: f64, item_height: f64) -> [Rect; SLOTS_PER_ROW] {
        let y = row as f64 * (item_height + self.row_spacing);
        let narrow = unit;
        let wide = unit * 2.0 + self.column_spacing;
        let widths = if row % 2 == 0 {
            [narrow, narrow, wide]
        } else {
            [wide, narrow, narrow]
        };

        let mut rects = [Rect::ZERO; SLOTS_PER_ROW];
        let mut x = 0.0;
        for (slot, width) in widths.into_iter().enumerate() {
            rects[slot] = Rect::from_origin_size(Point::new(x, y), Size::new(width, item_height));
            x += width + self.column_spacing;
        }
        rects
    }
}

impl VirtualizingLayout for StaggeredGridLayout {
    fn initialize(&mut self, cx: &mut dyn RealizationContext) {
        let slot = cx.layout_state();
        if !slot.holds::<GridState>() {
            slot.put(GridState::default());
        }
    }

    fn uninitialize(&mut self, cx: &mut dyn RealizationContext) {
        cx.layout_state().clear();
    }

    fn measure(&mut self, cx: &mut dyn RealizationContext, available: Size) -> Size {
        let mut state = cx.layout_state().take::<GridState>().unwrap_or_default();
        state.rects.clear();
        state.first_index = 0;

        let count = cx.item_count();
        let Some(min_size) = self.effective_min_size(cx) else {
            cx.layout_state().put(state);
            return Size::ZERO;
        };

        // A trailing partial row is truncated, never realized.
        let rows = count / SLOTS_PER_ROW;
        let step = min_size.height + self.row_spacing;
        let window = cx.realization_rect();
        let row_range = compute_realized_range(window.y0, window.y1, step, rows);

        let unit = if available.width.is_finite() {
            // Three column gaps shared across four width units.
            min_size
                .width
                .max((available.width - self.column_spacing * 3.0) / WIDTH_UNITS)
        } else {
            // An unbounded width would make every slot infinitely wide;
            // fall back to the configured floor.
            min_size.width
        };

        state.first_index = row_range.start * SLOTS_PER_ROW;
        state.rects.reserve(row_range.len() * SLOTS_PER_ROW);
        for row in row_range {
            let rects = self.row_rects(row, unit, min_size.height);
            for (slot, rect) in rects.into_iter().enumerate() {
                cx.measure_item(row * SLOTS_PER_ROW + slot, rect.size());
                state.rects.push(rect);
            }
        }

        let extent_height = ((rows as f64 - 1.0) * step + min_size.height).max(0.0);
        cx.layout_state().put(state);

        Size::new(
            unit * WIDTH_UNITS + self.column_spacing * 2.0,
            extent_height,
        )
    }

    fn arrange(&mut self, cx: &mut dyn RealizationContext, final_size: Size) -> Size {
        let Some(state) = cx.layout_state().take::<GridState>() else {
            return final_size;
        };

        for (offset, rect) in state.rects.iter().enumerate() {
            cx.arrange_item(state.first_index + offset, *rect);
        }

        cx.layout_state().put(state);
        final_size
    }

    fn take_measure_invalidation(&mut self) -> bool {
        core::mem::take(&mut self.measure_invalid)
    }
}
