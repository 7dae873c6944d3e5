// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless realization host for tests, doctests, and demos.
//!
//! [`PanelHost`] stands in for a scrolling items panel: it owns the logical
//! collection, the realization rect, and the layout state slot, and it
//! memoizes one [`ProxyRecord`] per realized index, which is the host side
//! of the get-or-create proxy policy. Every measure and arrange call is
//! logged both per proxy and in pass order, so callers can assert which
//! items were realized, how often item 0 was probed, and in what order
//! rectangles were replayed.
//!
//! Proxies report their natural size regardless of the constraint they were
//! measured under, which keeps probe results and cross-axis auto-sizing
//! observable from tests.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Rect, Size};
use smallvec::SmallVec;

use crate::{RealizationContext, StateSlot};

/// One measurement of a proxy: the constraint it was given and the natural
/// size it reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureCall {
    /// Constraint passed to the proxy.
    pub constraint: Size,
    /// Natural size the proxy reported.
    pub natural: Size,
}

/// Call log for one realized proxy.
///
/// Proxies are created lazily, one per realized index, and live for the
/// host's lifetime. Most proxies see one or two calls of each kind per
/// scenario, so the logs stay inline.
#[derive(Debug, Clone, Default)]
pub struct ProxyRecord {
    /// Measure calls against this proxy, oldest first.
    pub measures: SmallVec<[MeasureCall; 2]>,
    /// Arrange calls against this proxy, oldest first.
    pub arranges: SmallVec<[Rect; 2]>,
}

/// A headless stand-in for a scrolling items panel.
pub struct PanelHost {
    len: usize,
    natural_size: Box<dyn Fn(usize) -> Size>,
    realization_rect: Rect,
    state: StateSlot,
    proxies: HashMap<usize, ProxyRecord>,
    measure_log: Vec<(usize, Size)>,
    arrange_log: Vec<(usize, Rect)>,
}

impl PanelHost {
    /// Creates a host over `len` items whose natural size is
    /// `natural_size(index)`.
    ///
    /// The realization rect starts empty; set it before driving a
    /// measurement pass.
    #[must_use]
    pub fn new(len: usize, natural_size: impl Fn(usize) -> Size + 'static) -> Self {
        Self {
            len,
            natural_size: Box::new(natural_size),
            realization_rect: Rect::ZERO,
            state: StateSlot::new(),
            proxies: HashMap::new(),
            measure_log: Vec::new(),
            arrange_log: Vec::new(),
        }
    }

    /// Creates a host over `len` items sharing one natural size.
    #[must_use]
    pub fn with_uniform_size(len: usize, natural: Size) -> Self {
        Self::new(len, move |_| natural)
    }

    /// Sets the realization rect for subsequent passes.
    pub fn set_realization_rect(&mut self, rect: Rect) {
        self.realization_rect = rect;
    }

    /// Sets the number of logical items.
    ///
    /// Existing proxy records are kept; indices at or past the new count
    /// are simply no longer realizable.
    pub fn set_item_count(&mut self, len: usize) {
        self.len = len;
    }

    /// Returns the call record for `index`, if that proxy was ever realized.
    #[must_use]
    pub fn proxy(&self, index: usize) -> Option<&ProxyRecord> {
        self.proxies.get(&index)
    }

    /// Number of distinct proxies created so far.
    #[must_use]
    pub fn proxies_created(&self) -> usize {
        self.proxies.len()
    }

    /// Measure calls since the last [`PanelHost::clear_logs`], in call
    /// order, as `(index, constraint)`.
    #[must_use]
    pub fn measure_log(&self) -> &[(usize, Size)] {
        &self.measure_log
    }

    /// Arrange calls since the last [`PanelHost::clear_logs`], in call
    /// order, as `(index, rect)`.
    #[must_use]
    pub fn arrange_log(&self) -> &[(usize, Rect)] {
        &self.arrange_log
    }

    /// Forgets the pass-ordered logs; per-proxy records are kept.
    pub fn clear_logs(&mut self) {
        self.measure_log.clear();
        self.arrange_log.clear();
    }
}

impl RealizationContext for PanelHost {
    fn item_count(&self) -> usize {
        self.len
    }

    fn realization_rect(&self) -> Rect {
        self.realization_rect
    }

    fn measure_item(&mut self, index: usize, constraint: Size) -> Size {
        debug_assert!(
            index < self.len,
            "measure_item index out of range: {index} >= {}",
            self.len
        );
        let natural = (self.natural_size)(index);
        let record = self.proxies.entry(index).or_default();
        record.measures.push(MeasureCall {
            constraint,
            natural,
        });
        self.measure_log.push((index, constraint));
        natural
    }

    fn arrange_item(&mut self, index: usize, rect: Rect) {
        debug_assert!(
            index < self.len,
            "arrange_item index out of range: {index} >= {}",
            self.len
        );
        let record = self.proxies.entry(index).or_default();
        record.arranges.push(rect);
        self.arrange_log.push((index, rect));
    }

    fn layout_state(&mut self) -> &mut StateSlot {
        &mut self.state
    }
}

impl core::fmt::Debug for PanelHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PanelHost")
            .field("len", &self.len)
            .field("realization_rect", &self.realization_rect)
            .field("proxies_created", &self.proxies.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Size};

    use super::PanelHost;
    use crate::RealizationContext;

    #[test]
    fn proxies_are_memoized_per_index() {
        let mut host = PanelHost::with_uniform_size(10, Size::new(30.0, 20.0));

        let natural = host.measure_item(4, Size::new(100.0, 20.0));
        host.measure_item(4, Size::new(100.0, 20.0));
        host.arrange_item(4, Rect::new(0.0, 80.0, 100.0, 100.0));

        assert_eq!(natural, Size::new(30.0, 20.0));
        assert_eq!(host.proxies_created(), 1);

        let record = host.proxy(4).unwrap();
        assert_eq!(record.measures.len(), 2);
        assert_eq!(record.arranges.len(), 1);
        assert!(host.proxy(5).is_none());
    }

    #[test]
    fn logs_keep_call_order_and_survive_proxy_reuse() {
        let mut host = PanelHost::with_uniform_size(10, Size::new(30.0, 20.0));

        host.measure_item(2, Size::new(100.0, 20.0));
        host.measure_item(1, Size::new(100.0, 20.0));

        let indices: alloc::vec::Vec<usize> =
            host.measure_log().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, [2, 1]);

        host.clear_logs();
        assert!(host.measure_log().is_empty());
        assert_eq!(host.proxies_created(), 2);
    }
}
