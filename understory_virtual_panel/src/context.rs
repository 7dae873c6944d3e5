// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The realization context contract and the opaque per-context state slot.

use alloc::boxed::Box;
use core::any::Any;

use kurbo::{Rect, Size};

/// Host-side services a virtualizing layout runs against.
///
/// A realization context is one panel's view of a logical item collection:
/// how many items exist, which region of content must have realized
/// proxies, and how to measure or place the proxy for a given index. Proxy
/// identity, memoization, and recycling are host concerns; layouts never
/// hold a proxy between calls and always address items by index.
///
/// Methods that resolve proxies take `&mut self` so hosts are free to
/// create and cache proxies lazily without interior mutability.
pub trait RealizationContext {
    /// Total number of logical items.
    fn item_count(&self) -> usize;

    /// The region of content that must have realized proxies: the viewport
    /// plus look-ahead/behind padding, in content coordinates.
    fn realization_rect(&self) -> Rect;

    /// Measures the item at `index` under `constraint` and returns its
    /// natural size, resolving (or lazily creating) its proxy first.
    ///
    /// Callers clamp `index` into `0..item_count()` before calling.
    fn measure_item(&mut self, index: usize, constraint: Size) -> Size;

    /// Places the item at `index` at `rect`, resolving its proxy first.
    ///
    /// Callers clamp `index` into `0..item_count()` before calling.
    fn arrange_item(&mut self, index: usize, rect: Rect);

    /// Opaque storage for layout state, scoped to this context's lifetime.
    fn layout_state(&mut self) -> &mut StateSlot;
}

/// An opaque, typed storage slot for per-context layout state.
///
/// Each layout keeps its pass-to-pass state here rather than on itself, so
/// the state is owned by (and dies with) the context it describes and no
/// two contexts ever share it. A layout takes its state out at the start of
/// a pass and puts it back at the end, leaving the context freely
/// borrowable in between.
///
/// The slot holds at most one value; storing a value replaces whatever was
/// there before, whatever its type.
#[derive(Default)]
pub struct StateSlot(Option<Box<dyn Any>>);

impl StateSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self(None)
    }

    /// Returns `true` if the slot holds no state.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns `true` if the slot currently holds a `T`.
    #[must_use]
    pub fn holds<T: Any>(&self) -> bool {
        self.0.as_deref().is_some_and(|state| state.is::<T>())
    }

    /// Removes and returns the stored state if it is a `T`.
    ///
    /// State of any other type is left in place.
    pub fn take<T: Any>(&mut self) -> Option<T> {
        match self.0.take()?.downcast::<T>() {
            Ok(state) => Some(*state),
            Err(other) => {
                self.0 = Some(other);
                None
            }
        }
    }

    /// Stores `state`, replacing whatever the slot held before.
    pub fn put<T: Any>(&mut self, state: T) {
        self.0 = Some(Box::new(state));
    }

    /// Returns a mutable reference to the stored state if it is a `T`.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Clears the slot.
    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl core::fmt::Debug for StateSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("StateSlot")
            .field(&if self.0.is_some() { "occupied" } else { "empty" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::StateSlot;

    #[test]
    fn take_returns_stored_state_and_empties_the_slot() {
        let mut slot = StateSlot::new();
        assert!(slot.is_empty());

        slot.put(7_u32);
        assert!(!slot.is_empty());
        assert!(slot.holds::<u32>());

        assert_eq!(slot.take::<u32>(), Some(7));
        assert!(slot.is_empty());
        assert_eq!(slot.take::<u32>(), None);
    }

    #[test]
    fn take_with_wrong_type_leaves_state_in_place() {
        let mut slot = StateSlot::new();
        slot.put(7_u32);

        assert_eq!(slot.take::<i64>(), None);
        assert!(slot.holds::<u32>());
        assert_eq!(slot.take::<u32>(), Some(7));
    }

    #[test]
    fn put_replaces_state_of_a_different_type() {
        let mut slot = StateSlot::new();
        slot.put(7_u32);
        slot.put(-3_i64);

        assert!(!slot.holds::<u32>());
        assert_eq!(slot.take::<i64>(), Some(-3));
    }

    #[test]
    fn get_mut_and_clear() {
        let mut slot = StateSlot::new();
        slot.put(7_u32);

        *slot.get_mut::<u32>().unwrap() += 1;
        assert_eq!(slot.get_mut::<u32>(), Some(&mut 8));
        assert_eq!(slot.get_mut::<i64>(), None);

        slot.clear();
        assert!(slot.is_empty());
    }
}
