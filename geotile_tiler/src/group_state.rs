// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Folding member group states into the state of a group.

use crate::types::GroupState;

/// Accumulates the [`GroupState`] of a group from the states of its members.
///
/// Every axis (selection, positive filter, region selection) is combined on its
/// own. The first member sets the axis; members that agree keep it; any
/// disagreement, or any member that is itself mixed, makes the axis "some".
/// The result does not depend on the order in which members are added.
///
/// ```
/// use geotile_tiler::{GroupState, GroupStateComputer};
///
/// let mut c = GroupStateComputer::new();
/// c.add_state(GroupState::SELECTED_ALL);
/// c.add_state(GroupState::empty());
/// assert_eq!(c.state(), GroupState::SELECTED_SOME);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupStateComputer {
    state: GroupState,
    seen: GroupState,
}

impl GroupStateComputer {
    /// A computer that has seen no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// The combined state so far.
    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Forget all members.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add a member on all three axes.
    pub fn add_state(&mut self, state: GroupState) {
        self.add_selected_state(state);
        self.add_filtered_positive_state(state);
        self.add_region_selected_state(state);
    }

    /// Add a member on the selection axis only.
    pub fn add_selected_state(&mut self, state: GroupState) {
        self.add_axis(state, GroupState::SELECTED_MASK);
    }

    /// Add a member on the positive-filter axis only.
    pub fn add_filtered_positive_state(&mut self, state: GroupState) {
        self.add_axis(state, GroupState::FILTERED_POSITIVE_MASK);
    }

    /// Add a member on the region-selection axis only.
    pub fn add_region_selected_state(&mut self, state: GroupState) {
        self.add_axis(state, GroupState::REGION_SELECTED_MASK);
    }

    fn add_axis(&mut self, state: GroupState, mask: GroupState) {
        let incoming = state & mask;
        if !self.seen.contains(mask) {
            self.state |= incoming;
            self.seen |= mask;
            return;
        }
        // "some" is every bit of the axis, so a mixed member saturates it too.
        if incoming != self.state & mask {
            self.state |= mask;
        }
    }
}
