//! Ordered set of pending floors for one travel direction.
//!
//! The up-set is read in ascending order and the down-set in descending order, so the
//! head of either set is the stop the car reaches first when sweeping in that direction.
//! Backed by a `BTreeSet`, which gives O(log n) insert, remove and peek.

use std::collections::BTreeSet;

use crate::elevator_logic::Floor;
use crate::error::{Error, Result};
use crate::snapshot::Dirn;

/// Pending floors for one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorRequestSet {
    dirn: Dirn,
    min_floor: Floor,
    max_floor: Floor,
    floors: BTreeSet<Floor>,
}

impl FloorRequestSet {
    /// Creates an empty set for `dirn` accepting floors in `[min_floor, max_floor]`.
    ///
    /// `dirn` must be [Dirn::Up] or [Dirn::Down]; [Dirn::Idle] is treated as up.
    pub fn new(dirn: Dirn, min_floor: Floor, max_floor: Floor) -> Self {
        let dirn = if dirn == Dirn::Down { Dirn::Down } else { Dirn::Up };
        Self { dirn, min_floor, max_floor, floors: BTreeSet::new() }
    }

    /// Direction this set serves.
    pub fn dirn(&self) -> Dirn {
        self.dirn
    }

    /// Adds `floor`.
    ///
    /// ## Returns
    /// - `Ok(true)` if the floor was added
    /// - `Ok(false)` if it was already pending (insert is idempotent)
    /// - [Error::InvalidFloor] if the floor is out of range; the set is left unchanged
    pub fn insert(&mut self, floor: Floor) -> Result<bool> {
        if floor < self.min_floor || floor > self.max_floor {
            return Err(Error::InvalidFloor { floor, min: self.min_floor, max: self.max_floor });
        }
        Ok(self.floors.insert(floor))
    }

    /// Nearest pending floor from `from_floor` in this set's direction, without removing it.
    ///
    /// Up-set: smallest floor `>= from_floor`. Down-set: largest floor `<= from_floor`.
    /// `None` if no floor lies that way.
    pub fn peek_nearest(&self, from_floor: Floor) -> Option<Floor> {
        match self.dirn {
            Dirn::Down => self.floors.range(..=from_floor).next_back().copied(),
            _ => self.floors.range(from_floor..).next().copied(),
        }
    }

    /// First floor in the set's ordering (lowest for up, highest for down).
    pub fn first(&self) -> Option<Floor> {
        match self.dirn {
            Dirn::Down => self.floors.last().copied(),
            _ => self.floors.first().copied(),
        }
    }

    /// Last floor in the set's ordering (highest for up, lowest for down).
    pub fn last(&self) -> Option<Floor> {
        match self.dirn {
            Dirn::Down => self.floors.first().copied(),
            _ => self.floors.last().copied(),
        }
    }

    /// Removes `floor` if present. Returns `true` if something was removed.
    pub fn remove(&mut self, floor: Floor) -> bool {
        self.floors.remove(&floor)
    }

    /// `true` iff no pending floors remain.
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    /// Number of pending floors.
    pub fn len(&self) -> usize {
        self.floors.len()
    }

    /// `true` if `floor` is pending.
    pub fn contains(&self, floor: Floor) -> bool {
        self.floors.contains(&floor)
    }

    /// Removes every pending floor.
    pub fn clear(&mut self) {
        self.floors.clear();
    }

    /// Pending floors in this set's ordering.
    pub fn to_vec(&self) -> Vec<Floor> {
        match self.dirn {
            Dirn::Down => self.floors.iter().rev().copied().collect(),
            _ => self.floors.iter().copied().collect(),
        }
    }
}
