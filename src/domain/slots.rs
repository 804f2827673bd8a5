//! Slot address space for a job category.
//!
//! A category's concurrency bound of `limit` is materialized as `limit`
//! named slots in the shared store. Slot keys are derived purely from the
//! category name and the slot ordinal, so every participant that agrees on
//! `(job_category, limit)` addresses exactly the same slots without any
//! coordination or discovery step.
//!
//! Changing `limit` for a category changes the address space: shrinking it
//! orphans occupants in slots above the new range, growing it introduces
//! fresh always-free slots. Callers must keep `limit` consistent per
//! category.

use std::fmt;

/// Generate the ordered slot key sequence for a job category.
///
/// The `i`-th key is `{job_category}-{i}` for `i` in `[0, limit)`. The
/// sequence is deterministic and stable across calls as long as `limit` is
/// unchanged; `limit = 0` yields an empty sequence.
///
/// # Example
/// ```
/// use slotgate::slot_keys;
///
/// assert_eq!(slot_keys("deploy", 3), vec!["deploy-0", "deploy-1", "deploy-2"]);
/// assert!(slot_keys("deploy", 0).is_empty());
/// ```
pub fn slot_keys(job_category: &str, limit: usize) -> Vec<String> {
    (0..limit)
        .map(|ordinal| format!("{}-{}", job_category, ordinal))
        .collect()
}

/// One slot of a category: its key and its current occupant.
///
/// `occupant` is `None` when the slot is free (the store holds no value for
/// the key, the value's TTL has elapsed, or the stored value is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    key: String,
    occupant: Option<String>,
}

impl Slot {
    /// The slot's key in the store.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The job identifier occupying this slot, or `None` if free.
    pub fn occupant(&self) -> Option<&str> {
        self.occupant.as_deref()
    }

    /// Whether the slot is free.
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.occupant {
            Some(job_id) => write!(f, "{} -> {}", self.key, job_id),
            None => write!(f, "{} -> (free)", self.key),
        }
    }
}

/// Ordered view of a category's slots and their occupants.
///
/// Built by zipping the slot key sequence positionally with the values a
/// bulk read returned. Iteration order is ordinal order (`cat-0` first), so
/// scans over a `SlotMap` are deterministic: admission always lands in the
/// lowest free ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMap {
    slots: Vec<Slot>,
}

impl SlotMap {
    /// Zip slot keys with the positionally-aligned occupants of a bulk read.
    ///
    /// Callers guarantee the two sequences have equal length; the store
    /// contract requires bulk reads to return one value per key. An empty
    /// value reads as free, the same as an absent one: other participants
    /// may persist `""` for a slot this crate would leave unset.
    pub(crate) fn zip(keys: Vec<String>, occupants: Vec<Option<String>>) -> Self {
        debug_assert_eq!(keys.len(), occupants.len());
        let slots = keys
            .into_iter()
            .zip(occupants)
            .map(|(key, occupant)| Slot {
                key,
                occupant: occupant.filter(|job_id| !job_id.is_empty()),
            })
            .collect();
        Self { slots }
    }

    /// Look up a slot by key.
    pub fn get(&self, slot_key: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.key == slot_key)
    }

    /// The occupant of `slot_key`, or `None` if the slot is free or the key
    /// is not part of this category's address space.
    pub fn occupant(&self, slot_key: &str) -> Option<&str> {
        self.get(slot_key).and_then(Slot::occupant)
    }

    /// The first free slot in ordinal order, if any.
    pub fn first_free(&self) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.is_free())
    }

    /// All slots currently held by `job_id`, in ordinal order.
    ///
    /// Normally at most one, but concurrent admissions can leave the same
    /// identifier in several slots; release must visit all of them.
    pub fn slots_held_by<'a>(&'a self, job_id: &'a str) -> impl Iterator<Item = &'a Slot> + 'a {
        self.slots
            .iter()
            .filter(move |slot| slot.occupant() == Some(job_id))
    }

    /// Iterate over all slots in ordinal order.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    /// Total number of slots (the category's `limit`).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the category has no slots at all (`limit = 0`).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    /// Number of free slots.
    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_free()).count()
    }
}

impl<'a> IntoIterator for &'a SlotMap {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
