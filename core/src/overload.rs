//! Overload enumeration.
//!
//! A command declares one ordered slot list; each optional slot may be kept
//! or dropped independently, so `k` optional slots yield `2^k` concrete
//! overloads. [`expand_overloads`] produces all of them in a stable order
//! (overloads without a slot come before overloads with it), and
//! [`prune_redundant`] drops every overload that a longer overload already
//! expresses by omitting its trailing optional slots.
//!
//! # Example
//!
//! ```
//! use command_args_core::{Schema, Slot, enumerate_overloads, expand_overloads};
//!
//! let slots = vec![
//!     Slot::required("key", Schema::Text),
//!     Slot::optional("count", Schema::Integer),
//! ];
//! assert_eq!(expand_overloads(&slots).len(), 2);
//!
//! // `(key)` is a truncation of `(key, count?)`.
//! let pruned = enumerate_overloads(&slots);
//! assert_eq!(pruned.len(), 1);
//! assert_eq!(pruned[0].names(), vec!["key", "count"]);
//! ```

use serde::Serialize;

use crate::Slot;
use crate::signature::render_slots;

/// One concrete ordered selection of a command's slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overload {
    pub slots: Vec<Slot>,
}

impl Overload {
    /// Number of slots in this overload.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` for the overload that takes no arguments.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot names in order.
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.name.as_str()).collect()
    }

    /// Rendered parameter list, e.g. `(key: string, count?: integer)`.
    pub fn signature(&self) -> String {
        render_slots(&self.slots)
    }

    /// Prefixes this overload can also satisfy by omitting trailing
    /// optional slots, shortest first. Always ends with the full overload.
    pub fn covers(&self) -> impl Iterator<Item = &[Slot]> {
        (0..=self.slots.len())
            .filter(move |&cut| self.slots[cut..].iter().all(|slot| slot.optional))
            .map(move |cut| &self.slots[..cut])
    }

    /// Returns `true` if `other` is a strictly shorter truncation of this
    /// overload.
    pub fn subsumes(&self, other: &Overload) -> bool {
        self.len() > other.len() && self.covers().any(|prefix| prefix == other.slots.as_slice())
    }
}

/// Enumerates every overload of `slots`, before redundancy removal.
///
/// Produces exactly `2^k` overloads for `k` optional slots.
pub fn expand_overloads(slots: &[Slot]) -> Vec<Overload> {
    expand(slots)
        .into_iter()
        .map(|selection| Overload {
            slots: selection.into_iter().cloned().collect(),
        })
        .collect()
}

/// Removes overloads that are a strict trailing-optional truncation of
/// another overload in the list. Relative order of survivors is kept.
pub fn prune_redundant(overloads: Vec<Overload>) -> Vec<Overload> {
    let keep: Vec<bool> = overloads
        .iter()
        .map(|candidate| !overloads.iter().any(|other| other.subsumes(candidate)))
        .collect();

    overloads
        .into_iter()
        .zip(keep)
        .filter_map(|(overload, keep)| keep.then_some(overload))
        .collect()
}

/// Enumerates the overloads of `slots` with redundant truncations removed.
pub fn enumerate_overloads(slots: &[Slot]) -> Vec<Overload> {
    prune_redundant(expand_overloads(slots))
}

fn expand(slots: &[Slot]) -> Vec<Vec<&Slot>> {
    let Some((head, tail)) = slots.split_first() else {
        return vec![Vec::new()];
    };

    let without_head = expand(tail);
    let with_head: Vec<Vec<&Slot>> = without_head
        .iter()
        .map(|rest| std::iter::once(head).chain(rest.iter().copied()).collect())
        .collect();

    if head.optional {
        let mut all = without_head;
        all.extend(with_head);
        all
    } else {
        with_head
    }
}
