//! crates/nulis_core/src/reconcile.rs
//!
//! Link-set reconciliation for editor saves. The editor holds the set of
//! outgoing link targets loaded before editing began and the set it wants
//! after the save; the difference decides which links to create and which
//! to delete. The diff baseline must be the pre-edit set, so callers load
//! existing links first.

use std::collections::HashSet;

use uuid::Uuid;

/// The outcome of diffing the previous outgoing-link targets against the
/// desired set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Targets present in the new set but absent from the old: links to create.
    pub to_add: Vec<Uuid>,
    /// Targets present in the old set but absent from the new: links to delete.
    pub to_remove: Vec<Uuid>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Pure set diff between the previously-loaded outgoing targets and the
/// desired ones. Order of the returned vectors follows the iteration order
/// of the inputs and carries no meaning.
pub fn reconcile(old: &HashSet<Uuid>, new: &HashSet<Uuid>) -> Reconciliation {
    Reconciliation {
        to_add: new.difference(old).copied().collect(),
        to_remove: old.difference(new).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn identical_sets_are_a_noop() {
        let targets: HashSet<Uuid> = ids(3).into_iter().collect();
        let diff = reconcile(&targets, &targets.clone());
        assert!(diff.is_noop());
    }

    #[test]
    fn empty_old_set_adds_everything() {
        let new: HashSet<Uuid> = ids(2).into_iter().collect();
        let diff = reconcile(&HashSet::new(), &new);
        assert_eq!(diff.to_add.len(), 2);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn empty_new_set_removes_everything() {
        let old: HashSet<Uuid> = ids(2).into_iter().collect();
        let diff = reconcile(&old, &HashSet::new());
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove.len(), 2);
    }

    #[test]
    fn partial_overlap_splits_both_ways() {
        let keep = Uuid::new_v4();
        let dropped = Uuid::new_v4();
        let added = Uuid::new_v4();

        let old: HashSet<Uuid> = [keep, dropped].into_iter().collect();
        let new: HashSet<Uuid> = [keep, added].into_iter().collect();

        let diff = reconcile(&old, &new);
        assert_eq!(diff.to_add, vec![added]);
        assert_eq!(diff.to_remove, vec![dropped]);
    }
}
