//! Presence partitioning.
//!
//! Splits a permitted-user set into online and offline halves against the
//! set of user ids with at least one live connection in a room. Broadcasts
//! always carry full snapshots, never diffs, so recomputation here is the
//! whole protocol.

use std::collections::HashSet;

/// Partition `members` by live presence, preserving input order.
///
/// A user with multiple simultaneous connections is online if any of them
/// is present in `online_ids`.
pub fn partition_by_online<T, F>(
    members: Vec<T>,
    online_ids: &HashSet<i64>,
    user_id: F,
) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> i64,
{
    members
        .into_iter()
        .partition(|m| online_ids.contains(&user_id(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_splits_by_presence() {
        let members = vec![1i64, 2, 3, 4];
        let online: HashSet<i64> = [2, 4].into_iter().collect();

        let (on, off) = partition_by_online(members, &online, |m| *m);
        assert_eq!(on, vec![2, 4]);
        assert_eq!(off, vec![1, 3]);
    }

    #[test]
    fn test_empty_online_set_marks_everyone_offline() {
        let (on, off) = partition_by_online(vec![7i64, 8], &HashSet::new(), |m| *m);
        assert!(on.is_empty());
        assert_eq!(off, vec![7, 8]);
    }

    #[test]
    fn test_partition_preserves_order() {
        let members = vec![(5i64, "e"), (3, "c"), (9, "i")];
        let online: HashSet<i64> = [9, 5].into_iter().collect();

        let (on, off) = partition_by_online(members, &online, |m| m.0);
        assert_eq!(on, vec![(5, "e"), (9, "i")]);
        assert_eq!(off, vec![(3, "c")]);
    }
}
