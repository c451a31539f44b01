//! Account-range index
//!
//! Intervals `[low, high] -> key` are collected in memory and published as a
//! balanced, max-augmented interval tree. Each node is the median of its
//! slice of entries sorted by `(low, high)`, and `max` is the largest `high`
//! in its subtree, which lets a reader prune whole subtrees while stabbing.
//!
//! # Serialized form
//!
//! ```text
//! {"size":2,"root":{"low":"400000","high":"400099","max":"499999","value":"...","left":null,"right":{...}}}
//! ```
//!
//! Bounds are decimal strings because account ranges do not fit in 64 bits.

use num_bigint::BigUint;
use serde::Serialize;

use crate::error::IndexError;

/// Index contract used by the orchestrator
pub trait RangeIndex {
    /// Add `[low, high] -> key`; `low > high` is rejected
    fn insert(&mut self, low: BigUint, high: BigUint, key: String) -> Result<(), IndexError>;

    /// Publishable form, with every stored key passed through `encode`
    fn serialize(&self, encode: &dyn Fn(&str) -> String) -> Result<String, IndexError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    low: BigUint,
    high: BigUint,
    key: String,
}

/// In-memory interval index
#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    entries: Vec<Interval>,
}

impl IntervalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the balanced tree over the current entries
    pub fn build_tree(&self) -> IntervalTree {
        let mut sorted: Vec<&Interval> = self.entries.iter().collect();
        sorted.sort_by(|a, b| (&a.low, &a.high).cmp(&(&b.low, &b.high)));

        IntervalTree {
            size: sorted.len(),
            root: TreeNode::build(&sorted),
        }
    }
}

impl RangeIndex for IntervalIndex {
    fn insert(&mut self, low: BigUint, high: BigUint, key: String) -> Result<(), IndexError> {
        if low > high {
            return Err(IndexError::InvertedInterval {
                low: low.to_string(),
                high: high.to_string(),
            });
        }
        self.entries.push(Interval { low, high, key });
        Ok(())
    }

    fn serialize(&self, encode: &dyn Fn(&str) -> String) -> Result<String, IndexError> {
        let tree = self.build_tree();
        let snapshot = SerializedTree {
            size: tree.size,
            root: tree.root.as_deref().map(|node| node.to_serialized(encode)),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Balanced interval tree built from an [`IntervalIndex`]
#[derive(Debug, Clone)]
pub struct IntervalTree {
    size: usize,
    root: Option<Box<TreeNode>>,
}

#[derive(Debug, Clone)]
struct TreeNode {
    low: BigUint,
    high: BigUint,
    max: BigUint,
    key: String,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn build(sorted: &[&Interval]) -> Option<Box<TreeNode>> {
        if sorted.is_empty() {
            return None;
        }

        let mid = sorted.len() / 2;
        let entry = sorted[mid];
        let left = Self::build(&sorted[..mid]);
        let right = Self::build(&sorted[mid + 1..]);

        let max = [left.as_deref(), right.as_deref()]
            .into_iter()
            .flatten()
            .map(|child| &child.max)
            .fold(&entry.high, |acc, m| acc.max(m))
            .clone();

        Some(Box::new(TreeNode {
            low: entry.low.clone(),
            high: entry.high.clone(),
            max,
            key: entry.key.clone(),
            left,
            right,
        }))
    }

    fn stab<'a>(&'a self, point: &BigUint, hits: &mut Vec<&'a str>) {
        if &self.max < point {
            return;
        }
        if let Some(left) = &self.left {
            left.stab(point, hits);
        }
        if &self.low <= point && point <= &self.high {
            hits.push(&self.key);
        }
        // Every interval on the right starts at or after this one
        if &self.low <= point {
            if let Some(right) = &self.right {
                right.stab(point, hits);
            }
        }
    }

    fn to_serialized(&self, encode: &dyn Fn(&str) -> String) -> SerializedNode {
        SerializedNode {
            low: self.low.to_string(),
            high: self.high.to_string(),
            max: self.max.to_string(),
            value: encode(&self.key),
            left: self.left.as_deref().map(|n| Box::new(n.to_serialized(encode))),
            right: self.right.as_deref().map(|n| Box::new(n.to_serialized(encode))),
        }
    }

    fn height(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |n| n.height());
        let right = self.right.as_ref().map_or(0, |n| n.height());
        1 + left.max(right)
    }
}

impl IntervalTree {
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.height())
    }

    /// Keys of every interval containing `point`, in `(low, high)` order
    pub fn stab(&self, point: &BigUint) -> Vec<&str> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            root.stab(point, &mut hits);
        }
        hits
    }
}

#[derive(Serialize)]
struct SerializedTree {
    size: usize,
    root: Option<SerializedNode>,
}

#[derive(Serialize)]
struct SerializedNode {
    low: String,
    high: String,
    max: String,
    value: String,
    left: Option<Box<SerializedNode>>,
    right: Option<Box<SerializedNode>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let mut index = IntervalIndex::new();
        let err = index.insert(big(10), big(5), "k".to_string()).unwrap_err();
        assert!(matches!(err, IndexError::InvertedInterval { .. }));
        assert!(index.is_empty());
    }

    #[test]
    fn test_empty_serialization() {
        let index = IntervalIndex::new();
        let json = index.serialize(&|k| k.to_string()).unwrap();
        assert_eq!(json, r#"{"size":0,"root":null}"#);
    }

    #[test]
    fn test_single_entry_serialization() {
        let mut index = IntervalIndex::new();
        index
            .insert(big(400002000000000000), big(400002999999999999), "key1".to_string())
            .unwrap();

        let json = index.serialize(&|k| format!("rec:{}", k)).unwrap();
        assert!(!json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["size"], 1);
        assert_eq!(value["root"]["low"], "400002000000000000");
        assert_eq!(value["root"]["high"], "400002999999999999");
        assert_eq!(value["root"]["max"], "400002999999999999");
        assert_eq!(value["root"]["value"], "rec:key1");
        assert!(value["root"]["left"].is_null());
    }

    #[test]
    fn test_median_root_and_max_augmentation() {
        let mut index = IntervalIndex::new();
        index.insert(big(30), big(35), "c".to_string()).unwrap();
        index.insert(big(10), big(100), "a".to_string()).unwrap();
        index.insert(big(20), big(25), "b".to_string()).unwrap();

        let json = index.serialize(&|k| k.to_string()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["root"]["value"], "b");
        assert_eq!(value["root"]["max"], "100");
        assert_eq!(value["root"]["left"]["value"], "a");
        assert_eq!(value["root"]["right"]["value"], "c");
    }

    #[test]
    fn test_wide_bounds() {
        let low: BigUint = "123456789012345678901234".parse().unwrap();
        let high: BigUint = "123456789012345678909999".parse().unwrap();

        let mut index = IntervalIndex::new();
        index.insert(low.clone(), high, "wide".to_string()).unwrap();

        assert_eq!(index.build_tree().stab(&low), vec!["wide"]);
    }

    #[test]
    fn test_tree_is_balanced() {
        let mut index = IntervalIndex::new();
        for i in 0..1000u64 {
            index.insert(big(i * 10), big(i * 10 + 5), i.to_string()).unwrap();
        }

        let tree = index.build_tree();
        assert_eq!(tree.len(), 1000);
        assert!(tree.height() <= 10);
    }

    proptest! {
        #[test]
        fn prop_stab_finds_every_containing_interval(
            intervals in prop::collection::vec((0u64..1000, 0u64..200), 0..60),
            point in 0u64..1200,
        ) {
            let mut index = IntervalIndex::new();
            for (i, (low, len)) in intervals.iter().enumerate() {
                index.insert(big(*low), big(low + len), i.to_string()).unwrap();
            }

            let tree = index.build_tree();
            let mut found: Vec<String> =
                tree.stab(&big(point)).into_iter().map(String::from).collect();
            found.sort();

            let mut expected: Vec<String> = intervals
                .iter()
                .enumerate()
                .filter(|(_, (low, len))| *low <= point && point <= low + len)
                .map(|(i, _)| i.to_string())
                .collect();
            expected.sort();

            prop_assert_eq!(found, expected);
        }
    }
}
