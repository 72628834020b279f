//! Clustering of text items into visual lines.

use super::normalize::TextItem;
use std::collections::BTreeMap;

/// Items sharing a baseline, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Grouping key: the y of the item that opened the line
    pub y: i32,
    pub items: Vec<TextItem>,
}

impl Line {
    /// Leftmost x on the line.
    pub fn left(&self) -> i32 {
        self.items.first().map(|item| item.x).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.text.trim().is_empty())
    }
}

/// Group items by baseline.
///
/// Each item joins the first existing group (in ascending key order) whose key
/// lies within `tolerance` of its y, or opens a new group keyed by its own y.
/// The first match wins even when a later key is closer. Lines come back top
/// to bottom with items sorted by x; items with equal x keep supplied order.
pub fn group_lines(items: Vec<TextItem>, tolerance: i32) -> Vec<Line> {
    let mut groups: BTreeMap<i32, Vec<TextItem>> = BTreeMap::new();

    for item in items {
        let key = groups
            .keys()
            .copied()
            .find(|key| (key - item.y).abs() <= tolerance)
            .unwrap_or(item.y);
        groups.entry(key).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(y, mut items)| {
            items.sort_by_key(|item| item.x);
            Line { y, items }
        })
        .collect()
}
