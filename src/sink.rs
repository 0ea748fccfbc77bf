use crate::types::{FrequentItemsets, ItemId, Itemset, SupportCount};
use std::collections::HashMap;

/// Receives `(itemset, support)` pairs as the engine discovers them.
///
/// Itemsets arrive in depth-first discovery order; no ordering across
/// itemsets of different sizes is promised. An emitted pair is final and
/// never revised.
pub trait ResultSink {
    fn emit(&mut self, itemset: &[ItemId], support: SupportCount);
}

/// In-memory sink preserving discovery order.
#[derive(Default)]
pub struct ItemsetCollector {
    pub itemsets: Vec<(Itemset, SupportCount)>,
}

impl ItemsetCollector {
    pub fn new() -> ItemsetCollector {
        ItemsetCollector::default()
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Groups the collected itemsets by length.
    pub fn into_frequent_itemsets(self) -> FrequentItemsets {
        let mut grouped: FrequentItemsets = HashMap::new();
        for (itemset, support) in self.itemsets {
            grouped
                .entry(itemset.len())
                .or_insert_with(HashMap::new)
                .insert(itemset, support);
        }
        grouped
    }
}

impl ResultSink for ItemsetCollector {
    fn emit(&mut self, itemset: &[ItemId], support: SupportCount) {
        self.itemsets.push((itemset.to_vec(), support));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn collector_preserves_discovery_order() {
        let mut collector = ItemsetCollector::new();
        collector.emit(&[0], 3);
        collector.emit(&[0, 1], 2);
        collector.emit(&[1], 3);

        assert_eq!(
            collector.itemsets,
            vec![(vec![0], 3), (vec![0, 1], 2), (vec![1], 3)]
        );
    }

    #[test]
    fn grouping_by_length() {
        let mut collector = ItemsetCollector::new();
        collector.emit(&[0], 3);
        collector.emit(&[0, 1], 2);
        collector.emit(&[1], 3);

        let expected = hashmap! {
            1 => hashmap! { vec![0] => 3, vec![1] => 3 },
            2 => hashmap! { vec![0, 1] => 2 },
        };
        assert_eq!(collector.into_frequent_itemsets(), expected);
    }
}
