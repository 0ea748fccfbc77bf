use crate::error::{MiningError, Result};
use crate::types::{Inventory, ItemName, RawTransaction, ReverseLookup, SupportCount};
use std::collections::HashMap;

/// Assigns each distinct item a rank in the global elimination order and
/// tracks its support (number of transactions containing it).
///
/// Ranks ascend by support, ties broken by first appearance in the input,
/// so the rarest item is eliminated first. Every downstream component uses
/// these ranks; items are never re-sorted per call.
pub struct ItemIndex<'l> {
    ranks: ReverseLookup<'l>,
    names: Vec<ItemName<'l>>,
    supports: Vec<SupportCount>,
    num_transactions: usize,
}

impl<'l> ItemIndex<'l> {
    /// Single scan over the dataset: count occurrences, then rank.
    pub fn build(transactions: &[RawTransaction<'l>]) -> Result<ItemIndex<'l>> {
        if transactions.is_empty() {
            return Err(MiningError::EmptyDataset);
        }

        let mut first_seen: ReverseLookup<'l> = HashMap::new();
        let mut names: Vec<ItemName<'l>> = Vec::new();
        let mut counts: Vec<SupportCount> = Vec::new();

        for transaction in transactions {
            for &item in transaction {
                let id = *first_seen.entry(item).or_insert_with(|| {
                    names.push(item);
                    counts.push(0);
                    names.len() - 1
                });
                counts[id] += 1;
            }
        }

        let mut order: Vec<usize> = (0..names.len()).collect();
        order.sort_unstable_by_key(|&id| (counts[id], id));

        let mut ranks = HashMap::with_capacity(names.len());
        let mut ranked_names = Vec::with_capacity(names.len());
        let mut supports = Vec::with_capacity(names.len());
        for (rank, &id) in order.iter().enumerate() {
            ranks.insert(names[id], rank);
            ranked_names.push(names[id]);
            supports.push(counts[id]);
        }

        log::debug!(
            "indexed {} distinct items over {} transactions",
            ranked_names.len(),
            transactions.len()
        );

        Ok(ItemIndex {
            ranks,
            names: ranked_names,
            supports,
            num_transactions: transactions.len(),
        })
    }

    /// Converts the relative threshold into the absolute transaction count
    /// used everywhere downstream.
    pub fn min_count(&self, min_support: f64) -> Result<SupportCount> {
        if !(min_support > 0.0 && min_support <= 1.0) {
            return Err(MiningError::InvalidSupport(min_support));
        }
        let count = (min_support * self.num_transactions as f64).ceil() as SupportCount;
        Ok(count.max(1))
    }

    pub fn rank_of(&self, item: ItemName<'_>) -> Option<usize> {
        self.ranks.get(item).copied()
    }

    pub fn support_of(&self, rank: usize) -> SupportCount {
        self.supports[rank]
    }

    pub fn num_items(&self) -> usize {
        self.names.len()
    }

    pub fn num_transactions(&self) -> usize {
        self.num_transactions
    }

    pub fn inventory(&self) -> Inventory<'l> {
        self.names.iter().copied().enumerate().collect()
    }
}
