use std::collections::{HashMap, HashSet};

/// An item's rank in the global elimination order (0 is eliminated first).
pub type ItemId = usize;
pub type ItemName<'l> = &'l str;
pub type Itemset = Vec<ItemId>;

pub type ReverseLookup<'l> = HashMap<ItemName<'l>, ItemId>;
pub type Inventory<'l> = HashMap<ItemId, ItemName<'l>>;

pub type RawTransaction<'l> = HashSet<ItemName<'l>>;
/// An encoded transaction: item ranks, strictly ascending.
pub type Transaction = Vec<ItemId>;

pub type SupportCount = u32;
pub type ItemsetCounts = HashMap<Itemset, SupportCount>;

pub type ItemsetLength = usize;
pub type FrequentItemsets = HashMap<ItemsetLength, ItemsetCounts>;
