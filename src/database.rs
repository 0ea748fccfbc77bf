use crate::error::{MiningError, Result};
use crate::types::{ItemId, SupportCount, Transaction};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

/// Immutable store of the encoded transactions.
///
/// Every suffix that ever appears during mining is a tail of one of these
/// sequences, so a `(sequence, start)` handle pair names any of them and
/// dropping a suffix's first item is just `start + 1`. One arena serves the
/// whole run; conditional databases only hold handles into it, which keeps
/// sibling branches free of shared mutable state.
pub struct SuffixArena {
    seqs: Vec<Transaction>,
}

impl SuffixArena {
    pub fn from_transactions(seqs: Vec<Transaction>) -> SuffixArena {
        SuffixArena { seqs }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    fn suffix(&self, r: SuffixRef) -> &[ItemId] {
        &self.seqs[r.seq as usize][r.start as usize..]
    }
}

/// Handle to a suffix: tail of arena sequence `seq` starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixRef {
    seq: u32,
    start: u32,
}

impl SuffixRef {
    fn rest(self) -> SuffixRef {
        SuffixRef {
            seq: self.seq,
            start: self.start + 1,
        }
    }
}

/// A distinct suffix together with how many transactions carry it.
#[derive(Debug, Clone, Copy)]
pub struct SuffixEntry {
    pub suffix: SuffixRef,
    pub count: SupportCount,
}

/// The suffix list owned by one item: every transaction (in the current
/// context) in which that item is the smallest remaining one.
///
/// Entries with identical suffixes are merged on insert, keyed by a hash of
/// the item sequence with an equality check on collision. `singletons`
/// counts the transactions whose suffix is empty, so
/// `total = Σ entry.count + singletons` is the owner's support.
#[derive(Default)]
pub struct ItemBucket {
    entries: Vec<SuffixEntry>,
    by_hash: FxHashMap<u64, Vec<u32>>,
    singletons: SupportCount,
    total: SupportCount,
}

impl ItemBucket {
    /// The owner's support within the current recursion context.
    pub fn support(&self) -> SupportCount {
        self.total
    }

    pub fn entries(&self) -> &[SuffixEntry] {
        &self.entries
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    fn insert(&mut self, arena: &SuffixArena, suffix: SuffixRef, count: SupportCount) -> Result<()> {
        if count == 0 {
            return Err(MiningError::CorruptDatabase("zero multiplicity"));
        }
        self.total += count;

        let items = arena.suffix(suffix);
        if items.is_empty() {
            self.singletons += count;
            return Ok(());
        }

        let slots = self.by_hash.entry(hash_items(items)).or_default();
        for &slot in slots.iter() {
            let entry = &mut self.entries[slot as usize];
            if arena.suffix(entry.suffix) == items {
                entry.count += count;
                return Ok(());
            }
        }
        slots.push(self.entries.len() as u32);
        self.entries.push(SuffixEntry { suffix, count });
        Ok(())
    }
}

fn hash_items(items: &[ItemId]) -> u64 {
    let mut hasher = FxHasher::default();
    items.hash(&mut hasher);
    hasher.finish()
}

/// Per-item suffix lists for the ranks `base..limit`, borrowing the shared
/// arena. Built once from the encoded transactions, then destructively
/// consumed rank by rank during elimination.
pub struct ConditionalDatabase<'a> {
    arena: &'a SuffixArena,
    buckets: Vec<ItemBucket>,
    base: ItemId,
}

impl<'a> ConditionalDatabase<'a> {
    /// Bulk insert: transaction `[i0, i1, ..., ik]` contributes the suffix
    /// `(i1, ..., ik)` with multiplicity 1 under owner `i0`.
    pub fn build(arena: &'a SuffixArena, num_items: usize) -> Result<ConditionalDatabase<'a>> {
        let mut db = ConditionalDatabase {
            arena,
            buckets: (0..num_items).map(|_| ItemBucket::default()).collect(),
            base: 0,
        };
        for seq in 0..arena.len() {
            let whole = SuffixRef {
                seq: seq as u32,
                start: 0,
            };
            let items = arena.suffix(whole);
            if items.is_empty() {
                return Err(MiningError::CorruptDatabase("empty transaction in arena"));
            }
            db.insert(items[0], whole.rest(), 1)?;
        }
        Ok(db)
    }

    fn empty_after(arena: &'a SuffixArena, owner: ItemId, limit: ItemId) -> ConditionalDatabase<'a> {
        ConditionalDatabase {
            arena,
            buckets: (owner + 1..limit).map(|_| ItemBucket::default()).collect(),
            base: owner + 1,
        }
    }

    /// Lowest rank this database covers (not necessarily populated).
    pub fn base(&self) -> ItemId {
        self.base
    }

    /// One past the highest rank this database covers.
    pub fn limit(&self) -> ItemId {
        self.base + self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.total == 0)
    }

    fn insert(&mut self, owner: ItemId, suffix: SuffixRef, count: SupportCount) -> Result<()> {
        if owner < self.base || owner >= self.limit() {
            return Err(MiningError::CorruptDatabase("owner outside database range"));
        }
        let base = self.base;
        let arena = self.arena;
        self.buckets[owner - base].insert(arena, suffix, count)
    }

    /// Removes and returns `rank`'s suffix list, leaving an empty bucket.
    pub fn take_bucket(&mut self, rank: ItemId) -> ItemBucket {
        std::mem::take(&mut self.buckets[rank - self.base])
    }

    /// Builds the conditional database restricted to `owner`'s suffixes:
    /// each entry re-owned by its first suffix item, first item dropped,
    /// multiplicity carried over.
    pub fn project(&self, bucket: &ItemBucket, owner: ItemId) -> Result<ConditionalDatabase<'a>> {
        let mut projected = ConditionalDatabase::empty_after(self.arena, owner, self.limit());
        for entry in &bucket.entries {
            let items = self.arena.suffix(entry.suffix);
            let next_owner = items[0];
            if next_owner <= owner {
                return Err(MiningError::CorruptDatabase("suffix not ordered after owner"));
            }
            projected.insert(next_owner, entry.suffix.rest(), entry.count)?;
        }
        Ok(projected)
    }

    /// Folds `owner`'s suffix list back into the remaining items: every
    /// entry moves to the bucket of its first suffix item with the first
    /// item dropped; exhausted suffixes are discarded. Later items then see
    /// `owner`'s transactions when their own support is computed.
    pub fn redistribute(&mut self, bucket: ItemBucket, owner: ItemId) -> Result<()> {
        for entry in bucket.entries {
            let items = self.arena.suffix(entry.suffix);
            let next_owner = items[0];
            if next_owner <= owner {
                return Err(MiningError::CorruptDatabase("suffix not ordered after owner"));
            }
            self.insert(next_owner, entry.suffix.rest(), entry.count)?;
        }
        Ok(())
    }
}
