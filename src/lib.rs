//! Frequent itemset mining by recursive elimination (RELIM).
//!
//! Given a collection of transactions and a relative minimum support in
//! `(0, 1]`, finds every item combination whose transaction count meets the
//! threshold, together with that count. Transactions are re-coded onto a
//! fixed elimination order (ascending global support); the engine then
//! repeatedly eliminates the lowest-ranked item, emits the frequent
//! itemsets rooted at it, and folds its suffix lists into the remaining
//! items. No candidate generation, no prefix tree: support counting and
//! database reduction happen in the same recursive pass.

pub mod database;
pub mod encode;
pub mod engine;
pub mod error;
pub mod index;
pub mod sink;
pub mod types;

pub use engine::MiningStats;
pub use error::{MiningError, Result};
pub use index::ItemIndex;
pub use sink::{ItemsetCollector, ResultSink};
pub use types::{
    FrequentItemsets, Inventory, ItemId, Itemset, RawTransaction, SupportCount, Transaction,
};

use database::{ConditionalDatabase, SuffixArena};
use engine::EliminationEngine;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Mines all frequent itemsets, returning them grouped by length together
/// with the mapping from item ranks back to item names.
pub fn mine_frequent_itemsets<'t>(
    transactions: &[RawTransaction<'t>],
    min_support: f64,
) -> Result<(FrequentItemsets, Inventory<'t>)> {
    let mut collector = ItemsetCollector::new();
    let (_, inventory) = mine_with_sink(transactions, min_support, &mut collector, None)?;
    Ok((collector.into_frequent_itemsets(), inventory))
}

/// Like [`mine_frequent_itemsets`], but mines top-level branches on the
/// rayon thread pool. Results are identical.
pub fn mine_frequent_itemsets_parallel<'t>(
    transactions: &[RawTransaction<'t>],
    min_support: f64,
) -> Result<(FrequentItemsets, Inventory<'t>)> {
    let mut collector = ItemsetCollector::new();
    let (_, inventory) = run(transactions, min_support, &mut collector, None, true)?;
    Ok((collector.into_frequent_itemsets(), inventory))
}

/// Streaming form: itemsets are handed to `sink` as they are discovered.
///
/// `cancel` is checked cooperatively at each top-level elimination; setting
/// it aborts the run with [`MiningError::Cancelled`].
pub fn mine_with_sink<'t, S: ResultSink>(
    transactions: &[RawTransaction<'t>],
    min_support: f64,
    sink: &mut S,
    cancel: Option<&AtomicBool>,
) -> Result<(MiningStats, Inventory<'t>)> {
    run(transactions, min_support, sink, cancel, false)
}

fn run<'t, S: ResultSink>(
    transactions: &[RawTransaction<'t>],
    min_support: f64,
    sink: &mut S,
    cancel: Option<&AtomicBool>,
    parallel: bool,
) -> Result<(MiningStats, Inventory<'t>)> {
    let started = Instant::now();

    let index = ItemIndex::build(transactions)?;
    let min_count = index.min_count(min_support)?;
    let encoded = encode::encode(transactions, &index, min_count);
    let arena = SuffixArena::from_transactions(encoded);

    let mut stats = if arena.is_empty() {
        MiningStats::default()
    } else {
        let db = ConditionalDatabase::build(&arena, index.num_items())?;
        if parallel {
            engine::mine_parallel(db, min_count, sink, cancel)?
        } else {
            EliminationEngine::new(min_count, sink, cancel).run(db)?
        }
    };
    stats.duration = started.elapsed();

    log::info!(
        "mined {} frequent itemsets in {} eliminations over {} transactions ({:?})",
        stats.frequent_itemsets,
        stats.eliminations,
        index.num_transactions(),
        stats.duration
    );

    Ok((stats, index.inventory()))
}
