use crate::database::ConditionalDatabase;
use crate::error::{MiningError, Result};
use crate::sink::{ItemsetCollector, ResultSink};
use crate::types::{ItemId, Itemset, SupportCount};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Observational counters for one mining run. No effect on results.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MiningStats {
    /// Items eliminated across all recursion levels.
    pub eliminations: u64,
    /// Frequent itemsets emitted.
    pub frequent_itemsets: u64,
    /// Wall-clock time of the whole run.
    pub duration: Duration,
}

/// The recursive elimination loop.
///
/// Each level walks its database's ranks in ascending order. The lowest
/// remaining rank is eliminated: if frequent, `prefix + {rank}` is emitted
/// and the database projected onto the rank's suffixes is mined under the
/// extended prefix; afterwards the rank's suffixes are redistributed to the
/// remaining items and the walk continues. Every item is eliminated exactly
/// once per context, so recursion depth is bounded by the number of
/// distinct items.
///
/// Redistribution happens even when the rank is infrequent in its context:
/// later items still need those transactions to reach their own support
/// counts. Only emission and the nested projection are skipped.
pub struct EliminationEngine<'a, S: ResultSink> {
    min_count: SupportCount,
    sink: &'a mut S,
    stats: MiningStats,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, S: ResultSink> EliminationEngine<'a, S> {
    pub fn new(
        min_count: SupportCount,
        sink: &'a mut S,
        cancel: Option<&'a AtomicBool>,
    ) -> EliminationEngine<'a, S> {
        EliminationEngine {
            min_count,
            sink,
            stats: MiningStats::default(),
            cancel,
        }
    }

    /// Runs the engine to completion over `db` and returns the counters.
    pub fn run(mut self, db: ConditionalDatabase<'_>) -> Result<MiningStats> {
        let mut prefix = Itemset::new();
        self.mine(db, &mut prefix)?;
        Ok(self.stats)
    }

    fn run_under_prefix(
        mut self,
        db: ConditionalDatabase<'_>,
        mut prefix: Itemset,
    ) -> Result<MiningStats> {
        self.mine(db, &mut prefix)?;
        Ok(self.stats)
    }

    fn mine(&mut self, mut db: ConditionalDatabase<'_>, prefix: &mut Itemset) -> Result<()> {
        for rank in db.base()..db.limit() {
            // cancellation is cooperative, checked per top-level elimination
            if prefix.is_empty() {
                self.check_cancelled()?;
            }

            let bucket = db.take_bucket(rank);
            let support = bucket.support();
            if support == 0 {
                // rank does not occur in this context
                continue;
            }
            self.stats.eliminations += 1;

            if support >= self.min_count {
                prefix.push(rank);
                self.sink.emit(prefix, support);
                self.stats.frequent_itemsets += 1;

                let conditional = db.project(&bucket, rank)?;
                if !conditional.is_empty() {
                    self.mine(conditional, prefix)?;
                }
                prefix.pop();
            }

            db.redistribute(bucket, rank)?;
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(MiningError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Parallel variant: the top level is eliminated sequentially (the
/// redistribution chain is ordered), but each frequent top item's
/// conditional database is mined on its own rayon worker. Branches share
/// only the immutable arena, so no locking is involved; branch results are
/// drained into the sink in rank order afterwards.
pub fn mine_parallel<S: ResultSink>(
    mut db: ConditionalDatabase<'_>,
    min_count: SupportCount,
    sink: &mut S,
    cancel: Option<&AtomicBool>,
) -> Result<MiningStats> {
    let mut stats = MiningStats::default();
    let mut branches: Vec<(ItemId, SupportCount, ConditionalDatabase<'_>)> = Vec::new();

    for rank in db.base()..db.limit() {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(MiningError::Cancelled);
            }
        }

        let bucket = db.take_bucket(rank);
        let support = bucket.support();
        if support == 0 {
            continue;
        }
        stats.eliminations += 1;

        if support >= min_count {
            let conditional = db.project(&bucket, rank)?;
            branches.push((rank, support, conditional));
        }
        db.redistribute(bucket, rank)?;
    }

    log::debug!("mining {} top-level branches in parallel", branches.len());

    let mined: Vec<(ItemId, SupportCount, Result<(ItemsetCollector, MiningStats)>)> = branches
        .into_par_iter()
        .map(|(rank, support, conditional)| {
            let mut collector = ItemsetCollector::new();
            let outcome = if conditional.is_empty() {
                Ok(MiningStats::default())
            } else {
                EliminationEngine::new(min_count, &mut collector, None)
                    .run_under_prefix(conditional, vec![rank])
            };
            (rank, support, outcome.map(|branch_stats| (collector, branch_stats)))
        })
        .collect();

    for (rank, support, outcome) in mined {
        let (collector, branch_stats) = outcome?;
        sink.emit(&[rank], support);
        stats.frequent_itemsets += 1;
        for (itemset, itemset_support) in collector.itemsets {
            sink.emit(&itemset, itemset_support);
        }
        stats.eliminations += branch_stats.eliminations;
        stats.frequent_itemsets += branch_stats.frequent_itemsets;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SuffixArena;
    use crate::types::Transaction;
    use std::sync::atomic::AtomicBool;

    fn mine_encoded(
        seqs: Vec<Transaction>,
        min_count: SupportCount,
    ) -> Vec<(Itemset, SupportCount)> {
        let num_items = seqs.iter().flatten().copied().max().map_or(0, |m| m + 1);
        let arena = SuffixArena::from_transactions(seqs);
        let db = ConditionalDatabase::build(&arena, num_items).unwrap();
        let mut collector = ItemsetCollector::new();
        EliminationEngine::new(min_count, &mut collector, None)
            .run(db)
            .unwrap();
        collector.itemsets
    }

    fn support_of(results: &[(Itemset, SupportCount)], itemset: &[ItemId]) -> Option<SupportCount> {
        results
            .iter()
            .find(|(set, _)| set.as_slice() == itemset)
            .map(|&(_, support)| support)
    }

    #[test]
    fn singletons_and_pairs() {
        // {0,1}, {0,2}, {1,2}, {0,1,2} with min_count 2
        let results = mine_encoded(
            vec![vec![0, 1], vec![0, 2], vec![1, 2], vec![0, 1, 2]],
            2,
        );

        assert_eq!(support_of(&results, &[0]), Some(3));
        assert_eq!(support_of(&results, &[1]), Some(3));
        assert_eq!(support_of(&results, &[2]), Some(3));
        assert_eq!(support_of(&results, &[0, 1]), Some(2));
        assert_eq!(support_of(&results, &[0, 2]), Some(2));
        assert_eq!(support_of(&results, &[1, 2]), Some(2));
        assert_eq!(support_of(&results, &[0, 1, 2]), None);
        assert_eq!(results.len(), 6);
    }

    #[test]
    fn infrequent_items_suffixes_still_unblock_later_pairs() {
        // In the conditional database of 0, item 1 has support 1 and is
        // skipped; its suffix (2) must still be redistributed or {0,2}
        // would be reported with support 1 instead of 2.
        let results = mine_encoded(vec![vec![0, 1, 2], vec![0, 2], vec![1, 2]], 2);

        assert_eq!(support_of(&results, &[0, 2]), Some(2));
        assert_eq!(support_of(&results, &[0, 1]), None);
        assert_eq!(support_of(&results, &[2]), Some(3));
    }

    #[test]
    fn emits_nothing_below_threshold() {
        let results = mine_encoded(vec![vec![0], vec![1], vec![2]], 2);
        assert!(results.is_empty());
    }

    #[test]
    fn counts_eliminations_and_itemsets() {
        let seqs = vec![vec![0, 1], vec![0, 1], vec![1]];
        let arena = SuffixArena::from_transactions(seqs);
        let db = ConditionalDatabase::build(&arena, 2).unwrap();
        let mut collector = ItemsetCollector::new();
        let stats = EliminationEngine::new(2, &mut collector, None)
            .run(db)
            .unwrap();

        // {0}:2, {0,1}:2, {1}:3
        assert_eq!(stats.frequent_itemsets, 3);
        assert_eq!(stats.frequent_itemsets, collector.len() as u64);
        assert!(stats.eliminations >= stats.frequent_itemsets);
    }

    #[test]
    fn unsorted_transaction_is_detected_as_corrupt() {
        let arena = SuffixArena::from_transactions(vec![vec![2, 0]]);
        let db = ConditionalDatabase::build(&arena, 3).unwrap();
        let mut collector = ItemsetCollector::new();
        let err = EliminationEngine::new(1, &mut collector, None)
            .run(db)
            .unwrap_err();

        assert!(matches!(err, MiningError::CorruptDatabase(_)));
    }

    #[test]
    fn cancellation_stops_the_run() {
        let flag = AtomicBool::new(true);
        let arena = SuffixArena::from_transactions(vec![vec![0, 1], vec![0, 1]]);
        let db = ConditionalDatabase::build(&arena, 2).unwrap();
        let mut collector = ItemsetCollector::new();
        let err = EliminationEngine::new(1, &mut collector, Some(&flag))
            .run(db)
            .unwrap_err();

        assert_eq!(err, MiningError::Cancelled);
        assert!(collector.is_empty());
    }

    #[test]
    fn parallel_matches_sequential() {
        let seqs = vec![
            vec![0, 1, 2],
            vec![0, 2],
            vec![1, 2],
            vec![0, 1],
            vec![2, 3],
            vec![0, 1, 2, 3],
        ];

        let sequential = mine_encoded(seqs.clone(), 2);

        let arena = SuffixArena::from_transactions(seqs);
        let db = ConditionalDatabase::build(&arena, 4).unwrap();
        let mut collector = ItemsetCollector::new();
        let stats = mine_parallel(db, 2, &mut collector, None).unwrap();

        let mut lhs = sequential;
        let mut rhs = collector.itemsets;
        lhs.sort();
        rhs.sort();
        assert_eq!(lhs, rhs);
        assert_eq!(stats.frequent_itemsets, lhs.len() as u64);
    }
}
