use crate::index::ItemIndex;
use crate::types::{RawTransaction, SupportCount, Transaction};

/// Converts raw transactions into rank sequences, dropping items whose
/// global support is below `min_count` and transactions left empty by the
/// filtering.
///
/// This is the usual anti-monotone pruning: an item below threshold cannot
/// appear in any frequent itemset, so removing it up front shrinks every
/// structure built afterwards without losing a result.
pub fn encode(
    transactions: &[RawTransaction<'_>],
    index: &ItemIndex<'_>,
    min_count: SupportCount,
) -> Vec<Transaction> {
    let encoded: Vec<Transaction> = transactions
        .iter()
        .filter_map(|transaction| {
            let mut ranks: Transaction = transaction
                .iter()
                .filter_map(|&item| index.rank_of(item))
                .filter(|&rank| index.support_of(rank) >= min_count)
                .collect();
            if ranks.is_empty() {
                return None;
            }
            ranks.sort_unstable();
            Some(ranks)
        })
        .collect();

    log::debug!(
        "encoded {} of {} transactions at min_count {}",
        encoded.len(),
        transactions.len(),
        min_count
    );

    encoded
}
