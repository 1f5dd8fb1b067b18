use crate::coins::CoinLookup;
use crate::errors::{AppError, AppResult, ParseResult};
use crate::parser::parse;
use crate::types::{ParseOutcome, ProtocolParams};
use bitcoin::Transaction;
use tracing::{debug, info};

/// Parse a block's worth of transactions on `threads` workers
///
/// Each transaction is parsed independently against the same coin snapshot, so the
/// results are identical to calling [`parse`] sequentially. Results are returned in
/// input order. Only a panicking worker fails the batch as a whole.
pub fn parse_batch<C>(
    transactions: &[Transaction],
    block_height: u32,
    block_time: u32,
    coins: &C,
    params: &ProtocolParams,
    threads: usize,
) -> AppResult<Vec<ParseResult<ParseOutcome>>>
where
    C: CoinLookup + Sync + ?Sized,
{
    if transactions.is_empty() {
        return Ok(Vec::new());
    }

    let threads = threads.clamp(1, transactions.len());
    let chunk_size = transactions.len().div_ceil(threads);
    debug!(
        "Parsing {} transactions on {} threads ({} per chunk)",
        transactions.len(),
        threads,
        chunk_size
    );

    let chunks = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = transactions
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move |_| {
                    chunk
                        .iter()
                        .map(|tx| parse(tx, block_height, block_time, coins, params))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| AppError::InvalidData("batch parse scope panicked".to_string()))?
    .map_err(|_| AppError::InvalidData("batch parse worker panicked".to_string()))?;

    let results: Vec<_> = chunks.into_iter().flatten().collect();
    let messages = results
        .iter()
        .filter(|result| matches!(result, Ok(outcome) if outcome.is_protocol()))
        .count();
    info!(
        "Parsed {} transactions at height {}: {} protocol messages",
        results.len(),
        block_height,
        messages
    );
    Ok(results)
}
