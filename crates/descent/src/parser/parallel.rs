//! # Batch Parsing
//!
//! Parse many sources against one shared [`Parser`]. With the `parallel`
//! feature each source runs on a rayon worker; without it the batch runs
//! sequentially with the same results, in the same order.

use crate::error::ParseResult;
use crate::lexer::TokenKind;
use crate::parser::Parser;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration for parallel parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of threads to use (0 = auto)
    pub num_threads: usize,
}

impl<K: TokenKind, V: Send> Parser<K, V> {
    /// Parse every source, returning one result per source in input order.
    #[cfg(feature = "parallel")]
    pub fn parse_batch(&self, sources: &[&str]) -> Vec<ParseResult<K, V>> {
        tracing::debug!(sources = sources.len(), "parsing batch");
        sources.par_iter().map(|source| self.parse(source)).collect()
    }

    /// Sequential fallback when the `parallel` feature is disabled
    #[cfg(not(feature = "parallel"))]
    pub fn parse_batch(&self, sources: &[&str]) -> Vec<ParseResult<K, V>> {
        tracing::debug!(sources = sources.len(), "parsing batch");
        sources.iter().map(|source| self.parse(source)).collect()
    }

    /// Like [`parse_batch`](Self::parse_batch), on a dedicated thread pool.
    ///
    /// # Errors
    ///
    /// Fails when the thread pool cannot be created.
    #[cfg(feature = "parallel")]
    pub fn parse_batch_with(
        &self,
        sources: &[&str],
        config: &ParallelConfig,
    ) -> Result<Vec<ParseResult<K, V>>, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .build()?;
        Ok(pool.install(|| self.parse_batch(sources)))
    }
}
