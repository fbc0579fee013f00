//! Backward window search for the LZ77 encoder.
//!
//! The search is a plain scan over every displacement in the window. The best
//! match at a position depends only on the input, so positions can be searched
//! independently and in parallel; the greedy walk in the encoder then picks
//! which of them are actually used.

use tracing::trace;

use super::tokens::{MAX_DISPLACEMENT, MAX_MATCH, MIN_MATCH};
use crate::error::{Error, Result};

/// Upper bound on worker threads for the parallel search
const MAX_THREADS: usize = 32;

/// Fewest positions handed to a single worker
const MIN_CHUNK: usize = 1024;

/// A candidate back-reference
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub displacement: u16,
    pub length: u8,
}

/// Longest-match search over a 4096-byte backward window
#[derive(Clone, Copy, Debug)]
pub struct MatchFinder {
    /// Smallest displacement considered (1 when the decoder cannot re-read its last byte)
    min_displacement: usize,
}

impl MatchFinder {
    pub fn new(vram_safe: bool) -> Self {
        Self { min_displacement: if vram_safe { 1 } else { 0 } }
    }

    /// Best match at `pos`, if any reaches the minimum length
    ///
    /// Displacements are scanned in increasing order and only a strictly
    /// longer match replaces the current best, so ties go to the smallest
    /// displacement.
    pub fn find(&self, input: &[u8], pos: usize) -> Option<Match> {
        let max_len = MAX_MATCH.min(input.len() - pos);
        let mut best_len = MIN_MATCH - 1;
        let mut best_disp = None;

        for disp in self.min_displacement..=MAX_DISPLACEMENT {
            // Source must start inside the data already written
            if disp + 1 > pos {
                break;
            }
            let src = pos - disp - 1;

            let len = (0..max_len).take_while(|&j| input[src + j] == input[pos + j]).count();
            if len > best_len {
                best_len = len;
                best_disp = Some(disp);
                if len == MAX_MATCH {
                    break;
                }
            }
        }

        best_disp.map(|disp| Match { displacement: disp as u16, length: best_len as u8 })
    }

    /// Best match for every position of `input`, searched on `num_threads` workers
    pub fn find_all(&self, input: &[u8], num_threads: usize) -> Result<Vec<Option<Match>>> {
        let num_threads = effective_threads(num_threads);
        let chunk_size = input.len().div_ceil(num_threads).max(MIN_CHUNK);

        if num_threads == 1 || input.len() <= chunk_size {
            return Ok((0..input.len()).map(|pos| self.find(input, pos)).collect());
        }

        // Use crossbeam's scoped threads so workers can borrow the input
        let result = crossbeam::scope(|scope| -> Result<Vec<Option<Match>>> {
            let handles: Vec<_> = (0..input.len())
                .step_by(chunk_size)
                .map(|start| {
                    let end = (start + chunk_size).min(input.len());
                    scope.spawn(move |_| {
                        trace!(start, end, "searching chunk");
                        (start..end).map(|pos| self.find(input, pos)).collect::<Vec<_>>()
                    })
                })
                .collect();

            // Join in spawn order so the table stays in position order
            let mut table = Vec::with_capacity(input.len());
            for handle in handles {
                let chunk =
                    handle.join().map_err(|_| Error::Internal("Thread panicked".to_string()))?;
                table.extend(chunk);
            }
            Ok(table)
        });

        result.map_err(|_| Error::Internal("Thread panicked".to_string()))?
    }
}

/// Resolve a requested thread count (0 = auto)
pub fn effective_threads(num_threads: usize) -> usize {
    match num_threads {
        0 => num_cpus::get().clamp(1, MAX_THREADS),
        n => n.clamp(1, MAX_THREADS),
    }
}
