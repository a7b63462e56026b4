// hiveforge-rules/src/traits.rs
// ============================================================================
// Module: Requirement Traits
// Description: Row-based evaluation contracts for requirement executors.
// Purpose: Define predicate, batch, and reader utilities for requirement evaluation.
// Dependencies: crate::tristate, std
// ============================================================================

//! ## Overview
//! Row-based contracts describe how predicates evaluate against batch readers and
//! provide helpers for mask-based batch evaluation and row iteration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::tristate::TriState;

// ============================================================================
// SECTION: Type Aliases
// ============================================================================

/// Row index within a batch
pub type Row = usize;

/// 64-bit mask for batch evaluation results
pub type Mask64 = u64;

// ============================================================================
// SECTION: Predicate Trait
// ============================================================================

/// Core trait for predicate evaluation over batch readers
///
/// Predicates evaluate against a specific row within a reader that bundles
/// the fields a rule needs to inspect. This design enables:
///
/// - Direct slice access (no hash lookups)
/// - Cache-friendly memory access patterns
/// - Batch evaluation without per-row allocation
/// - Zero allocation in hot paths
pub trait PredicateEval {
    /// Domain-specific reader type containing the fields a rule inspects
    ///
    /// Examples: `TaskBatchReader`<'a>, `EventBatchReader`<'a>, `ClaimBatchReader`<'a>
    /// Each bundles the slices needed for evaluation.
    type Reader<'a>;

    /// Evaluate the predicate for a specific row within the reader
    ///
    /// This is the core hot path method. It should:
    /// - Access field data via direct array indexing: `reader.status[row]`
    /// - Perform simple comparisons and bitwise operations
    /// - Be marked #[inline(always)] for maximum optimization
    ///
    /// # Arguments
    /// * `reader` - Bundle of field slices for a batch of rows
    /// * `row` - Index within the batch (`0..batch_len`)
    ///
    /// # Returns
    /// `true` if the predicate is satisfied for this row
    fn eval_row(&self, reader: &Self::Reader<'_>, row: Row) -> bool;
}

// ============================================================================
// SECTION: Batch Predicate Trait
// ============================================================================

/// Batch evaluation trait for vectorized processing
///
/// Provides default window-based evaluation and allows callers to override
/// with a tighter loop when the predicate is cheap to re-derive per row.
pub trait BatchPredicateEval: PredicateEval {
    /// Evaluate the predicate for up to 64 consecutive rows
    ///
    /// Returns a bitmask where bit N indicates whether row start+N passed.
    /// Default implementation calls [`PredicateEval::eval_row`] in a loop.
    ///
    /// # Arguments
    /// * `reader` - Bundle of field slices
    /// * `start` - Starting row index
    /// * `count` - Number of rows to evaluate (clamped to 64)
    ///
    /// # Returns
    /// Bitmask where bit N set means row start+N satisfied the predicate
    #[inline]
    fn eval_block(&self, reader: &Self::Reader<'_>, start: Row, count: usize) -> Mask64 {
        let n = count.min(64);
        let mut mask: Mask64 = 0;

        for i in 0 .. n {
            if self.eval_row(reader, start + i) {
                mask |= 1u64 << i;
            }
        }

        mask
    }
}

// ============================================================================
// SECTION: Tri-State Predicate Trait
// ============================================================================
/// Predicate evaluation that can return `Unknown` for insufficient evidence
pub trait TriStatePredicateEval {
    /// Domain-specific reader type containing the fields or evidence a rule inspects
    type Reader<'a>;

    /// Evaluate the predicate for a specific row within the reader
    ///
    /// Returns `TriState::Unknown` when evidence is missing or indeterminate.
    fn eval_row_tristate(&self, reader: &Self::Reader<'_>, row: Row) -> TriState;
}

/// Adapter for boolean predicates that should participate in tri-state evaluation
///
/// # Invariants
/// - Holds a predicate value of type `P` with no additional constraints.
#[derive(Debug, Clone, Copy)]
pub struct BoolAsTri<P>(pub P);

impl<P> BoolAsTri<P> {
    /// Wraps a boolean predicate for tri-state evaluation
    pub const fn new(predicate: P) -> Self {
        Self(predicate)
    }
}

impl<P: PredicateEval> TriStatePredicateEval for BoolAsTri<P> {
    type Reader<'a> = P::Reader<'a>;

    fn eval_row_tristate(&self, reader: &Self::Reader<'_>, row: Row) -> TriState {
        self.0.eval_row(reader, row).into()
    }
}

// ============================================================================
// SECTION: Reader Length Trait
// ============================================================================

/// Trait for readers to expose their length
///
/// All readers must implement this so generic evaluation code
/// can determine batch boundaries without knowing the specific reader type.
pub trait ReaderLen {
    /// Returns the number of rows in this batch reader
    fn len(&self) -> usize;

    /// Returns whether the reader is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SECTION: Batch Evaluation Helpers
// ============================================================================

/// Helper function to evaluate an entire reader and collect passing row indices
///
/// Most callers will drive evaluation themselves to collect domain identifiers
/// instead of row indices, but this provides a generic implementation for testing.
#[inline]
pub fn eval_reader_rows<P>(predicate: &P, reader: &P::Reader<'_>) -> Vec<Row>
where
    P: BatchPredicateEval,
    for<'a> P::Reader<'a>: ReaderLen,
{
    let mut passing_rows = Vec::new();
    let total_len = reader.len();
    let mut row = 0;

    while row < total_len {
        let count = (total_len - row).min(64);
        let mask = predicate.eval_block(reader, row, count);

        // Extract set bits from mask
        for i in 0 .. count {
            if (mask >> i) & 1 == 1 {
                passing_rows.push(row + i);
            }
        }

        row += count;
    }

    passing_rows
}
