//! Intron compression of genomic coordinates.
//!
//! Maps absolute positions inside a gene onto a normalized `[0, 1]` axis in
//! which every intron longer than `threshold` is drawn `budget` bases wide.
//! Exons and short introns keep their true proportional length, so the map
//! is monotonically non-decreasing and features never reorder.

use crate::error::{GeneStructError, Result};
use crate::types::{merge_overlapping, GeneSpan, GenomicInterval, GenomicPos};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHRINK_THRESHOLD: GenomicPos = 5000;
pub const DEFAULT_SHRINK_BUDGET: GenomicPos = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionParams {
    /// Introns strictly longer than this are shrunk
    #[serde(default = "default_threshold")]
    pub threshold: GenomicPos,

    /// Width a shrunk intron is drawn with, regardless of its true length
    #[serde(default = "default_budget")]
    pub budget: GenomicPos,
}

fn default_threshold() -> GenomicPos { DEFAULT_SHRINK_THRESHOLD }
fn default_budget() -> GenomicPos { DEFAULT_SHRINK_BUDGET }

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SHRINK_THRESHOLD,
            budget: DEFAULT_SHRINK_BUDGET,
        }
    }
}

impl CompressionParams {
    pub fn new(threshold: GenomicPos, budget: GenomicPos) -> Self {
        Self { threshold, budget }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold < 0 {
            return Err(GeneStructError::invalid_params(format!(
                "threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        if self.budget < 0 {
            return Err(GeneStructError::invalid_params(format!(
                "budget must be non-negative, got {}",
                self.budget
            )));
        }
        Ok(())
    }

    /// Whether an intron of this length takes part in compression.
    pub fn shrinks(&self, intron: &GenomicInterval) -> bool {
        intron.length() > self.threshold
    }

    /// Bases removed once a position lies past the whole intron.
    fn full_shrink(&self, intron: &GenomicInterval) -> GenomicPos {
        intron.length().saturating_sub(self.budget)
    }

    /// Bases removed for a position strictly inside `(start, end]`.
    fn partial_shrink(&self, intron: &GenomicInterval, pos: GenomicPos) -> f64 {
        let progressed = pos.saturating_sub(intron.start) as f64;
        let ratio = progressed / intron.length() as f64;
        progressed - ratio * self.budget as f64
    }
}

/// Per-gene compression map. Cheap to query, immutable once built.
#[derive(Debug, Clone)]
pub struct CoordinateCompressor {
    span: GeneSpan,
    params: CompressionParams,
    introns: Vec<GenomicInterval>,
    total_shrink: GenomicPos,
    denominator: GenomicPos,
    /// Sorted intron ends plus prefix sums of full shrink.
    ends: Vec<GenomicPos>,
    prefix_shrink: Vec<GenomicPos>,
}

impl CoordinateCompressor {
    /// Build the map for one gene. Overlapping introns are merged first so
    /// the qualifying set is disjoint; introns at or below the threshold and
    /// invalid intervals are dropped here and never shrink anything.
    pub fn new(span: GeneSpan, introns: &[GenomicInterval], params: CompressionParams) -> Self {
        let merged = merge_overlapping(introns);
        let valid = introns.iter().filter(|iv| iv.is_valid()).count();
        if merged.len() < valid {
            log::debug!(
                "Merged {} overlapping intron(s) in span {}..{}",
                valid - merged.len(),
                span.start,
                span.end
            );
        }
        let shrinking: Vec<GenomicInterval> = merged.into_iter().filter(|iv| params.shrinks(iv)).collect();

        let ends = shrinking.iter().map(|iv| iv.end).collect();
        let mut prefix_shrink = Vec::with_capacity(shrinking.len() + 1);
        prefix_shrink.push(0);
        let mut total_shrink: GenomicPos = 0;
        for iv in &shrinking {
            total_shrink = total_shrink.saturating_add(params.full_shrink(iv));
            prefix_shrink.push(total_shrink);
        }

        let denominator = span.length().saturating_sub(total_shrink);
        if denominator <= 0 {
            log::debug!(
                "Degenerate compression for span {}..{} (shrink {}), all positions map to 0",
                span.start, span.end, total_shrink
            );
        }

        Self {
            span,
            params,
            introns: shrinking,
            total_shrink,
            denominator,
            ends,
            prefix_shrink,
        }
    }

    pub fn span(&self) -> GeneSpan {
        self.span
    }

    pub fn params(&self) -> CompressionParams {
        self.params
    }

    /// Introns that take part in compression, sorted by start.
    pub fn shrinking_introns(&self) -> &[GenomicInterval] {
        &self.introns
    }

    /// Shrink accumulated at `gene_end` when every qualifying intron lies before it.
    pub fn total_shrink_span(&self) -> GenomicPos {
        self.total_shrink
    }

    /// Compressed span length; the map is degenerate when this is `<= 0`.
    pub fn denominator(&self) -> GenomicPos {
        self.denominator
    }

    pub fn is_degenerate(&self) -> bool {
        self.denominator <= 0
    }

    /// Normalized position of `pos`. Total: out-of-span input extrapolates
    /// linearly and a degenerate map yields `0.0`.
    pub fn compress(&self, pos: GenomicPos) -> f64 {
        let k = self.ends.partition_point(|&end| end < pos);
        let mut shrink = self.prefix_shrink[k] as f64;
        if let Some(intron) = self.introns.get(k) {
            if pos > intron.start {
                shrink += self.params.partial_shrink(intron, pos);
            }
        }
        self.normalize(pos, shrink)
    }

    /// Reference implementation walking every intron for each query.
    pub fn compress_scan(&self, pos: GenomicPos) -> f64 {
        self.normalize(pos, self.scan_shrink(pos))
    }

    /// Compress both ends of an interval.
    pub fn compress_interval(&self, interval: &GenomicInterval) -> (f64, f64) {
        (self.compress(interval.start), self.compress(interval.end))
    }

    fn scan_shrink(&self, pos: GenomicPos) -> f64 {
        let mut shrink = 0.0;
        for intron in &self.introns {
            if pos > intron.end {
                shrink += self.params.full_shrink(intron) as f64;
            } else if pos > intron.start {
                shrink += self.params.partial_shrink(intron, pos);
            }
        }
        shrink
    }

    fn normalize(&self, pos: GenomicPos, shrink: f64) -> f64 {
        if self.denominator <= 0 {
            return 0.0;
        }
        let raw_offset = pos.saturating_sub(self.span.start) as f64;
        (raw_offset - shrink) / self.denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> CoordinateCompressor {
        CoordinateCompressor::new(
            GeneSpan::new(1000, 21000),
            &[GenomicInterval::new(5000, 16000)],
            CompressionParams::default(),
        )
    }

    #[test]
    fn test_worked_example() {
        let c = example();
        assert_eq!(c.total_shrink_span(), 10700);
        assert_eq!(c.denominator(), 9300);
        assert_eq!(c.compress(21000), 1.0);
        assert!((c.compress(5000) - 4000.0 / 9300.0).abs() < 1e-12);
        assert!((c.compress(10500) - 4150.0 / 9300.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_fixpoints() {
        let c = example();
        assert_eq!(c.compress(1000), 0.0);
        assert_eq!(c.compress(21000), 1.0);
    }

    #[test]
    fn test_intron_end_takes_full_shrink() {
        let c = example();
        // pos == end goes through the partial branch with ratio 1
        let at_end = c.compress(16000);
        let expected = (15000.0 - 10700.0) / 9300.0;
        assert!((at_end - expected).abs() < 1e-12);
        assert!((c.compress(16001) - (15001.0 - 10700.0) / 9300.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_introns_are_identity() {
        let span = GeneSpan::new(100, 10100);
        let c = CoordinateCompressor::new(
            span,
            &[GenomicInterval::new(2000, 7000), GenomicInterval::new(8000, 9000)],
            CompressionParams::default(),
        );
        assert!(c.shrinking_introns().is_empty());
        for pos in [100, 2000, 4500, 7000, 10100] {
            assert_eq!(c.compress(pos), (pos - 100) as f64 / 10000.0);
        }
    }

    #[test]
    fn test_zero_length_span_is_degenerate() {
        let c = CoordinateCompressor::new(GeneSpan::new(500, 500), &[], CompressionParams::default());
        assert!(c.is_degenerate());
        assert_eq!(c.compress(500), 0.0);
        assert_eq!(c.compress(-1_000_000), 0.0);
        assert_eq!(c.compress(GenomicPos::MAX), 0.0);
    }

    #[test]
    fn test_shrink_consuming_span_is_degenerate() {
        // Budget 0 and an intron covering the whole span
        let c = CoordinateCompressor::new(
            GeneSpan::new(0, 10000),
            &[GenomicInterval::new(0, 10000)],
            CompressionParams::new(10, 0),
        );
        assert_eq!(c.denominator(), 0);
        assert_eq!(c.compress(5000), 0.0);
        assert!(!c.compress(10000).is_nan());
    }

    #[test]
    fn test_extrapolates_outside_span() {
        let c = example();
        let upstream = c.compress(800);
        assert!((upstream - (-200.0 / 9300.0)).abs() < 1e-12);
        assert!(c.compress(21200) > 1.0);
    }

    #[test]
    fn test_extreme_positions_do_not_panic() {
        let c = example();
        assert!(c.compress(GenomicPos::MIN).is_finite());
        assert!(c.compress(GenomicPos::MAX).is_finite());
    }

    #[test]
    fn test_overlapping_introns_are_merged() {
        let introns = [GenomicInterval::new(2000, 12000), GenomicInterval::new(9000, 20000)];
        let c = CoordinateCompressor::new(GeneSpan::new(0, 40000), &introns, CompressionParams::default());
        assert_eq!(c.shrinking_introns(), &[GenomicInterval::new(2000, 20000)]);
        assert_eq!(c.total_shrink_span(), 17700);
        // inside the former overlap the map used to run backwards
        assert!(c.compress(9500) <= c.compress(11500));
        let mut prev = c.compress(0);
        for pos in (0..=40000).step_by(250) {
            let x = c.compress(pos);
            assert!(x >= prev, "map decreased at {}", pos);
            assert_eq!(x, c.compress_scan(pos));
            prev = x;
        }
    }

    #[test]
    fn test_huge_span_does_not_panic() {
        let span = GeneSpan::new(GenomicPos::MIN, GenomicPos::MAX);
        let c = CoordinateCompressor::new(span, &[GenomicInterval::new(0, 100_000)], CompressionParams::default());
        assert!(!c.is_degenerate());
        assert!(c.compress(0).is_finite());
        assert!(c.compress(GenomicPos::MAX).is_finite());
        assert!(c.compress(GenomicPos::MIN).is_finite());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let introns = [GenomicInterval::new(30000, 40000), GenomicInterval::new(5000, 16000)];
        let c = CoordinateCompressor::new(GeneSpan::new(0, 50000), &introns, CompressionParams::default());
        assert_eq!(c.shrinking_introns()[0].start, 5000);
        for pos in (0..=50000).step_by(500) {
            let fast = c.compress(pos);
            let slow = c.compress_scan(pos);
            assert!((fast - slow).abs() <= 1e-9 * slow.abs().max(1.0));
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(CompressionParams::default().validate().is_ok());
        assert!(CompressionParams::new(-1, 300).validate().is_err());
        assert!(CompressionParams::new(5000, -5).validate().is_err());
    }
}
