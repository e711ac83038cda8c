use crate::error::GeneStructError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Absolute genomic coordinate. Signed so that upstream extrapolation
/// (e.g. promoter windows before the first base) stays representable.
pub type GenomicPos = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicInterval {
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl GenomicInterval {
    pub fn new(start: GenomicPos, end: GenomicPos) -> Self {
        Self { start, end }
    }

    /// Build an interval, rejecting `end <= start`.
    pub fn checked(start: GenomicPos, end: GenomicPos) -> Result<Self, GeneStructError> {
        let interval = Self { start, end };
        if interval.is_valid() {
            Ok(interval)
        } else {
            Err(GeneStructError::invalid_interval(start, end))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    pub fn length(&self) -> GenomicPos {
        self.end.saturating_sub(self.start)
    }

    pub fn overlaps(&self, other: &GenomicInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &GenomicInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Sort by start and merge intervals that overlap. Touching intervals
/// (`a.end == b.start`) stay separate; invalid ones are dropped.
pub fn merge_overlapping(intervals: &[GenomicInterval]) -> Vec<GenomicInterval> {
    let mut sorted: Vec<GenomicInterval> = intervals.iter().copied().filter(GenomicInterval::is_valid).collect();
    sorted.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<GenomicInterval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(cur) if iv.start < cur.end => cur.end = cur.end.max(iv.end),
            _ => merged.push(iv),
        }
    }
    merged
}

/// Fixed extent of one gene: `[min start, max end]` over its promoters and exons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneSpan {
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl GeneSpan {
    pub fn new(start: GenomicPos, end: GenomicPos) -> Self {
        Self { start, end }
    }

    /// Span length; zero or negative for degenerate spans.
    pub fn length(&self) -> GenomicPos {
        self.end.saturating_sub(self.start)
    }

    /// Smallest span covering every interval, or `None` when there are none.
    pub fn covering<'a, I>(intervals: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GenomicInterval>,
    {
        intervals.into_iter().fold(None, |acc, iv| match acc {
            None => Some(Self::new(iv.start, iv.end)),
            Some(span) => Some(Self::new(span.start.min(iv.start), span.end.max(iv.end))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    pub fn is_forward(self) -> bool {
        matches!(self, Strand::Forward)
    }
}

impl TryFrom<char> for Strand {
    type Error = GeneStructError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Strand::Forward),
            '-' => Ok(Strand::Reverse),
            _ => Err(GeneStructError::invalid_strand(c.to_string())),
        }
    }
}

impl FromStr for Strand {
    type Err = GeneStructError;

    // Ensembl/BioMart exports use 1 / -1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "1" => Ok(Strand::Forward),
            "-" | "-1" => Ok(Strand::Reverse),
            other => Err(GeneStructError::invalid_strand(other)),
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}
