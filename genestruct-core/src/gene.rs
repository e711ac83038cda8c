use crate::compress::{CompressionParams, CoordinateCompressor};
use crate::error::{GeneStructError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROMOTER_UPSTREAM: GenomicPos = 200;
pub const DEFAULT_PROMOTER_DOWNSTREAM: GenomicPos = 40;
pub const DEFAULT_ENHANCER_WINDOW: GenomicPos = 500;

/// One gene's structure: exon, intron and promoter intervals on one strand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneModel {
    pub name: String,
    pub chromosome: String,
    pub strand: Strand,
    pub exons: Vec<GenomicInterval>,
    pub introns: Vec<GenomicInterval>,
    pub promoters: Vec<GenomicInterval>,
}

impl GeneModel {
    /// Build a gene model. Invalid intervals are dropped, exons and introns
    /// are sorted by start. With `introns = None` they are derived from the
    /// gaps in the merged exon coverage; supplied introns that overlap are
    /// merged so the compressor only sees disjoint introns.
    pub fn new(
        name: String,
        chromosome: String,
        strand: Strand,
        exons: Vec<GenomicInterval>,
        introns: Option<Vec<GenomicInterval>>,
        promoters: Vec<GenomicInterval>,
    ) -> Self {
        let exons = sorted_valid(&name, "exon", exons);
        let introns = match introns {
            Some(introns) => {
                let supplied = sorted_valid(&name, "intron", introns);
                let merged = merge_overlapping(&supplied);
                if merged.len() < supplied.len() {
                    log::warn!(
                        "Gene {}: merged {} overlapping intron(s) into {}",
                        name,
                        supplied.len(),
                        merged.len()
                    );
                }
                merged
            }
            None => derive_introns(&exons),
        };
        let promoters = sorted_valid(&name, "promoter", promoters);

        Self {
            name,
            chromosome: normalize_chromosome(&chromosome).to_string(),
            strand,
            exons,
            introns,
            promoters,
        }
    }

    /// `[min start, max end]` over promoters and exons.
    pub fn span(&self) -> Result<GeneSpan> {
        if self.exons.is_empty() {
            return Err(GeneStructError::no_exons(&self.name));
        }
        GeneSpan::covering(self.promoters.iter().chain(self.exons.iter()))
            .ok_or_else(|| GeneStructError::no_exons(&self.name))
    }

    pub fn compressor(&self, params: CompressionParams) -> Result<CoordinateCompressor> {
        params.validate()?;
        let span = self.span()?;
        Ok(CoordinateCompressor::new(span, &self.introns, params))
    }

    /// TSS and displayed promoter region for every promoter, oriented by strand.
    pub fn promoter_sites(&self, window: &PromoterWindow) -> Vec<PromoterSite> {
        self.promoters
            .iter()
            .map(|promoter| window.site(promoter, self.strand))
            .collect()
    }

    /// Adjacent exon pairs that overlap after sorting by start.
    pub fn exon_overlaps(&self) -> Vec<ExonOverlap> {
        self.exons
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].end > pair[1].start)
            .map(|(i, pair)| ExonOverlap {
                first: i,
                second: i + 1,
                overlap: pair[0].end - pair[1].start,
            })
            .collect()
    }
}

fn sorted_valid(gene: &str, kind: &str, intervals: Vec<GenomicInterval>) -> Vec<GenomicInterval> {
    let total = intervals.len();
    let mut kept: Vec<GenomicInterval> = intervals.into_iter().filter(|iv| iv.is_valid()).collect();
    if kept.len() < total {
        log::debug!("Gene {}: discarded {} invalid {} interval(s)", gene, total - kept.len(), kind);
    }
    kept.sort_by_key(|iv| (iv.start, iv.end));
    kept
}

/// Gaps between blocks of merged exon coverage. Nested or overlapping exons
/// never yield an intron that runs into exon sequence.
pub fn derive_introns(exons: &[GenomicInterval]) -> Vec<GenomicInterval> {
    merge_overlapping(exons)
        .windows(2)
        .map(|pair| GenomicInterval::new(pair[0].end, pair[1].start))
        .filter(GenomicInterval::is_valid)
        .collect()
}

/// Strips a leading `chr` so UCSC and Ensembl names compare equal.
pub fn normalize_chromosome(name: &str) -> &str {
    name.strip_prefix("chr").unwrap_or(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExonOverlap {
    pub first: usize,
    pub second: usize,
    pub overlap: GenomicPos,
}

/// Bases drawn around a TSS, relative to the direction of transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoterWindow {
    #[serde(default = "default_upstream")]
    pub upstream: GenomicPos,
    #[serde(default = "default_downstream")]
    pub downstream: GenomicPos,
}

fn default_upstream() -> GenomicPos { DEFAULT_PROMOTER_UPSTREAM }
fn default_downstream() -> GenomicPos { DEFAULT_PROMOTER_DOWNSTREAM }

impl Default for PromoterWindow {
    fn default() -> Self {
        Self {
            upstream: DEFAULT_PROMOTER_UPSTREAM,
            downstream: DEFAULT_PROMOTER_DOWNSTREAM,
        }
    }
}

impl PromoterWindow {
    pub fn site(&self, promoter: &GenomicInterval, strand: Strand) -> PromoterSite {
        match strand {
            Strand::Forward => {
                let tss = promoter.start;
                PromoterSite {
                    tss,
                    region: GenomicInterval::new(tss - self.upstream, tss + self.downstream),
                }
            }
            Strand::Reverse => {
                let tss = promoter.end;
                PromoterSite {
                    tss,
                    region: GenomicInterval::new(tss - self.downstream, tss + self.upstream),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromoterSite {
    pub tss: GenomicPos,
    pub region: GenomicInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnhancerClass {
    /// pELS
    Proximal,
    /// dELS
    Distal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enhancer {
    pub chromosome: String,
    pub interval: GenomicInterval,
    pub class: EnhancerClass,
}

impl Enhancer {
    pub fn new(chromosome: &str, interval: GenomicInterval, class: EnhancerClass) -> Self {
        Self {
            chromosome: normalize_chromosome(chromosome).to_string(),
            interval,
            class,
        }
    }
}

/// Enhancers on the gene's chromosome lying entirely within the gene span
/// extended by `window` on both sides (the lower bound clamped at 0).
pub fn find_gene_enhancers<'a>(
    chromosome: &str,
    span: GeneSpan,
    enhancers: &'a [Enhancer],
    window: GenomicPos,
) -> Vec<&'a Enhancer> {
    let chromosome = normalize_chromosome(chromosome);
    let extended = GenomicInterval::new((span.start - window).max(0), span.end + window);
    enhancers
        .iter()
        .filter(|e| normalize_chromosome(&e.chromosome) == chromosome && extended.contains(&e.interval))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: GenomicPos, end: GenomicPos) -> GenomicInterval {
        GenomicInterval::new(start, end)
    }

    fn demo_gene(strand: Strand) -> GeneModel {
        GeneModel::new(
            "DEMO".into(),
            "chr7".into(),
            strand,
            vec![iv(16000, 21000), iv(1000, 5000), iv(4000, 4500)],
            None,
            vec![iv(900, 1100)],
        )
    }

    #[test]
    fn test_introns_derived_from_exon_gaps() {
        let gene = demo_gene(Strand::Forward);
        // (4000,4500) sits inside (1000,5000)
        assert_eq!(gene.introns, vec![iv(5000, 16000)]);
        assert_eq!(gene.chromosome, "7");
    }

    #[test]
    fn test_nested_exons_do_not_leak_into_introns() {
        let exons = vec![iv(1000, 5000), iv(2000, 3000), iv(20000, 21000)];
        let introns = derive_introns(&exons);
        assert_eq!(introns, vec![iv(5000, 20000)]);
        for intron in &introns {
            assert!(exons.iter().all(|exon| !exon.overlaps(intron)));
        }

        let gene = GeneModel::new("NESTED".into(), "1".into(), Strand::Forward, exons, None, vec![]);
        let c = gene.compressor(CompressionParams::default()).unwrap();
        // 1000..5000 is coding sequence and keeps its true share
        let drawn = c.compress(5000) - c.compress(1000);
        assert!((drawn - 4000.0 / c.denominator() as f64).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_supplied_introns_are_merged() {
        let gene = GeneModel::new(
            "OVERLAP".into(),
            "1".into(),
            Strand::Forward,
            vec![iv(0, 2000), iv(20000, 40000)],
            Some(vec![iv(9000, 20000), iv(2000, 12000)]),
            vec![],
        );
        assert_eq!(gene.introns, vec![iv(2000, 20000)]);
        let c = gene.compressor(CompressionParams::default()).unwrap();
        assert!(c.compress(9500) <= c.compress(11500));
    }

    #[test]
    fn test_span_covers_promoters_and_exons() {
        let gene = demo_gene(Strand::Forward);
        assert_eq!(gene.span().unwrap(), GeneSpan::new(900, 21000));
    }

    #[test]
    fn test_gene_without_exons_is_an_error() {
        let gene = GeneModel::new(
            "EMPTY".into(),
            "1".into(),
            Strand::Forward,
            vec![iv(50, 10)],
            None,
            vec![iv(0, 100)],
        );
        assert!(gene.exons.is_empty());
        assert_eq!(gene.span(), Err(GeneStructError::no_exons("EMPTY")));
        assert!(gene.compressor(CompressionParams::default()).is_err());
    }

    #[test]
    fn test_supplied_introns_are_filtered() {
        let gene = GeneModel::new(
            "G".into(),
            "1".into(),
            Strand::Reverse,
            vec![iv(0, 10), iv(20, 30)],
            Some(vec![iv(10, 20), iv(40, 35)]),
            vec![],
        );
        assert_eq!(gene.introns, vec![iv(10, 20)]);
    }

    #[test]
    fn test_promoter_sites_follow_strand() {
        let window = PromoterWindow::default();
        let plus = demo_gene(Strand::Forward).promoter_sites(&window);
        assert_eq!(plus[0].tss, 900);
        assert_eq!(plus[0].region, iv(700, 940));

        let minus = demo_gene(Strand::Reverse).promoter_sites(&window);
        assert_eq!(minus[0].tss, 1100);
        assert_eq!(minus[0].region, iv(1060, 1300));
    }

    #[test]
    fn test_exon_overlaps() {
        let overlaps = demo_gene(Strand::Forward).exon_overlaps();
        assert_eq!(overlaps, vec![ExonOverlap { first: 0, second: 1, overlap: 1000 }]);
    }

    #[test]
    fn test_find_gene_enhancers_window() {
        let enhancers = vec![
            Enhancer::new("chr1", iv(600, 800), EnhancerClass::Proximal),
            Enhancer::new("1", iv(400, 800), EnhancerClass::Distal),
            Enhancer::new("chr1", iv(5000, 5500), EnhancerClass::Distal),
            Enhancer::new("chr2", iv(2000, 2100), EnhancerClass::Proximal),
        ];
        let found = find_gene_enhancers("1", GeneSpan::new(1000, 5000), &enhancers, 500);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].interval, iv(600, 800));
        assert_eq!(found[1].interval, iv(5000, 5500));
    }

    #[test]
    fn test_enhancer_window_clamped_at_zero() {
        let enhancers = vec![Enhancer::new("X", iv(-50, 10), EnhancerClass::Proximal)];
        let found = find_gene_enhancers("chrX", GeneSpan::new(100, 200), &enhancers, 500);
        assert!(found.is_empty());
    }
}
