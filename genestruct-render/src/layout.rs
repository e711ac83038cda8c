/*!
# Gene structure layout

Turns a [`GeneModel`] into drawing primitives. Every horizontal coordinate
is an absolute genomic position passed through the gene's
[`CoordinateCompressor`], so long introns collapse while exons, promoters
and enhancers keep their order.

Draw order (back to front): backbone, promoter regions, exons and
enhancers, exon labels, TSS markers, titles.
*/

use crate::config::LayoutConfig;
use crate::scene::*;
use genestruct_core::{
    find_gene_enhancers, CoordinateCompressor, Enhancer, EnhancerClass, GeneModel, GeneSpan, GeneStructError,
    GenomicPos, Result, Strand,
};
use serde::{Deserialize, Serialize};

const BACKBONE_Y: f64 = 0.5;
const EXON_Y: (f64, f64) = (0.35, 0.65);
const PROMOTER_Y: (f64, f64) = (0.4, 0.6);
const PROXIMAL_Y: (f64, f64) = (0.7, 0.85);
const DISTAL_Y: (f64, f64) = (0.15, 0.3);
const LABEL_OFFSET: f64 = 0.2;
const TITLE_Y: f64 = 1.15;
const SUBTITLE_Y: f64 = 1.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub ticks: Vec<Tick>,
    pub unit: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Swatch {
    Patch { fill: String, alpha: f32, edge: Option<String> },
    Line { color: String, width: f32 },
    Marker { shape: MarkerShape, color: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
}

/// Complete renderer-neutral diagram of one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneLayout {
    pub gene: String,
    pub span: GeneSpan,
    pub primitives: Vec<Primitive>,
    pub axis: Axis,
    pub legend: Vec<LegendEntry>,
}

impl GeneLayout {
    /// Replay the diagram, in z-order, into any renderer.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        for primitive in &self.primitives {
            renderer.primitive(primitive);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Lay out one gene. Enhancers are only drawn when enabled in `config`.
/// An invalid `config` is rejected before anything is drawn.
pub fn layout_gene(gene: &GeneModel, enhancers: &[Enhancer], config: &LayoutConfig) -> Result<GeneLayout> {
    checked_config(config)?;
    layout_checked(gene, enhancers, config)
}

/// `config.validate()` as a core error.
pub(crate) fn checked_config(config: &LayoutConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| GeneStructError::invalid_params(format!("{:#}", e)))
}

/// Layout for a config that already passed validation.
pub(crate) fn layout_checked(gene: &GeneModel, enhancers: &[Enhancer], config: &LayoutConfig) -> Result<GeneLayout> {
    let compressor = gene.compressor(config.compression)?;
    let span = compressor.span();
    let style = &config.style;
    let mut primitives = Vec::new();

    primitives.push(Primitive::Line(Line {
        x0: 0.0,
        y0: BACKBONE_Y,
        x1: 1.0,
        y1: BACKBONE_Y,
        color: style.intron.clone(),
        width: 1.0,
    }));

    let sites = gene.promoter_sites(&config.promoter);
    for site in &sites {
        let (x0, x1) = compressor.compress_interval(&site.region);
        primitives.push(Primitive::Rect(Rect {
            x0,
            x1,
            y0: PROMOTER_Y.0,
            y1: PROMOTER_Y.1,
            fill: style.promoter.clone(),
            alpha: 0.3,
            edge: None,
        }));
    }

    let mut labels = Vec::new();
    for (i, exon) in gene.exons.iter().enumerate() {
        let (x0, x1) = compressor.compress_interval(exon);
        primitives.push(Primitive::Rect(Rect {
            x0,
            x1,
            y0: EXON_Y.0,
            y1: EXON_Y.1,
            fill: style.exon_fill.clone(),
            alpha: 0.8,
            edge: Some(style.exon_edge.clone()),
        }));

        if exon.length() >= config.axis.label_min_exon_len {
            let center = (x0 + x1) / 2.0;
            let y = if i % 2 == 0 { BACKBONE_Y + LABEL_OFFSET } else { BACKBONE_Y - LABEL_OFFSET };
            labels.push(Primitive::Line(Line {
                x0: center,
                y0: BACKBONE_Y,
                x1: center,
                y1: y,
                color: style.label.clone(),
                width: 0.5,
            }));
            labels.push(Primitive::Text(Text {
                x: center,
                y,
                text: format_bp(exon.length()),
                size: 6.0,
                color: style.label.clone(),
                anchor: TextAnchor::Middle,
                bold: false,
            }));
        }
    }

    if config.enhancers.enabled {
        let nearby = find_gene_enhancers(&gene.chromosome, span, enhancers, config.enhancers.window);
        log::debug!("Gene {}: {} enhancer(s) within {}bp", gene.name, nearby.len(), config.enhancers.window);
        for enhancer in nearby {
            primitives.push(enhancer_rect(enhancer, &compressor, config));
        }
    }

    primitives.extend(labels);

    let shape = tss_shape(gene.strand);
    for site in &sites {
        primitives.push(Primitive::Marker(Marker {
            x: compressor.compress(site.tss),
            y: BACKBONE_Y,
            shape,
            color: style.tss.clone(),
            size: 8.0,
        }));
    }

    primitives.push(Primitive::Text(Text {
        x: 0.5,
        y: TITLE_Y,
        text: gene.name.clone(),
        size: 12.0,
        color: "black".to_string(),
        anchor: TextAnchor::Middle,
        bold: true,
    }));
    primitives.push(Primitive::Text(Text {
        x: 0.5,
        y: SUBTITLE_Y,
        text: format!("Chromosome {}, Strand {}", gene.chromosome, gene.strand),
        size: 9.0,
        color: style.subtitle.clone(),
        anchor: TextAnchor::Middle,
        bold: false,
    }));

    Ok(GeneLayout {
        gene: gene.name.clone(),
        span,
        primitives,
        axis: axis_ticks(&compressor, config),
        legend: legend(gene.strand, config),
    })
}

fn enhancer_rect(enhancer: &Enhancer, compressor: &CoordinateCompressor, config: &LayoutConfig) -> Primitive {
    let style = &config.style;
    let (x0, x1) = compressor.compress_interval(&enhancer.interval);
    let width = (x1 - x0).max(config.enhancers.min_width);
    let (y, fill, edge) = match enhancer.class {
        EnhancerClass::Proximal => (PROXIMAL_Y, &style.proximal_fill, &style.proximal_edge),
        EnhancerClass::Distal => (DISTAL_Y, &style.distal_fill, &style.distal_edge),
    };
    Primitive::Rect(Rect {
        x0,
        x1: x0 + width,
        y0: y.0,
        y1: y.1,
        fill: fill.clone(),
        alpha: 0.7,
        edge: Some(edge.clone()),
    })
}

fn tss_shape(strand: Strand) -> MarkerShape {
    match strand {
        Strand::Forward => MarkerShape::TriangleRight,
        Strand::Reverse => MarkerShape::TriangleLeft,
    }
}

/// Evenly spaced genomic ticks, placed through the compressor. Ticks that
/// land closer than `min_tick_distance` to the previously kept one are dropped.
pub fn axis_ticks(compressor: &CoordinateCompressor, config: &LayoutConfig) -> Axis {
    let span = compressor.span();
    let total = span.length();

    let (base_step, unit, divider): (GenomicPos, &str, f64) = if total > 1_000_000 {
        (100_000, "Mb", 1_000_000.0)
    } else if total > 100_000 {
        (10_000, "kb", 1_000.0)
    } else {
        (1_000, "kb", 1_000.0)
    };

    let step = base_step.max(total.div_euclid(config.axis.target_ticks.max(1)));
    let step = ((step as f64 / base_step as f64).round_ties_even() as GenomicPos).saturating_mul(base_step);

    let mut ticks = Vec::new();
    let mut last = f64::NEG_INFINITY;
    let mut next = Some(span.start.div_euclid(step).saturating_mul(step));
    while let Some(pos) = next.filter(|&pos| pos <= span.end) {
        if pos >= span.start {
            let x = compressor.compress(pos);
            if x - last >= config.axis.min_tick_distance {
                ticks.push(Tick {
                    x,
                    label: format!("{:.1}", pos.saturating_sub(span.start) as f64 / divider),
                });
                last = x;
            }
        }
        next = pos.checked_add(step);
    }

    Axis {
        ticks,
        unit: unit.to_string(),
        label: format!("Position ({})", unit),
    }
}

pub fn legend(strand: Strand, config: &LayoutConfig) -> Vec<LegendEntry> {
    let style = &config.style;
    let mut entries = vec![
        LegendEntry {
            label: "Exon".to_string(),
            swatch: Swatch::Patch {
                fill: style.exon_fill.clone(),
                alpha: 0.8,
                edge: Some(style.exon_edge.clone()),
            },
        },
        LegendEntry {
            label: "Intron".to_string(),
            swatch: Swatch::Line { color: style.intron.clone(), width: 1.0 },
        },
        LegendEntry {
            label: "Promoter Region".to_string(),
            swatch: Swatch::Patch { fill: style.promoter.clone(), alpha: 0.3, edge: None },
        },
        LegendEntry {
            label: "TSS".to_string(),
            swatch: Swatch::Marker { shape: tss_shape(strand), color: style.tss.clone() },
        },
    ];

    if config.enhancers.enabled {
        entries.push(LegendEntry {
            label: "Proximal Enhancer".to_string(),
            swatch: Swatch::Patch { fill: style.proximal_fill.clone(), alpha: 0.7, edge: None },
        });
        entries.push(LegendEntry {
            label: "Distal Enhancer".to_string(),
            swatch: Swatch::Patch { fill: style.distal_fill.clone(), alpha: 0.7, edge: None },
        });
    }

    entries
}

/// Human readable base-pair length: `bp`, `kb` or `Mb`.
pub fn format_bp(bp: GenomicPos) -> String {
    if bp >= 1_000_000 {
        format!("{:.1}Mb", bp as f64 / 1_000_000.0)
    } else if bp >= 1_000 {
        format!("{:.1}kb", bp as f64 / 1_000.0)
    } else {
        format!("{}bp", bp)
    }
}
