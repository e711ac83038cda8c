/*!
# Protein feature layout

Draws a protein as a backbone along its residues with domain and region
boxes, secondary-structure tracks and post-translational modification
sites. Positions are amino-acid indices divided by the sequence length, so
the x axis is `[0, 1]` like the gene diagrams. The backbone sits at
`y = 0`; secondary structure stacks above it.
*/

use crate::config::LayoutConfig;
use crate::layout::{Axis, LegendEntry, Swatch, Tick};
use crate::scene::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const DOMAIN_COLOR: &str = "#FFB6C1";
const REGION_COLOR: &str = "#90EE90";
const DOMAIN_Y: (f64, f64) = (-0.3, 0.3);
const REGION_Y: (f64, f64) = (-0.2, 0.2);
const STRUCTURE_HEIGHT: f64 = 0.15;
const TITLE_Y: f64 = 1.1;

/// Residue range of a domain or region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinFeature {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureElement {
    pub start: i64,
    pub end: i64,
    /// `Helix`, `Beta strand` or `Turn`; anything else is not drawn
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub start: i64,
    pub description: String,
}

/// Feature annotations of one protein, as exported from UniProt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinFeatures {
    pub gene_name: String,
    pub sequence_length: i64,
    #[serde(default)]
    pub domains: Vec<ProteinFeature>,
    #[serde(default)]
    pub regions: Vec<ProteinFeature>,
    #[serde(default)]
    pub secondary_structure: Vec<StructureElement>,
    #[serde(default)]
    pub modifications: Vec<Modification>,
}

impl ProteinFeatures {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondaryStructure {
    Helix,
    BetaStrand,
    Turn,
}

impl SecondaryStructure {
    /// Legend order.
    pub const ALL: [SecondaryStructure; 3] = [Self::Helix, Self::BetaStrand, Self::Turn];

    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "Helix" => Some(Self::Helix),
            "Beta strand" => Some(Self::BetaStrand),
            "Turn" => Some(Self::Turn),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Helix => "α-Helix",
            Self::BetaStrand => "β-Strand",
            Self::Turn => "Turn",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Helix => "#87CEEB",
            Self::BetaStrand => "#FFA07A",
            Self::Turn => "#DDA0DD",
        }
    }

    /// Lower edge of the track.
    fn track_y(self) -> f64 {
        match self {
            Self::Helix => 0.6,
            Self::BetaStrand => 0.4,
            Self::Turn => 0.2,
        }
    }
}

/// Modification category. Variants are declared in name order so sorted
/// sets list them alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModificationType {
    Acetylation,
    Glycosylation,
    Methylation,
    Others,
    Phosphorylation,
    #[serde(rename = "SUMOylation")]
    Sumoylation,
    Ubiquitylation,
}

impl ModificationType {
    pub fn color(self) -> &'static str {
        match self {
            Self::Acetylation => "#FF0000",
            Self::Glycosylation => "#00FF00",
            Self::Methylation => "#0000FF",
            Self::Phosphorylation => "#FFA500",
            Self::Sumoylation => "#800080",
            Self::Ubiquitylation => "#008080",
            Self::Others => "#808080",
        }
    }
}

impl fmt::Display for ModificationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Acetylation => "Acetylation",
            Self::Glycosylation => "Glycosylation",
            Self::Methylation => "Methylation",
            Self::Phosphorylation => "Phosphorylation",
            Self::Sumoylation => "SUMOylation",
            Self::Ubiquitylation => "Ubiquitylation",
            Self::Others => "Others",
        };
        write!(f, "{}", name)
    }
}

/// Category of a modification from its free-text description. Keywords are
/// tried in a fixed order, so "N-acetylserine; partial" and
/// "Phosphoserine; alternate" land where a curator expects.
pub fn classify_modification(description: &str) -> ModificationType {
    let description = description.to_lowercase();
    const KEYWORDS: [(&str, ModificationType); 6] = [
        ("acetyl", ModificationType::Acetylation),
        ("glyco", ModificationType::Glycosylation),
        ("methyl", ModificationType::Methylation),
        ("phospho", ModificationType::Phosphorylation),
        ("sumo", ModificationType::Sumoylation),
        ("ubiquit", ModificationType::Ubiquitylation),
    ];
    KEYWORDS
        .iter()
        .find(|(keyword, _)| description.contains(keyword))
        .map(|&(_, kind)| kind)
        .unwrap_or(ModificationType::Others)
}

/// Renderer-neutral diagram of one protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinLayout {
    pub gene: String,
    pub sequence_length: i64,
    pub primitives: Vec<Primitive>,
    pub axis: Axis,
    pub legend: Vec<LegendEntry>,
}

impl ProteinLayout {
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        for primitive in &self.primitives {
            renderer.primitive(primitive);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Lay out one protein. Features with `end < start` and secondary structure
/// of an unknown type are skipped.
pub fn layout_protein(protein: &ProteinFeatures, config: &LayoutConfig) -> ProteinLayout {
    let length = protein.sequence_length;
    let scale = |residue: i64| if length > 0 { residue as f64 / length as f64 } else { 0.0 };
    let mut primitives = vec![Primitive::Line(Line {
        x0: 0.0,
        y0: 0.0,
        x1: scale(length),
        y1: 0.0,
        color: "black".to_string(),
        width: 2.0,
    })];

    let boxed = |start: i64, end: i64, y: (f64, f64), fill: &str, alpha: f32| {
        (end >= start).then(|| {
            Primitive::Rect(Rect {
                x0: scale(start),
                x1: scale(end),
                y0: y.0,
                y1: y.1,
                fill: fill.to_string(),
                alpha,
                edge: Some("black".to_string()),
            })
        })
    };

    let tracks = protein
        .domains
        .iter()
        .map(|d| boxed(d.start, d.end, DOMAIN_Y, DOMAIN_COLOR, 0.7))
        .chain(protein.regions.iter().map(|r| boxed(r.start, r.end, REGION_Y, REGION_COLOR, 0.7)))
        .chain(protein.secondary_structure.iter().map(|e| {
            SecondaryStructure::parse(&e.kind).and_then(|kind| {
                let y = kind.track_y();
                boxed(e.start, e.end, (y, y + STRUCTURE_HEIGHT), kind.color(), 0.8)
            })
        }));
    let mut skipped = 0;
    for rect in tracks {
        match rect {
            Some(rect) => primitives.push(rect),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("Protein {}: skipped {} feature(s)", protein.gene_name, skipped);
    }

    for modification in &protein.modifications {
        primitives.push(Primitive::Marker(Marker {
            x: scale(modification.start),
            y: 0.0,
            shape: MarkerShape::Circle,
            color: classify_modification(&modification.description).color().to_string(),
            size: 6.0,
        }));
    }

    primitives.push(Primitive::Text(Text {
        x: 0.5,
        y: TITLE_Y,
        text: format!("{} ({} aa)", protein.gene_name, length),
        size: 12.0,
        color: "black".to_string(),
        anchor: TextAnchor::Middle,
        bold: true,
    }));

    ProteinLayout {
        gene: protein.gene_name.clone(),
        sequence_length: length,
        primitives,
        axis: residue_axis(length, config.axis.target_ticks),
        legend: protein_legend(protein),
    }
}

/// Ticks at a 1/2/5 x 10^k residue step giving at most `target` intervals.
fn residue_axis(length: i64, target: i64) -> Axis {
    let mut ticks = Vec::new();
    if length > 0 {
        let rough = (length / target.max(1)).max(1);
        let mut magnitude: i64 = 1;
        let step = loop {
            match [1i64, 2, 5].iter().filter_map(|m| m.checked_mul(magnitude)).find(|&s| s >= rough) {
                Some(step) => break step,
                None => magnitude = magnitude.saturating_mul(10),
            }
        };
        let mut next = Some(0);
        while let Some(residue) = next.filter(|&r| r <= length) {
            ticks.push(Tick {
                x: residue as f64 / length as f64,
                label: residue.to_string(),
            });
            next = residue.checked_add(step);
        }
    }
    Axis {
        ticks,
        unit: "aa".to_string(),
        label: "Amino Acid Position".to_string(),
    }
}

/// Domain and region entries when present, secondary structure in a fixed
/// order, then modification types by name.
pub fn protein_legend(protein: &ProteinFeatures) -> Vec<LegendEntry> {
    let patch = |label: &str, fill: &str| LegendEntry {
        label: label.to_string(),
        swatch: Swatch::Patch { fill: fill.to_string(), alpha: 1.0, edge: Some("black".to_string()) },
    };

    let mut entries = Vec::new();
    if !protein.domains.is_empty() {
        entries.push(patch("Domain", DOMAIN_COLOR));
    }
    if !protein.regions.is_empty() {
        entries.push(patch("Region", REGION_COLOR));
    }

    let present: Vec<SecondaryStructure> = protein
        .secondary_structure
        .iter()
        .filter_map(|e| SecondaryStructure::parse(&e.kind))
        .collect();
    for kind in SecondaryStructure::ALL {
        if present.contains(&kind) {
            entries.push(patch(kind.label(), kind.color()));
        }
    }

    let modifications: BTreeSet<ModificationType> = protein
        .modifications
        .iter()
        .map(|m| classify_modification(&m.description))
        .collect();
    for kind in modifications {
        entries.push(LegendEntry {
            label: kind.to_string(),
            swatch: Swatch::Marker { shape: MarkerShape::Circle, color: kind.color().to_string() },
        });
    }
    entries
}
