/*!
# Drawing primitives

Everything a gene diagram is made of. Horizontal coordinates live on the
compressed `[0, 1]` axis; vertical coordinates use the same unit frame with
the backbone at `y = 0.5`. Titles sit above `y = 1`.
*/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub fill: String,
    pub alpha: f32,
    pub edge: Option<String>,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    TriangleRight,
    TriangleLeft,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub shape: MarkerShape,
    pub color: String,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size: f32,
    pub color: String,
    pub anchor: TextAnchor,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Rect(Rect),
    Line(Line),
    Marker(Marker),
    Text(Text),
}

/// Sink for drawing primitives. Implemented by whatever actually paints.
pub trait Renderer {
    fn rect(&mut self, rect: &Rect);
    fn line(&mut self, line: &Line);
    fn marker(&mut self, marker: &Marker);
    fn text(&mut self, text: &Text);

    fn primitive(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Rect(r) => self.rect(r),
            Primitive::Line(l) => self.line(l),
            Primitive::Marker(m) => self.marker(m),
            Primitive::Text(t) => self.text(t),
        }
    }
}

/// Renderer that records primitives in the order they were drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneBuffer {
    pub primitives: Vec<Primitive>,
}

impl SceneBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Rect(r) => Some(r),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Marker(m) => Some(m),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
    }
}

impl Renderer for SceneBuffer {
    fn rect(&mut self, rect: &Rect) {
        self.primitives.push(Primitive::Rect(rect.clone()));
    }

    fn line(&mut self, line: &Line) {
        self.primitives.push(Primitive::Line(line.clone()));
    }

    fn marker(&mut self, marker: &Marker) {
        self.primitives.push(Primitive::Marker(marker.clone()));
    }

    fn text(&mut self, text: &Text) {
        self.primitives.push(Primitive::Text(text.clone()));
    }
}
