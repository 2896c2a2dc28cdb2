//! Declarative chart scenes, decoupled from any rendering backend.
//!
//! Views append shapes with attributes to a [`Scene`]; a [`Surface`]
//! materializes whole scenes into named containers. The default surface
//! writes one SVG per container plus an `index.html` shell; tests swap in a
//! recording surface.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const BASE_FILL: &str = "steelblue";
pub const HIGHLIGHT_FILL: &str = "orange";
pub const AXIS_STROKE: &str = "#333";
pub const LOADING_STROKE: &str = "#888";

/// Cluster palette; labels map to colors by modulo.
pub const CLUSTER_PALETTE: [&str; 8] = [
    "#7aa2ff", "#fbbf24", "#4ade80", "#fb7185", "#a78bfa", "#22c55e", "#60a5fa", "#e879f9",
];

pub fn cluster_color(label: usize) -> &'static str {
    CLUSTER_PALETTE[label % CLUSTER_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_svg(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        anchor: Anchor,
        rotate: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str) {
        self.shapes.push(Shape::Rect {
            x,
            y,
            width,
            height,
            fill: fill.to_string(),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.shapes.push(Shape::Circle {
            cx,
            cy,
            r,
            fill: fill.to_string(),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        self.shapes.push(Shape::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: stroke.to_string(),
        });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, anchor: Anchor) {
        self.shapes.push(Shape::Text {
            x,
            y,
            content: content.to_string(),
            anchor,
            rotate: None,
        });
    }

    /// Rotated text, for y-axis captions.
    pub fn rotated_text(&mut self, x: f64, y: f64, content: &str, anchor: Anchor, degrees: f64) {
        self.shapes.push(Shape::Text {
            x,
            y,
            content: content.to_string(),
            anchor,
            rotate: Some(degrees),
        });
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

// ---------------------------------------------------------------------------
// Scales
// ---------------------------------------------------------------------------

/// Linear domain -> range mapping. A degenerate domain (max == min) maps
/// everything to the middle of the range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn map(&self, v: f64) -> f64 {
        if self.d1 == self.d0 {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (v - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }

    /// `count + 1` evenly spaced domain values, endpoints included.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if count == 0 {
            return vec![self.d0];
        }
        (0..=count)
            .map(|i| self.d0 + (self.d1 - self.d0) * i as f64 / count as f64)
            .collect()
    }
}

/// min/max of a value stream, skipping non-finite values.
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    let mut out: Option<(f64, f64)> = None;
    for v in values {
        if !v.is_finite() {
            continue;
        }
        out = Some(match out {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    out
}

/// Even bands with inner padding, for bar charts.
#[derive(Debug, Clone, Copy)]
pub struct BandScale {
    count: usize,
    r0: f64,
    r1: f64,
    padding: f64,
}

impl BandScale {
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        Self {
            count,
            r0: range.0,
            r1: range.1,
            padding,
        }
    }

    fn step(&self) -> f64 {
        (self.r1 - self.r0) / self.count.max(1) as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    pub fn position(&self, index: usize) -> f64 {
        self.r0 + self.step() * index as f64 + self.step() * self.padding / 2.0
    }

    pub fn center(&self, index: usize) -> f64 {
        self.position(index) + self.bandwidth() / 2.0
    }
}

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// Something that can materialize a scene into a named container.
pub trait Surface {
    fn render(&mut self, container: &str, scene: &Scene) -> Result<()>;
}

/// Writes one `<container>.svg` per render plus an `index.html` shell listing
/// every container seen so far.
pub struct SvgSurface {
    out_dir: PathBuf,
    containers: BTreeSet<String>,
}

impl SvgSurface {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("create output dir {}", out_dir.display()))?;
        Ok(Self {
            out_dir,
            containers: BTreeSet::new(),
        })
    }

    fn write_index(&self) -> Result<()> {
        let mut html =
            String::from("<!doctype html>\n<html><head><title>kneeboard</title></head><body>\n");
        for name in &self.containers {
            html.push_str(&format!(
                "<div id=\"{name}\"><img src=\"{name}.svg\" alt=\"{name}\"></div>\n"
            ));
        }
        html.push_str("</body></html>\n");
        fs::write(self.out_dir.join("index.html"), html).context("write index.html")?;
        Ok(())
    }
}

impl Surface for SvgSurface {
    fn render(&mut self, container: &str, scene: &Scene) -> Result<()> {
        let svg = to_svg(scene);
        fs::write(self.out_dir.join(format!("{container}.svg")), svg)
            .with_context(|| format!("write {container}.svg"))?;
        if self.containers.insert(container.to_string()) {
            self.write_index()?;
        }
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn to_svg(scene: &Scene) -> String {
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n",
        scene.width, scene.height
    );
    for shape in scene.shapes() {
        match shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => out.push_str(&format!(
                "  <rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" fill=\"{fill}\"/>\n"
            )),
            Shape::Circle { cx, cy, r, fill } => out.push_str(&format!(
                "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{fill}\"/>\n"
            )),
            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => out.push_str(&format!(
                "  <line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" stroke=\"{stroke}\" stroke-width=\"1\"/>\n"
            )),
            Shape::Text {
                x,
                y,
                content,
                anchor,
                rotate,
            } => {
                let transform = match rotate {
                    Some(deg) => format!(" transform=\"rotate({deg})\""),
                    None => String::new(),
                };
                out.push_str(&format!(
                    "  <text x=\"{x}\" y=\"{y}\" text-anchor=\"{}\"{transform}>{}</text>\n",
                    anchor.as_svg(),
                    escape(content)
                ));
            }
        }
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_scale_maps_endpoints() {
        let scale = LinearScale::new((0.0, 10.0), (50.0, 500.0));
        assert_eq!(scale.map(0.0), 50.0);
        assert_eq!(scale.map(10.0), 500.0);
        assert_eq!(scale.map(5.0), 275.0);
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let scale = LinearScale::new((4.0, 4.0), (0.0, 100.0));
        assert_eq!(scale.map(4.0), 50.0);
        assert_eq!(scale.map(9.0), 50.0);
    }

    #[test]
    fn inverted_range_supported() {
        // y scales run top-down: domain max lands at the smaller pixel value.
        let scale = LinearScale::new((0.0, 100.0), (250.0, 50.0));
        assert_eq!(scale.map(0.0), 250.0);
        assert_eq!(scale.map(100.0), 50.0);
    }

    #[test]
    fn extent_skips_non_finite() {
        let (lo, hi) = extent([3.0, f64::NAN, -1.0, 7.0]).unwrap();
        assert_eq!((lo, hi), (-1.0, 7.0));
        assert_eq!(extent([f64::NAN]), None);
    }

    #[test]
    fn band_scale_stays_in_range() {
        let scale = BandScale::new(5, (50.0, 500.0), 0.1);
        for i in 0..5 {
            let x = scale.position(i);
            assert!(x >= 50.0);
            assert!(x + scale.bandwidth() <= 500.0 + 1e-9);
        }
        assert!(scale.position(1) > scale.position(0));
    }

    #[test]
    fn svg_escapes_text_content() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.text(10.0, 10.0, "a<b & c", Anchor::Start);
        let svg = to_svg(&scene);
        assert!(svg.contains("a&lt;b &amp; c"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn svg_surface_writes_container_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = SvgSurface::new(dir.path()).unwrap();
        let mut scene = Scene::new(10.0, 10.0);
        scene.rect(0.0, 0.0, 5.0, 5.0, BASE_FILL);
        surface.render("scree-container", &scene).unwrap();

        let svg = std::fs::read_to_string(dir.path().join("scree-container.svg")).unwrap();
        assert!(svg.contains("<rect"));
        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains("scree-container.svg"));
    }
}
