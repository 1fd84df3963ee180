use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use super::{DrawOp, Point, Rgb, Surface};
use crate::error::{ReportError, Result};

const FONT_FAMILY: &str = "sans-serif";

/// DejaVu Sans, used for chart text unless another font is registered.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

static FONT_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Registers a TrueType/OpenType font for chart text, replacing the bundled
/// one. Process-wide; the last registration wins.
pub fn register_font_file(path: &Path) -> Result<()> {
    let bytes = fs::read(path).map_err(|e| ReportError::io(path, e))?;
    // plotters keeps a reference for the lifetime of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| ReportError::chart(format!("{} is not a usable font", path.display())))?;
    FONT_REGISTERED.store(true, Ordering::Release);
    tracing::debug!(font = %path.display(), "registered chart font");
    Ok(())
}

/// Makes sure some font backs [`FONT_FAMILY`], falling back to the bundled one.
fn ensure_font() -> Result<()> {
    if FONT_REGISTERED.load(Ordering::Acquire) {
        return Ok(());
    }
    register_font(FONT_FAMILY, FontStyle::Normal, BUNDLED_FONT)
        .map_err(|_| ReportError::chart("bundled chart font is unusable"))?;
    FONT_REGISTERED.store(true, Ordering::Release);
    tracing::debug!("registered bundled chart font");
    Ok(())
}

fn color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn coord(p: Point) -> (i32, i32) {
    (p.x, p.y)
}

fn chart_error<E>(path: &Path, err: DrawingAreaErrorKind<E>) -> ReportError
where
    E: std::error::Error + Send + Sync,
{
    ReportError::chart(format!("{}: {err}", path.display()))
}

/// PNG surface backed by plotters' bitmap backend.
///
/// Operations are buffered and rasterized when the surface is saved.
#[derive(Debug, Clone)]
pub struct PlottersSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl PlottersSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }
}

impl Surface for PlottersSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) -> Result<()> {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb) -> Result<()> {
        self.ops.push(DrawOp::Line { from, to, color });
        Ok(())
    }

    fn fill_rect(&mut self, top_left: Point, bottom_right: Point, color: Rgb) -> Result<()> {
        self.ops.push(DrawOp::Rect {
            top_left,
            bottom_right,
            color,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, size: u32, color: Rgb) -> Result<()> {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            size,
            color,
        });
        Ok(())
    }

    fn save_png(&mut self, path: &Path) -> Result<()> {
        let chart_err = |e| chart_error(path, e);

        if self.ops.iter().any(|op| matches!(op, DrawOp::Text { .. })) {
            ensure_font()?;
        }

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        for op in &self.ops {
            match op {
                DrawOp::Clear(c) => root.fill(&color(*c)).map_err(chart_err)?,
                DrawOp::Line { from, to, color: c } => root
                    .draw(&PathElement::new(vec![coord(*from), coord(*to)], color(*c)))
                    .map_err(chart_err)?,
                DrawOp::Rect {
                    top_left,
                    bottom_right,
                    color: c,
                } => root
                    .draw(&Rectangle::new(
                        [coord(*top_left), coord(*bottom_right)],
                        color(*c).filled(),
                    ))
                    .map_err(chart_err)?,
                DrawOp::Text {
                    text,
                    at,
                    size,
                    color: c,
                } => {
                    let style = (FONT_FAMILY, f64::from(*size))
                        .into_font()
                        .color(&color(*c));
                    root.draw(&Text::new(text.as_str(), coord(*at), style))
                        .map_err(chart_err)?;
                }
            }
        }
        root.present().map_err(chart_err)

    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{render_chart, ChartSpec, CHART_HEIGHT, CHART_WIDTH};
    use crate::Metric;
    use tempfile::tempdir;

    fn spec<'a>(test_type: &'a str, old_version: &'a str) -> ChartSpec<'a> {
        ChartSpec {
            metric: Metric::Max,
            threshold: 10,
            test_type,
            create_date: "2026-10-01",
            build_id: "42",
            old_version,
        }
    }

    fn render_png(surface: &mut PlottersSurface, path: &Path) -> Vec<u8> {
        surface.save_png(path).unwrap();
        fs::read(path).unwrap()
    }

    #[test]
    fn test_writes_png() {
        let dir = tempdir().unwrap();
        let deltas = [Some(12.0), Some(-4.0), None];

        let mut surface = PlottersSurface::new(CHART_WIDTH, CHART_HEIGHT);
        render_chart(&mut surface, &spec("Component", "7.0"), &deltas).unwrap();
        let component = render_png(&mut surface, &dir.path().join("a.png"));
        assert!(component.starts_with(&[0x89, b'P', b'N', b'G']));

        let mut other = PlottersSurface::new(CHART_WIDTH, CHART_HEIGHT);
        render_chart(&mut other, &spec("TotallyDifferentSuiteName", "99.9"), &deltas).unwrap();
        let renamed = render_png(&mut other, &dir.path().join("b.png"));

        // same bars, different legend and title
        assert_ne!(component, renamed);
    }

    #[test]
    fn test_text_reaches_the_image_for_empty_series() {
        let dir = tempdir().unwrap();

        let mut surface = PlottersSurface::new(CHART_WIDTH, CHART_HEIGHT);
        render_chart(&mut surface, &spec("Component", "7.0"), &[]).unwrap();
        let with_text = render_png(&mut surface, &dir.path().join("text.png"));

        surface.ops.retain(|op| !matches!(op, DrawOp::Text { .. }));
        let without_text = render_png(&mut surface, &dir.path().join("bare.png"));

        assert_ne!(with_text, without_text);
    }

    #[test]
    fn test_bundled_font_parses() {
        assert!(ensure_font().is_ok());
    }

    #[test]
    fn test_non_font_file_is_chart_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.ttf");
        fs::write(&path, b"not a font").unwrap();
        let err = register_font_file(&path).unwrap_err();
        assert!(matches!(err, ReportError::Chart(_)));
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = register_font_file(&dir.path().join("nope.ttf")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
