//! Bar charts of percentage deltas against a pass/fail threshold.
//!
//! Layout is computed here and issued as primitive operations on a [`Surface`];
//! rasterizing and encoding are the surface's business.

mod bitmap;
mod recording;

use std::path::Path;

use crate::error::Result;
use crate::Metric;

pub use bitmap::{register_font_file, PlottersSurface};
pub use recording::RecordingSurface;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

const LEGEND_FONT_SIZE: u32 = 16;
const TITLE_FONT_SIZE: u32 = 18;

// Plot area inside the image, in pixels.
const PLOT_LEFT: i32 = 40;
const PLOT_RIGHT: i32 = CHART_WIDTH as i32 - 20;
const PLOT_TOP: i32 = 30;
const PLOT_BOTTOM: i32 = CHART_HEIGHT as i32 - 40;

/// Unavailable deltas get a marker of this half-height on the zero axis.
const MISSING_MARKER: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GREY: Rgb = Rgb(160, 160, 160);
    pub const RED: Rgb = Rgb(214, 39, 40);
    pub const GREEN: Rgb = Rgb(44, 160, 44);
    pub const STEEL_BLUE: Rgb = Rgb(70, 130, 180);
    pub const DARK_BLUE: Rgb = Rgb(0, 0, 139);
    pub const DARK_GREEN: Rgb = Rgb(0, 100, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A primitive drawing operation, as issued to a [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rgb),
    Line {
        from: Point,
        to: Point,
        color: Rgb,
    },
    Rect {
        top_left: Point,
        bottom_right: Point,
        color: Rgb,
    },
    Text {
        text: String,
        at: Point,
        size: u32,
        color: Rgb,
    },
}

/// Drawing capability the chart renderer is written against.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgb) -> Result<()>;
    fn draw_line(&mut self, from: Point, to: Point, color: Rgb) -> Result<()>;
    fn fill_rect(&mut self, top_left: Point, bottom_right: Point, color: Rgb) -> Result<()>;
    /// `at` is the top-left corner of the text box.
    fn draw_text(&mut self, text: &str, at: Point, size: u32, color: Rgb) -> Result<()>;
    fn save_png(&mut self, path: &Path) -> Result<()>;
}

/// How a delta relates to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaClass {
    /// Slower than `+threshold`.
    Regressed,
    /// Faster than `-threshold`.
    Improved,
    Within,
    Unavailable,
}

impl DeltaClass {
    pub fn classify(delta: Option<f64>, threshold: u32) -> Self {
        let limit = f64::from(threshold);
        match delta {
            None => DeltaClass::Unavailable,
            Some(d) if d > limit => DeltaClass::Regressed,
            Some(d) if d < -limit => DeltaClass::Improved,
            Some(_) => DeltaClass::Within,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            DeltaClass::Regressed => Rgb::RED,
            DeltaClass::Improved => Rgb::GREEN,
            DeltaClass::Within => Rgb::STEEL_BLUE,
            DeltaClass::Unavailable => Rgb::GREY,
        }
    }
}

/// Run metadata printed on a chart.
#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub metric: Metric,
    pub threshold: u32,
    pub test_type: &'a str,
    pub create_date: &'a str,
    pub build_id: &'a str,
    pub old_version: &'a str,
}

impl ChartSpec<'_> {
    pub fn legend(&self) -> String {
        format!(
            "{} / {} / {} / {} %",
            self.test_type, self.create_date, self.build_id, self.threshold
        )
    }

    pub fn title(&self) -> String {
        format!("{} [ V{} ]", self.metric.label(), self.old_version)
    }
}

/// Pixel geometry of one delta slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub class: DeltaClass,
    pub left: i32,
    pub right: i32,
    /// Screen rows spanned; `top <= bottom`.
    pub top: i32,
    pub bottom: i32,
}

/// Vertical scale: symmetric around zero, always wide enough to show the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub span: f64,
}

impl Scale {
    pub fn fit(deltas: &[Option<f64>], threshold: u32) -> Self {
        let largest = deltas
            .iter()
            .flatten()
            .fold(f64::from(threshold), |acc, d| acc.max(d.abs()));
        Self {
            span: (largest * 1.1).max(1.0),
        }
    }

    pub fn zero_row(&self) -> i32 {
        (PLOT_TOP + PLOT_BOTTOM) / 2
    }

    /// Screen row of `value` percent; positive values are drawn upward.
    pub fn row(&self, value: f64) -> i32 {
        let half = f64::from(PLOT_BOTTOM - PLOT_TOP) / 2.0;
        let offset = (value / self.span * half).round() as i32;
        (self.zero_row() - offset).clamp(PLOT_TOP, PLOT_BOTTOM)
    }
}

pub fn layout_bars(deltas: &[Option<f64>], threshold: u32, scale: &Scale) -> Vec<Bar> {
    if deltas.is_empty() {
        return Vec::new();
    }
    let slot = f64::from(PLOT_RIGHT - PLOT_LEFT) / deltas.len() as f64;
    let width = (slot * 0.6).max(1.0);
    let zero = scale.zero_row();

    deltas
        .iter()
        .enumerate()
        .map(|(i, delta)| {
            let center = f64::from(PLOT_LEFT) + slot * (i as f64 + 0.5);
            let left = (center - width / 2.0).round() as i32;
            let right = ((center + width / 2.0).round() as i32).max(left + 1);
            let class = DeltaClass::classify(*delta, threshold);
            let (top, bottom) = match delta {
                Some(d) => {
                    let row = scale.row(*d);
                    (row.min(zero), row.max(zero))
                }
                None => (zero - MISSING_MARKER, zero + MISSING_MARKER),
            };
            Bar {
                class,
                left,
                right,
                top,
                bottom,
            }
        })
        .collect()
}

/// Draws the full chart. The caller saves the surface.
pub fn render_chart<S: Surface + ?Sized>(
    surface: &mut S,
    spec: &ChartSpec<'_>,
    deltas: &[Option<f64>],
) -> Result<()> {
    let (width, height) = surface.size();
    let (width, height) = (width as i32, height as i32);
    surface.clear(Rgb::WHITE)?;

    let scale = Scale::fit(deltas, spec.threshold);
    for bar in layout_bars(deltas, spec.threshold, &scale) {
        surface.fill_rect(
            Point::new(bar.left, bar.top),
            Point::new(bar.right, bar.bottom),
            bar.class.color(),
        )?;
    }

    let threshold = f64::from(spec.threshold);
    let zero = scale.zero_row();
    surface.draw_line(
        Point::new(PLOT_LEFT, zero),
        Point::new(PLOT_RIGHT, zero),
        Rgb::BLACK,
    )?;
    for (value, color) in [(threshold, Rgb::RED), (-threshold, Rgb::GREEN)] {
        let row = scale.row(value);
        surface.draw_line(Point::new(PLOT_LEFT, row), Point::new(PLOT_RIGHT, row), color)?;
    }

    surface.draw_text(
        &spec.legend(),
        Point::new(width / 2 - 110, 0),
        LEGEND_FONT_SIZE,
        Rgb::DARK_BLUE,
    )?;
    surface.draw_text(
        &spec.title(),
        Point::new(width / 2 - 25, height - 30),
        TITLE_FONT_SIZE,
        Rgb::DARK_GREEN,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(metric: Metric) -> ChartSpec<'static> {
        ChartSpec {
            metric,
            threshold: 10,
            test_type: "Component",
            create_date: "2026-10-01",
            build_id: "42",
            old_version: "7.0",
        }
    }

    fn texts(surface: &RecordingSurface) -> Vec<(String, Point)> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, at, .. } => Some((text.clone(), *at)),
                _ => None,
            })
            .collect()
    }

    fn rects(surface: &RecordingSurface) -> Vec<Rgb> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_legend_and_title_text() {
        let s = spec(Metric::Mean);
        assert_eq!(s.legend(), "Component / 2026-10-01 / 42 / 10 %");
        assert_eq!(s.title(), "Mean [ V7.0 ]");
    }

    #[test]
    fn test_classify() {
        assert_eq!(DeltaClass::classify(Some(10.5), 10), DeltaClass::Regressed);
        assert_eq!(DeltaClass::classify(Some(10.0), 10), DeltaClass::Within);
        assert_eq!(DeltaClass::classify(Some(-3.0), 10), DeltaClass::Within);
        assert_eq!(DeltaClass::classify(Some(-12.0), 10), DeltaClass::Improved);
        assert_eq!(DeltaClass::classify(None, 10), DeltaClass::Unavailable);
    }

    #[test]
    fn test_render_order_and_bar_colors() {
        let mut surface = RecordingSurface::new(CHART_WIDTH, CHART_HEIGHT);
        let deltas = [Some(25.0), Some(1.0), Some(-20.0), None];
        render_chart(&mut surface, &spec(Metric::Max), &deltas).unwrap();

        assert_eq!(surface.ops()[0], DrawOp::Clear(Rgb::WHITE));
        assert_eq!(
            rects(&surface),
            [Rgb::RED, Rgb::STEEL_BLUE, Rgb::GREEN, Rgb::GREY]
        );

        let text = texts(&surface);
        assert_eq!(text.len(), 2);
        assert_eq!(text[0].0, "Component / 2026-10-01 / 42 / 10 %");
        assert_eq!(text[0].1, Point::new(290, 0));
        assert_eq!(text[1].0, "Max [ V7.0 ]");
        assert_eq!(text[1].1, Point::new(375, 370));
    }

    #[test]
    fn test_threshold_lines_drawn() {
        let mut surface = RecordingSurface::new(CHART_WIDTH, CHART_HEIGHT);
        render_chart(&mut surface, &spec(Metric::Min), &[Some(5.0)]).unwrap();

        let scale = Scale::fit(&[Some(5.0)], 10);
        let lines: Vec<(i32, Rgb)> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { from, to, color } if from.y == to.y => Some((from.y, *color)),
                _ => None,
            })
            .collect();
        assert!(lines.contains(&(scale.zero_row(), Rgb::BLACK)));
        assert!(lines.contains(&(scale.row(10.0), Rgb::RED)));
        assert!(lines.contains(&(scale.row(-10.0), Rgb::GREEN)));
        assert!(scale.row(10.0) < scale.zero_row());
    }

    #[test]
    fn test_empty_series_keeps_legend_and_title() {
        let mut surface = RecordingSurface::new(CHART_WIDTH, CHART_HEIGHT);
        render_chart(&mut surface, &spec(Metric::Mean), &[]).unwrap();

        assert!(rects(&surface).is_empty());
        assert_eq!(texts(&surface).len(), 2);
    }

    #[test]
    fn test_bars_stay_inside_plot_area() {
        let deltas: Vec<Option<f64>> = (0..200).map(|i| Some((i as f64 - 100.0) * 7.5)).collect();
        let scale = Scale::fit(&deltas, 5);
        let bars = layout_bars(&deltas, 5, &scale);

        assert_eq!(bars.len(), deltas.len());
        for bar in &bars {
            assert!(bar.left >= PLOT_LEFT && bar.right <= PLOT_RIGHT + 1);
            assert!(bar.top >= PLOT_TOP && bar.bottom <= PLOT_BOTTOM);
            assert!(bar.top <= bar.bottom && bar.left < bar.right);
        }
        assert!(bars.windows(2).all(|w| w[0].left <= w[1].left));
    }

    #[test]
    fn test_scale_covers_threshold_when_deltas_small() {
        let scale = Scale::fit(&[Some(0.5), None], 20);
        assert!(scale.span >= 20.0);
        assert!(scale.row(20.0) > PLOT_TOP);
    }
}
