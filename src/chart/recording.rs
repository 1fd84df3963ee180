use std::path::{Path, PathBuf};

use super::{DrawOp, Point, Rgb, Surface};
use crate::error::Result;

/// Keeps draw operations in memory; saving only records the target path.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    saved: Vec<PathBuf>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl Surface for RecordingSurface {
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
        self.saved.push(path.to_path_buf());
        Ok(())
    }
}
