//! Per-frame text overlay.

use crate::host::{Canvas, Rgba};
use crate::reading::{ReadingSnapshot, Vector3};

/// Uniform text scale.
pub const TEXT_SCALE: f32 = 4.0;
/// Glyph cell edge of the debug font, in logical units.
pub const CHAR_SIZE: f32 = 8.0;
/// Longest line a value can occupy; longer text is cut.
pub const LINE_CAPACITY: usize = 9;

const BLOCK_WIDTH: f32 = CHAR_SIZE * LINE_CAPACITY as f32;
const CENTER_X_OFFSET: f32 = CHAR_SIZE * 2.0;
const CENTER_Y_OFFSET: f32 = CHAR_SIZE * 2.0;

const ACCEL_LABEL: &str = "ACCL";
const GYRO_LABEL: &str = "GYRO";

const BACKGROUND: Rgba = Rgba::BLACK;
const FOREGROUND: Rgba = Rgba::WHITE;

/// Draws the ACCL / GYRO blocks either side of the surface center.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRenderer;

impl FrameRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<C: Canvas + ?Sized>(&self, snapshot: &ReadingSnapshot, canvas: &mut C) {
        let (w, h) = canvas.output_size();
        canvas.set_scale(TEXT_SCALE, TEXT_SCALE);
        canvas.set_draw_color(BACKGROUND);
        canvas.clear();
        canvas.set_draw_color(FOREGROUND);

        let cx = (w as f32 / TEXT_SCALE) / 2.0;
        let cy = (h as f32 / TEXT_SCALE) / 2.0;
        let y = cy - CENTER_Y_OFFSET;

        draw_block(canvas, cx - CENTER_X_OFFSET - BLOCK_WIDTH, y, ACCEL_LABEL, snapshot.accel);
        draw_block(canvas, cx + CENTER_X_OFFSET, y, GYRO_LABEL, snapshot.rotation);

        canvas.present();
    }
}

fn draw_block<C: Canvas + ?Sized>(canvas: &mut C, x: f32, y: f32, label: &str, value: Vector3) {
    canvas.draw_text(x, y, label);
    for (row, (axis, v)) in [('X', value.x), ('Y', value.y), ('Z', value.z)].into_iter().enumerate() {
        let line = format_axis(axis, v);
        canvas.draw_text(x, y + CHAR_SIZE * (row + 1) as f32, &line);
    }
}

/// `"<axis>: <value>"` with two decimals, cut to [`LINE_CAPACITY`] characters.
pub fn format_axis(axis: char, value: f32) -> String {
    let mut line = format!("{axis}: {value:.2}");
    if line.len() > LINE_CAPACITY {
        let cut = (0..=LINE_CAPACITY)
            .rev()
            .find(|&i| line.is_char_boundary(i))
            .unwrap_or(0);
        line.truncate(cut);
    }
    line
}
