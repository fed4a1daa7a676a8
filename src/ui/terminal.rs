//! Terminal host: a ratatui surface standing in for a desktop window.
//!
//! The window is a titled box, centered in the alternate screen, whose size in
//! cells is its configured pixel size divided by one glyph cell at ×4 scale.
//! Fullscreen drops the border and uses the whole terminal.

use std::io::{self, Stdout};

use crossterm::{cursor, terminal, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};
use ratatui::Terminal;

use crate::config::SensorConfig;
use crate::error::HostError;
use crate::host::{Canvas, Host, Rgba, Window, WindowFlags};
use crate::sensors::{self, SensorSubsystem};

/// Pixels covered by one terminal cell horizontally.
pub const CELL_WIDTH_PX: u32 = 32;
/// Pixels covered by one terminal cell vertically.
pub const CELL_HEIGHT_PX: u32 = 32;

const FALLBACK_SCREEN: (u16, u16) = (80, 24);

fn to_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

#[derive(Debug, Clone, PartialEq)]
struct TextCommand {
    x: f32,
    y: f32,
    text: String,
    color: Rgba,
}

/// Frame state and window geometry, independent of the real terminal.
#[derive(Debug)]
pub struct CellCanvas {
    title: String,
    cols: u16,
    rows: u16,
    fullscreen: bool,
    draw_color: Rgba,
    background: Rgba,
    scale: (f32, f32),
    texts: Vec<TextCommand>,
}

impl CellCanvas {
    pub fn new(title: &str, width: u32, height: u32, flags: WindowFlags) -> Self {
        let cells = |px: u32, cell: u32| u16::try_from((px / cell).max(1)).unwrap_or(u16::MAX);
        Self {
            title: title.to_string(),
            cols: cells(width, CELL_WIDTH_PX),
            rows: cells(height, CELL_HEIGHT_PX),
            fullscreen: flags.fullscreen,
            draw_color: Rgba::WHITE,
            background: Rgba::BLACK,
            scale: (1.0, 1.0),
            texts: Vec::new(),
        }
    }

    pub fn flags(&self) -> WindowFlags {
        WindowFlags {
            fullscreen: self.fullscreen,
        }
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    /// Outer box of the window, border included, clamped to `screen`.
    fn window_frame(&self, screen: Rect) -> Rect {
        let width = self.cols.saturating_add(2).min(screen.width);
        let height = self.rows.saturating_add(2).min(screen.height);
        Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        )
    }

    /// Cells text can be drawn into.
    pub fn drawing_area(&self, screen: Rect) -> Rect {
        if self.fullscreen {
            screen
        } else {
            self.window_frame(screen).inner(Margin::new(1, 1))
        }
    }

    pub fn output_size(&self, screen: Rect) -> (u32, u32) {
        let area = self.drawing_area(screen);
        (
            u32::from(area.width) * CELL_WIDTH_PX,
            u32::from(area.height) * CELL_HEIGHT_PX,
        )
    }

    pub fn set_draw_color(&mut self, color: Rgba) {
        self.draw_color = color;
    }

    pub fn clear(&mut self) {
        self.background = self.draw_color;
        self.texts.clear();
    }

    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        self.scale = (sx, sy);
    }

    pub fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        self.texts.push(TextCommand {
            x,
            y,
            text: text.to_string(),
            color: self.draw_color,
        });
    }

    /// Paint the current frame. Text outside the drawing area is clipped.
    pub fn paint(&self, buf: &mut Buffer, screen: Rect) {
        let area = self.drawing_area(screen);
        if !self.fullscreen {
            Block::bordered()
                .title(format!(" {} ", self.title))
                .render(self.window_frame(screen), buf);
        }

        let background = to_color(self.background);
        buf.set_style(area, Style::default().bg(background));

        for cmd in &self.texts {
            let px = cmd.x * self.scale.0;
            let py = cmd.y * self.scale.1;
            if px < 0.0 || py < 0.0 {
                continue;
            }
            let col = (px / CELL_WIDTH_PX as f32) as u32;
            let row = (py / CELL_HEIGHT_PX as f32) as u32;
            if col >= u32::from(area.width) || row >= u32::from(area.height) {
                continue;
            }

            let x = area.x + col as u16;
            let y = area.y + row as u16;
            let style = Style::default().fg(to_color(cmd.color)).bg(background);
            buf.set_stringn(x, y, &cmd.text, usize::from(area.right() - x), style);
        }
    }
}

/// Undo raw mode and the alternate screen.
fn restore_terminal() {
    let mut stdout = io::stdout();
    let _ = terminal::disable_raw_mode();
    let _ = stdout.execute(terminal::LeaveAlternateScreen);
    let _ = stdout.execute(cursor::Show);
}

fn enter_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(terminal::EnterAlternateScreen)?;
    stdout.execute(cursor::Hide)?;
    Ok(())
}

fn screen() -> Rect {
    let (width, height) = terminal::size().unwrap_or(FALLBACK_SCREEN);
    Rect::new(0, 0, width, height)
}

/// The live terminal. Restores the terminal when dropped.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    canvas: CellCanvas,
}

impl TerminalSurface {
    pub fn open(title: &str, width: u32, height: u32, flags: WindowFlags) -> Result<Self, HostError> {
        if let Err(e) = enter_terminal() {
            restore_terminal();
            return Err(e.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(e.into());
            }
        };

        tracing::info!(title, width, height, fullscreen = flags.fullscreen, "window created");
        Ok(Self {
            terminal,
            canvas: CellCanvas::new(title, width, height, flags),
        })
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        restore_terminal();
    }
}

impl Window for TerminalSurface {
    fn flags(&self) -> WindowFlags {
        self.canvas.flags()
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), HostError> {
        terminal::size()?;
        self.canvas.set_fullscreen(fullscreen);
        self.terminal.clear()?;
        Ok(())
    }
}

impl Canvas for TerminalSurface {
    fn output_size(&self) -> (u32, u32) {
        self.canvas.output_size(screen())
    }

    fn set_draw_color(&mut self, color: Rgba) {
        self.canvas.set_draw_color(color);
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn set_scale(&mut self, sx: f32, sy: f32) {
        self.canvas.set_scale(sx, sy);
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        self.canvas.draw_text(x, y, text);
    }

    fn present(&mut self) {
        let canvas = &self.canvas;
        let drawn = self.terminal.draw(|frame| {
            let area = frame.area();
            canvas.paint(frame.buffer_mut(), area);
        });
        if let Err(e) = drawn {
            tracing::warn!(error = %e, "frame present failed");
        }
    }
}

/// Creates the terminal surface and opens the configured sensor device.
pub struct TerminalHost {
    sensors: SensorConfig,
}

impl TerminalHost {
    pub fn new(sensors: SensorConfig) -> Self {
        Self { sensors }
    }
}

impl Host for TerminalHost {
    type Surface = TerminalSurface;

    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> Result<TerminalSurface, HostError> {
        TerminalSurface::open(title, width, height, flags)
    }

    fn init_sensors(&mut self) -> Result<SensorSubsystem, HostError> {
        sensors::open(&self.sensors)
    }
}
