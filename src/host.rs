//! Interfaces the application consumes from its host environment.
//!
//! The application context only talks to a window, a drawing surface and a
//! sensor subsystem through these traits, so the same state machine can be
//! driven by the terminal host or by test doubles.

use crate::error::HostError;
use crate::sensors::SensorSubsystem;

/// Display-mode flags of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowFlags {
    pub fullscreen: bool,
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Window handle operations.
#[cfg_attr(test, mockall::automock)]
pub trait Window {
    fn flags(&self) -> WindowFlags;
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), HostError>;
}

/// Drawing primitives of the render surface.
///
/// Drawing is assumed to succeed; implementations deal with their own
/// backend failures.
#[cfg_attr(test, mockall::automock)]
pub trait Canvas {
    /// Physical output size in pixels.
    fn output_size(&self) -> (u32, u32);
    fn set_draw_color(&mut self, color: Rgba);
    fn clear(&mut self);
    fn set_scale(&mut self, sx: f32, sy: f32);
    fn draw_text(&mut self, x: f32, y: f32, text: &str);
    fn present(&mut self);
}

/// A window together with its render surface.
pub trait Surface: Window + Canvas {}

impl<T: Window + Canvas> Surface for T {}

/// Subsystem initialisation performed once at startup.
pub trait Host {
    type Surface: Surface;

    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
        flags: WindowFlags,
    ) -> Result<Self::Surface, HostError>;

    fn init_sensors(&mut self) -> Result<SensorSubsystem, HostError>;
}
