//! Scene drawing (plotters into an RGB buffer), PNG export, and the display
//! lifecycle used by the human render mode.

use std::path::Path;

use image::RgbImage;
use nalgebra::Vector2;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EnvError, EnvResult};

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const GREEN: [u8; 3] = [0, 255, 0];

/// Frame rate advertised to training harnesses.
pub const RENDER_FPS: u32 = 60;
pub const RENDER_MODES: [&str; 2] = ["human", "rgb_array"];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Human,
    RgbArray,
}

/// Row-major RGB image, `height x width x 3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, col: usize, row: usize) -> [u8; 3] {
        let i = (row * self.width + col) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn to_rgb_image(&self) -> EnvResult<RgbImage> {
        RgbImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone()).ok_or_else(
            || EnvError::Render(format!("buffer does not hold {}x{} pixels", self.width, self.height)),
        )
    }

    /// Encode as PNG at `path`.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> EnvResult<()> {
        self.to_rgb_image()?.save(path)?;
        Ok(())
    }
}

/// What gets drawn, in world coordinates (y up).
pub struct Scene<'a> {
    pub drone: &'a [Vector2<f64>],
    pub target_center: Vector2<f64>,
    pub target_radius: f64,
}

fn drawing_error<E: std::fmt::Display>(err: E) -> EnvError {
    EnvError::Render(err.to_string())
}

fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Draw `scene` on a white `width x height` frame. Row 0 is the top of the world.
pub fn draw_scene(width: u32, height: u32, scene: &Scene) -> EnvResult<Frame> {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    let to_screen = |p: &Vector2<f64>| (p.x.round() as i32, (height as f64 - p.y).round() as i32);

    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&rgb(WHITE)).map_err(drawing_error)?;

        if scene.drone.len() >= 3 {
            let outline: Vec<(i32, i32)> = scene.drone.iter().map(to_screen).collect();
            root.draw(&Polygon::new(outline, rgb(BLUE).filled()))
                .map_err(drawing_error)?;
        }

        root.draw(&Circle::new(
            to_screen(&scene.target_center),
            scene.target_radius.round() as i32,
            rgb(GREEN).filled(),
        ))
        .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
    }

    Ok(Frame {
        width: width as usize,
        height: height as usize,
        pixels,
    })
}

/// Destination for frames produced in human mode.
pub trait FrameSink: Send {
    fn open(&mut self, width: usize, height: usize) -> EnvResult<()>;
    fn present(&mut self, frame: &Frame) -> EnvResult<()>;
    fn close(&mut self);
}

/// Owns the optional display sink and tracks whether it is currently open.
/// The sink is opened on the first presented frame and closed on `release`
/// or drop.
pub struct DisplayContext {
    sink: Option<Box<dyn FrameSink>>,
    open: bool,
}

impl DisplayContext {
    pub fn new() -> Self {
        DisplayContext {
            sink: None,
            open: false,
        }
    }

    pub fn attach(&mut self, sink: Box<dyn FrameSink>) {
        self.release();
        self.sink = Some(sink);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the attached sink if it is not open yet.
    pub fn ensure_open(&mut self, width: usize, height: usize) -> EnvResult<()> {
        let sink = self.sink.as_mut().ok_or(EnvError::DisplayUnavailable)?;
        if !self.open {
            sink.open(width, height)?;
            self.open = true;
            debug!(width, height, "display opened");
        }
        Ok(())
    }

    pub fn present(&mut self, frame: &Frame) -> EnvResult<()> {
        self.ensure_open(frame.width, frame.height)?;
        match self.sink.as_mut() {
            Some(sink) => sink.present(frame),
            None => Err(EnvError::DisplayUnavailable),
        }
    }

    pub fn release(&mut self) {
        if self.open {
            if let Some(sink) = self.sink.as_mut() {
                sink.close();
            }
            self.open = false;
            debug!("display released");
        }
    }
}

impl Default for DisplayContext {
    fn default() -> Self {
        DisplayContext::new()
    }
}

impl Drop for DisplayContext {
    fn drop(&mut self) {
        self.release();
    }
}
