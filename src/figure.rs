//! Multi-panel figures rendered to an owned raster canvas.
//!
//! A [`Figure`] is the drawing context: panels are laid out side by side in
//! one row, and [`Figure::capture`] consumes the figure, so the canvas is
//! released on every path out of the caller, including errors.

use std::io::Cursor;

use ab_glyph::{FontRef, PxScale};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageEncoder, ImageFormat, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use ndarray::{Array3, ArrayD, ArrayView2};

use crate::color::gray_level;
use crate::error::{PixelError, Result};

/// 10 x 10 inches at 100 dpi.
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (1000, 1000);

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TITLE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Height of the strip above the panels reserved for titles.
const TITLE_BAND: u32 = 20;
const TITLE_SCALE: PxScale = PxScale { x: 14.0, y: 14.0 };
/// Gap between panels and around the panel row.
const PANEL_MARGIN: u32 = 10;
/// Whitespace kept around the drawn content when capturing.
const CAPTURE_PAD: u32 = 10;

/// One axis-free image panel.
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: Option<String>,
    pub image: GrayImage,
}

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// An explicit plotting canvas.
#[derive(Debug)]
pub struct Figure {
    width: u32,
    height: u32,
    panels: Vec<Panel>,
}

impl Default for Figure {
    fn default() -> Self {
        Figure::new(DEFAULT_FIGURE_SIZE.0, DEFAULT_FIGURE_SIZE.1)
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        log::debug!("closing {}x{} figure", self.width, self.height);
    }
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        log::debug!("opening {width}x{height} figure");
        Figure {
            width,
            height,
            panels: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Panels in display order.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn clear(&mut self) {
        self.panels.clear();
    }

    /// Replace the panel row.
    pub fn set_panels(&mut self, panels: Vec<Panel>) {
        self.panels = panels;
    }

    /// Where each panel lands: equal-width slots, aspect ratio preserved,
    /// centred in its slot.
    fn layout(&self) -> Vec<Placement> {
        let n = self.panels.len() as u32;
        if n == 0 {
            return Vec::new();
        }
        let band = self.title_band();
        let slot_width = self.width.saturating_sub(PANEL_MARGIN * (n + 1)) / n;
        let slot_height = self.height.saturating_sub(2 * PANEL_MARGIN + band);

        self.panels
            .iter()
            .enumerate()
            .map(|(i, panel)| {
                let (w, h) = panel.image.dimensions();
                let scale = if w == 0 || h == 0 {
                    0.0
                } else {
                    (slot_width as f64 / w as f64).min(slot_height as f64 / h as f64)
                };
                let width = (w as f64 * scale).floor() as u32;
                let height = (h as f64 * scale).floor() as u32;
                let slot_x = PANEL_MARGIN + i as u32 * (slot_width + PANEL_MARGIN);
                Placement {
                    x: slot_x + (slot_width - width) / 2,
                    y: PANEL_MARGIN + band + (slot_height - height) / 2,
                    width,
                    height,
                }
            })
            .collect()
    }

    /// Rows above the panels taken by titles; zero when no panel has one.
    fn title_band(&self) -> u32 {
        if self.panels.iter().any(|p| p.title.is_some()) {
            TITLE_BAND
        } else {
            0
        }
    }

    /// Draw all panels, and their titles centred above them, onto a fresh
    /// white canvas.
    pub fn render(&self) -> Result<RgbaImage> {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        let font = if self.title_band() > 0 {
            Some(title_font()?)
        } else {
            None
        };

        for (panel, place) in self.panels.iter().zip(self.layout()) {
            if place.width == 0 || place.height == 0 {
                continue;
            }
            let scaled = imageops::resize(&panel.image, place.width, place.height, FilterType::Nearest);
            for (x, y, Luma([v])) in scaled.enumerate_pixels() {
                canvas.put_pixel(place.x + x, place.y + y, Rgba([*v, *v, *v, 255]));
            }

            if let (Some(title), Some(font)) = (&panel.title, &font) {
                let (text_width, text_height) = text_size(TITLE_SCALE, font, title);
                let x = place.x as i32 + (place.width as i32 - text_width as i32) / 2;
                let y = place.y as i32 - (TITLE_BAND as i32 + text_height as i32) / 2;
                draw_text_mut(&mut canvas, TITLE_COLOR, x, y, TITLE_SCALE, font, title);
            }
        }
        Ok(canvas)
    }

    /// Bounding box of the drawn panels plus padding, clipped to the canvas.
    fn tight_bounds(&self) -> (u32, u32, u32, u32) {
        let drawn: Vec<Placement> = self
            .layout()
            .into_iter()
            .filter(|p| p.width > 0 && p.height > 0)
            .collect();
        if drawn.is_empty() {
            return (0, 0, self.width, self.height);
        }
        let x0 = drawn.iter().map(|p| p.x).min().unwrap_or(0).saturating_sub(CAPTURE_PAD);
        let y0 = drawn
            .iter()
            .map(|p| p.y)
            .min()
            .unwrap_or(0)
            .saturating_sub(self.title_band() + CAPTURE_PAD);
        let x1 = drawn
            .iter()
            .map(|p| p.x + p.width)
            .max()
            .unwrap_or(self.width)
            .saturating_add(CAPTURE_PAD)
            .min(self.width);
        let y1 = drawn
            .iter()
            .map(|p| p.y + p.height)
            .max()
            .unwrap_or(self.height)
            .saturating_add(CAPTURE_PAD)
            .min(self.height);
        (x0, y0, x1 - x0, y1 - y0)
    }

    /// Rasterise the figure, close it, and return the pixels as `(rows, cols, 3)`.
    ///
    /// The canvas goes through an in-memory PNG and loses its alpha channel
    /// on the way back.
    pub fn capture(self) -> Result<Array3<u8>> {
        let (x, y, width, height) = self.tight_bounds();
        let rendered = self.render()?;
        let cropped = imageops::crop_imm(&rendered, x, y, width, height).to_image();

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            cropped.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        )?;

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
        if decoded.color().has_alpha() {
            log::debug!("dropping alpha from captured {width}x{height} figure");
        }
        let rgb = decoded.to_rgb8();

        Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())
            .map_err(|_| PixelError::shape(&[height as usize, width as usize, 3], &[]))
    }

    /// Encode the captured figure as PNG bytes.
    pub fn capture_png(self) -> Result<Vec<u8>> {
        let pixels = self.capture()?;
        let (rows, cols, _) = pixels.dim();
        let mut png = Cursor::new(Vec::new());
        let rgb = image::RgbImage::from_raw(cols as u32, rows as u32, pixels.into_raw_vec_and_offset().0)
            .ok_or_else(|| PixelError::shape(&[rows, cols, 3], &[]))?;
        rgb.write_to(&mut png, ImageFormat::Png)?;
        Ok(png.into_inner())
    }
}

/// Sans-serif face bundled with egui, used for panel titles.
fn title_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT).map_err(|_| PixelError::Font)
}

/// Grayscale panel image with per-image min/max scaling.
pub fn to_gray_image(image: ArrayView2<f64>) -> GrayImage {
    let finite = image.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (rows, cols) = image.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([gray_level(image[[y as usize, x as usize]], min, max)])
    })
}

/// Lay out `images` as one row of grayscale panels on `figure`.
///
/// Every image is reshaped to the shape of `images[0]`, so ravelled images
/// are displayed in their original layout. `titles`, when given, are matched
/// by index and must cover every image. Nothing is drawn unless every image
/// and title checks out.
pub fn visualize_image_list<S: AsRef<str>>(
    figure: &mut Figure,
    images: &[ArrayD<f64>],
    titles: Option<&[S]>,
) -> Result<()> {
    let first = images.first().ok_or(PixelError::EmptyImageList)?;
    let shape = first.shape();
    let (rows, cols) = match *shape {
        [rows, cols] => (rows, cols),
        _ => return Err(PixelError::shape(&[first.len(), 1], shape)),
    };

    let mut panels = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        let title = match titles {
            Some(titles) => Some(
                titles
                    .get(i)
                    .ok_or(PixelError::IndexOutOfRange {
                        index: i,
                        len: titles.len(),
                    })?
                    .as_ref()
                    .to_string(),
            ),
            None => None,
        };
        let view = image
            .to_shape((rows, cols))
            .map_err(|_| PixelError::shape(shape, image.shape()))?;
        panels.push(Panel {
            title,
            image: to_gray_image(view.view()),
        });
    }

    log::debug!("laying out {} panels of {rows}x{cols}", panels.len());
    figure.set_panels(panels);
    Ok(())
}

/// Open a figure, let `draw` fill it, and capture it.
///
/// The figure is dropped whether `draw` succeeds or not.
pub fn with_figure<F>(width: u32, height: u32, draw: F) -> Result<Array3<u8>>
where
    F: FnOnce(&mut Figure) -> Result<()>,
{
    let mut figure = Figure::new(width, height);
    draw(&mut figure)?;
    figure.capture()
}
