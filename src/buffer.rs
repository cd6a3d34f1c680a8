//! Owned RGBA raster surfaces. Pixel `(x, y)` is centered on the point `(x, y)`;
//! strokes are aliased and paint every pixel whose center lies inside the pen.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use egui::{Color32, ColorImage, Pos2, Vec2};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, Rgba, RgbaImage};

use crate::brush::{CapStyle, PenStyle};
use crate::error::{CanvasError, CanvasResult};

/// Width and height of a raster surface. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::invalid_parameter(
                "canvas size",
                format!("{}x{}", width, height),
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The largest size with this aspect ratio that fits inside `bounds`
    pub fn fit_within(&self, bounds: Size) -> Size {
        let (w, h) = (self.width as u64, self.height as u64);
        let (bw, bh) = (bounds.width as u64, bounds.height as u64);

        // Width we would get by matching the bound's height exactly
        let matched_width = (bh * w + h / 2) / h;
        let (fw, fh) = if matched_width <= bw {
            (matched_width, bh)
        } else {
            (bw, (bw * h + w / 2) / w)
        };

        Size {
            width: fw.clamp(1, bw) as u32,
            height: fh.clamp(1, bh) as u32,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An owned RGBA raster surface that strokes are rendered into.
///
/// Points are in buffer coordinates with pixel `(x, y)` centered on `(x, y)`.
/// Rendering is aliased: a pixel takes the pen color when its center lies inside
/// the pen footprint, and pixels outside the buffer are clipped.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

// Custom Debug implementation, the pixel data is far too large to print
impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("size", &self.size())
            .finish()
    }
}

impl PixelBuffer {
    /// Create a buffer of the given size filled with `color`
    pub fn new(size: Size, color: Color32) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, to_rgba(color)),
        }
    }

    /// Wrap an existing image, rejecting empty ones
    pub fn from_image(image: RgbaImage) -> CanvasResult<Self> {
        Size::new(image.width(), image.height())?;
        Ok(Self { image })
    }

    /// Decode an image file, converting it to RGBA
    pub fn open(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|err| CanvasError::io(path, err))?;
        log::debug!(
            "Decoded {}: {}x{}",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Self::from_image(decoded.into_rgba8())
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color of the pixel at `(x, y)`, or `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        self.image.get_pixel_checked(x, y).map(|px| {
            let [r, g, b, a] = px.0;
            Color32::from_rgba_unmultiplied(r, g, b, a)
        })
    }

    /// Read-only view of the underlying image
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Copy the pixels into an egui image for uploading as a texture
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.image.width() as usize, self.image.height() as usize],
            self.image.as_raw(),
        )
    }

    pub fn fill(&mut self, color: Color32) {
        let rgba = to_rgba(color);
        for px in self.image.pixels_mut() {
            *px = rgba;
        }
    }

    /// Stamp a single point: a disc for round caps, a square otherwise
    pub fn plot_point(&mut self, point: Pos2, pen: &PenStyle) {
        let hw = pen.half_width();
        let rgba = to_rgba(pen.color);
        let Some((x_range, y_range)) = self.clip(point, point, hw) else {
            return;
        };

        for y in y_range {
            for x in x_range.clone() {
                let offset = Pos2::new(x as f32, y as f32) - point;
                let inside = match pen.cap {
                    CapStyle::Round => offset.length() <= hw,
                    CapStyle::Square | CapStyle::Flat => {
                        offset.x.abs() <= hw && offset.y.abs() <= hw
                    }
                };
                if inside {
                    self.image.put_pixel(x, y, rgba);
                }
            }
        }
    }

    /// Stroke a straight segment; degenerates to [`Self::plot_point`] when `from == to`
    pub fn stroke_line(&mut self, from: Pos2, to: Pos2, pen: &PenStyle) {
        if from == to {
            self.plot_point(to, pen);
            return;
        }

        let hw = pen.half_width();
        let rgba = to_rgba(pen.color);
        let delta = to - from;
        let length = delta.length();
        let dir = delta / length;
        let dashes = pen.dash_lengths();
        // Square caps reach diagonally past the endpoints
        let Some((x_range, y_range)) = self.clip(from, to, hw * std::f32::consts::SQRT_2) else {
            return;
        };

        for y in y_range {
            for x in x_range.clone() {
                let offset = Pos2::new(x as f32, y as f32) - from;
                let along = offset.dot(dir);
                let across = cross(offset, dir).abs();
                let inside = match pen.cap {
                    CapStyle::Flat => (0.0..=length).contains(&along) && across <= hw,
                    CapStyle::Square => (-hw..=length + hw).contains(&along) && across <= hw,
                    CapStyle::Round => {
                        let nearest = dir * along.clamp(0.0, length);
                        (offset - nearest).length() <= hw
                    }
                };
                if inside && dash_is_on(dashes.as_deref(), along.clamp(0.0, length)) {
                    self.image.put_pixel(x, y, rgba);
                }
            }
        }
    }

    /// A smoothly resampled copy fitted inside `bounds`, keeping the aspect ratio
    pub fn scaled_to(&self, bounds: Size) -> PixelBuffer {
        let target = self.size().fit_within(bounds);
        if target == self.size() {
            return self.clone();
        }
        Self {
            image: imageops::resize(
                &self.image,
                target.width,
                target.height,
                FilterType::Triangle,
            ),
        }
    }

    /// Encode the pixels as `format` and write them to `path`.
    ///
    /// The whole file is encoded in memory first so a codec failure never leaves a
    /// partial file behind. The buffer itself is never modified.
    pub fn encode(&self, path: impl AsRef<Path>, format: ImageFormat) -> CanvasResult<()> {
        let path = path.as_ref();
        let mut image = DynamicImage::ImageRgba8(self.image.clone());
        if !supports_alpha(format) {
            image = DynamicImage::ImageRgb8(image.into_rgb8());
        }

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .map_err(|err| CanvasError::io(path, err))?;
        std::fs::write(path, &bytes)
            .map_err(|err| CanvasError::io(path, ImageError::IoError(err)))?;

        log::info!(
            "Wrote {} ({} bytes, {:?})",
            path.display(),
            bytes.len(),
            format
        );
        Ok(())
    }

    /// Encode to `path`, choosing the format from its extension
    pub fn save(&self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let path = path.as_ref();
        let format = format_for_path(path)?;
        self.encode(path, format)
    }

    /// Pixel ranges covering the segment `from..to` widened by `margin`, clipped to the buffer
    fn clip(
        &self,
        from: Pos2,
        to: Pos2,
        margin: f32,
    ) -> Option<(std::ops::RangeInclusive<u32>, std::ops::RangeInclusive<u32>)> {
        let min = from.min(to) - Vec2::splat(margin);
        let max = from.max(to) + Vec2::splat(margin);
        let max_x = self.image.width() as f32 - 1.0;
        let max_y = self.image.height() as f32 - 1.0;
        if max.x < 0.0 || max.y < 0.0 || min.x > max_x || min.y > max_y {
            return None;
        }

        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = max.x.ceil().min(max_x) as u32;
        let y1 = max.y.ceil().min(max_y) as u32;
        Some((x0..=x1, y0..=y1))
    }
}

/// Map a file extension to an image format
pub fn format_for_path(path: &Path) -> CanvasResult<ImageFormat> {
    ImageFormat::from_path(path).map_err(|_| {
        CanvasError::invalid_parameter("image format", path.display())
    })
}

fn supports_alpha(format: ImageFormat) -> bool {
    !matches!(format, ImageFormat::Jpeg)
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Whether the dash pattern is "on" at `distance` pixels along the stroke
fn dash_is_on(dashes: Option<&[f32]>, distance: f32) -> bool {
    let Some(dashes) = dashes else {
        return true;
    };
    let period: f32 = dashes.iter().sum();
    if period <= 0.0 {
        return true;
    }

    let mut remaining = distance.rem_euclid(period);
    for (i, len) in dashes.iter().enumerate() {
        if remaining < *len {
            return i % 2 == 0;
        }
        remaining -= len;
    }
    // Float rounding at the very end of a period belongs to the next dash
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::LinePattern;

    fn blank(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::new(Size::new(w, h).unwrap(), Color32::WHITE)
    }

    fn painted(buffer: &PixelBuffer, color: Color32) -> usize {
        buffer
            .as_rgba()
            .pixels()
            .filter(|px| **px == to_rgba(color))
            .count()
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(Size::new(0, 10).is_err());
        assert!(Size::new(10, 0).is_err());
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let size = Size::new(600, 400).unwrap();
        let fitted = size.fit_within(Size::new(300, 300).unwrap());
        assert_eq!(fitted, Size::new(300, 200).unwrap());

        let fitted = size.fit_within(Size::new(1200, 400).unwrap());
        assert_eq!(fitted, Size::new(600, 400).unwrap());
    }

    #[test]
    fn test_fit_within_never_collapses() {
        let size = Size::new(1000, 1).unwrap();
        let fitted = size.fit_within(Size::new(10, 10).unwrap());
        assert_eq!(fitted, Size::new(10, 1).unwrap());
    }

    #[test]
    fn test_single_pixel_point() {
        let mut buffer = blank(5, 5);
        buffer.plot_point(Pos2::new(2.0, 2.0), &PenStyle::new(1, Color32::BLACK));
        assert_eq!(painted(&buffer, Color32::BLACK), 1);
        assert_eq!(buffer.pixel(2, 2), Some(Color32::BLACK));
    }

    #[test]
    fn test_degenerate_line_is_a_point() {
        let pen = PenStyle::new(3, Color32::BLACK);
        let p = Pos2::new(4.0, 4.0);

        let mut line = blank(9, 9);
        line.stroke_line(p, p, &pen);
        let mut point = blank(9, 9);
        point.plot_point(p, &pen);

        assert_eq!(line, point);
    }

    #[test]
    fn test_horizontal_line_cap_lengths() {
        let from = Pos2::new(5.0, 5.0);
        let to = Pos2::new(15.0, 5.0);

        let mut flat = blank(21, 11);
        flat.stroke_line(from, to, &PenStyle::new(1, Color32::BLACK).with_cap(CapStyle::Flat));
        assert_eq!(painted(&flat, Color32::BLACK), 11);

        let mut square = blank(21, 11);
        square.stroke_line(from, to, &PenStyle::new(1, Color32::BLACK).with_cap(CapStyle::Square));
        assert_eq!(painted(&square, Color32::BLACK), 11);

        let mut wide = blank(21, 11);
        wide.stroke_line(from, to, &PenStyle::new(4, Color32::BLACK).with_cap(CapStyle::Square));
        assert_eq!(wide.pixel(3, 5), Some(Color32::BLACK));
        assert_eq!(wide.pixel(2, 5), Some(Color32::WHITE));
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let pen = PenStyle::new(1, Color32::BLACK)
            .with_cap(CapStyle::Flat)
            .with_pattern(LinePattern::Dash);
        let mut buffer = blank(30, 3);
        buffer.stroke_line(Pos2::new(0.0, 1.0), Pos2::new(29.0, 1.0), &pen);

        // Dash is 4 on, 2 off
        assert_eq!(buffer.pixel(0, 1), Some(Color32::BLACK));
        assert_eq!(buffer.pixel(3, 1), Some(Color32::BLACK));
        assert_eq!(buffer.pixel(4, 1), Some(Color32::WHITE));
        assert_eq!(buffer.pixel(5, 1), Some(Color32::WHITE));
        assert_eq!(buffer.pixel(6, 1), Some(Color32::BLACK));
    }

    #[test]
    fn test_strokes_are_clipped() {
        let mut buffer = blank(10, 10);
        let pen = PenStyle::new(6, Color32::BLACK);
        buffer.stroke_line(Pos2::new(-20.0, -20.0), Pos2::new(30.0, 30.0), &pen);
        buffer.plot_point(Pos2::new(100.0, 100.0), &pen);
        assert_eq!(buffer.pixel(0, 0), Some(Color32::BLACK));
        assert_eq!(buffer.pixel(9, 9), Some(Color32::BLACK));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = blank(4, 4);
        let mut copy = original.clone();
        copy.fill(Color32::BLACK);
        assert_eq!(original.pixel(0, 0), Some(Color32::WHITE));
        assert_eq!(copy.pixel(0, 0), Some(Color32::BLACK));
    }

    #[test]
    fn test_scaled_copy_leaves_original() {
        let original = blank(60, 40);
        let scaled = original.scaled_to(Size::new(30, 30).unwrap());
        assert_eq!(scaled.size(), Size::new(30, 20).unwrap());
        assert_eq!(original.size(), Size::new(60, 40).unwrap());
    }

    #[test]
    fn test_color_image_matches_size() {
        let image = blank(7, 3).to_color_image();
        assert_eq!(image.size, [7, 3]);
        assert_eq!(image.pixels[0], Color32::WHITE);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = blank(2, 2).save("picture.notaformat").unwrap_err();
        assert!(matches!(err, CanvasError::InvalidParameter { .. }));
    }
}
