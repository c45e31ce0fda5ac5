//! Rendering of finished symbols.
//!
//! Rasterizes a [`QrCode`] onto an RGB canvas, optionally with a centered logo, and
//! writes PNG, SVG or console output. Nothing here feeds back into encoding.

use crate::error::{QrError, RenderError};
use crate::qrcode::QrCode;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba};
use log::{debug, info};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Logo side length as a fraction of the shorter canvas side.
const LOGO_FRACTION: u32 = 6;
const LOGO_PADDING: i64 = 2;
/// Corner arc diameter of the logo backing, in pixels.
const LOGO_CORNER_ARC: i64 = 10;
const LOGO_STROKE: i64 = 2;

/// Canvas settings for raster output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Quiet zone around the symbol, in modules.
    pub border: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            border: 0,
        }
    }
}

impl RenderOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            border: 0,
        }
    }

    pub fn with_border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }

    /// Pixel size of one module for a symbol of `modules` modules.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::CanvasTooSmall`] if a module would be smaller than one pixel.
    pub fn module_size(&self, modules: u32) -> Result<u32, RenderError> {
        let span = modules.saturating_add(self.border.saturating_mul(2));
        let size = self.width.min(self.height) / span.max(1);
        if size == 0 {
            return Err(RenderError::CanvasTooSmall {
                width: self.width,
                height: self.height,
                modules: span,
            });
        }
        Ok(size)
    }
}

/// Rasterizes `qr` onto a white canvas of the configured size.
///
/// Modules are drawn from the top-left corner, offset by the border. Any pixels left over
/// after integer division stay white on the right and bottom edges.
///
/// # Example
///
/// ```rust
/// use qrsymbol::helper::{render, RenderOptions};
/// use qrsymbol::qrcode::QrCode;
///
/// let qr = QrCode::encode_text("HI").unwrap();
/// let img = render(&qr, &RenderOptions::default()).unwrap();
/// assert_eq!(img.dimensions(), (300, 300));
/// ```
pub fn render(qr: &QrCode, options: &RenderOptions) -> Result<RgbImage, RenderError> {
    let modules = qr.size() as u32;
    let module_size = options.module_size(modules)?;
    let offset = options.border * module_size;
    let mut img = RgbImage::from_pixel(options.width, options.height, WHITE);

    for (row, line) in qr.modules().iter().enumerate() {
        for (col, &isdark) in line.iter().enumerate() {
            if !isdark {
                continue;
            }
            let x0 = offset + col as u32 * module_size;
            let y0 = offset + row as u32 * module_size;
            for y in y0..y0 + module_size {
                for x in x0..x0 + module_size {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
    }
    debug!(
        "rendered {}x{} canvas at {} px per module",
        options.width, options.height, module_size
    );
    Ok(img)
}

/// Rasterizes `qr` and overlays `logo` in the center.
///
/// The logo is scaled to a sixth of the shorter canvas side and placed on a white
/// rounded backing with a 2 px black rounded border. Transparent logo pixels show the
/// backing.
pub fn render_with_logo(
    qr: &QrCode,
    options: &RenderOptions,
    logo: &DynamicImage,
) -> Result<RgbImage, RenderError> {
    let mut img = render(qr, options)?;
    let logo_size = options.width.min(options.height) / LOGO_FRACTION;
    if logo_size == 0 {
        return Ok(img);
    }
    let logo_x = (options.width - logo_size) / 2;
    let logo_y = (options.height - logo_size) / 2;

    let backing = RoundRect {
        left: i64::from(logo_x) - LOGO_PADDING,
        top: i64::from(logo_y) - LOGO_PADDING,
        width: i64::from(logo_size) + 2 * LOGO_PADDING,
        height: i64::from(logo_size) + 2 * LOGO_PADDING,
        radius: LOGO_CORNER_ARC / 2,
    };
    fill_round_rect(&mut img, &backing, WHITE);

    let scaled = logo
        .resize_exact(logo_size, logo_size, FilterType::Lanczos3)
        .to_rgba8();
    for (dx, dy, px) in scaled.enumerate_pixels() {
        let target = img.get_pixel_mut(logo_x + dx, logo_y + dy);
        *target = blend(*target, *px);
    }

    let half = LOGO_STROKE / 2;
    let outer = backing.inset(-half);
    let inner = backing.inset(LOGO_STROKE - half);
    for_each_pixel(&mut img, &outer, |x, y, px| {
        if !inner.contains(x, y) {
            *px = BLACK;
        }
    });
    debug!("overlaid {}x{} logo at ({}, {})", logo_size, logo_size, logo_x, logo_y);
    Ok(img)
}

#[derive(Clone, Copy, Debug)]
struct RoundRect {
    left: i64,
    top: i64,
    width: i64,
    height: i64,
    radius: i64,
}

impl RoundRect {
    fn inset(&self, d: i64) -> Self {
        Self {
            left: self.left + d,
            top: self.top + d,
            width: self.width - 2 * d,
            height: self.height - 2 * d,
            radius: (self.radius - d).max(0),
        }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        if x < self.left || y < self.top || x >= right || y >= bottom {
            return false;
        }
        let r = self.radius.min(self.width / 2).min(self.height / 2);
        let cx = if x < self.left + r {
            self.left + r
        } else if x >= right - r {
            right - r - 1
        } else {
            return true;
        };
        let cy = if y < self.top + r {
            self.top + r
        } else if y >= bottom - r {
            bottom - r - 1
        } else {
            return true;
        };
        let (dx, dy) = (x - cx, y - cy);
        dx * dx + dy * dy <= r * r
    }
}

fn for_each_pixel(img: &mut RgbImage, rect: &RoundRect, mut f: impl FnMut(i64, i64, &mut Rgb<u8>)) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    for y in rect.top.max(0)..(rect.top + rect.height).min(h) {
        for x in rect.left.max(0)..(rect.left + rect.width).min(w) {
            if rect.contains(x, y) {
                f(x, y, img.get_pixel_mut(x as u32, y as u32));
            }
        }
    }
}

fn fill_round_rect(img: &mut RgbImage, rect: &RoundRect, color: Rgb<u8>) {
    for_each_pixel(img, rect, |_, _, px| *px = color);
}

fn blend(under: Rgb<u8>, over: Rgba<u8>) -> Rgb<u8> {
    let a = u32::from(over[3]);
    let mix = |o: u8, u: u8| ((u32::from(o) * a + u32::from(u) * (255 - a) + 127) / 255) as u8;
    Rgb([
        mix(over[0], under[0]),
        mix(over[1], under[1]),
        mix(over[2], under[2]),
    ])
}

/// Encodes an image as PNG bytes in memory.
pub fn to_png_bytes(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Saves an image as PNG and returns the written path.
///
/// # Arguments
///
/// * `img` - The image to save.
/// * `directory_path` - Optional. Target directory, created if missing. Defaults to "generated".
/// * `filename` - Optional. File name, with or without the `.png` suffix. Defaults to a
///   millisecond timestamp.
pub fn save_png(
    img: &RgbImage,
    directory_path: Option<&Path>,
    filename: Option<&str>,
) -> Result<PathBuf, RenderError> {
    let directory_path = directory_path.unwrap_or(Path::new("generated"));
    let mut filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            since_the_epoch.as_millis().to_string()
        }
    };
    if !filename.ends_with(".png") {
        filename.push_str(".png");
    }

    if !directory_path.exists() {
        fs::create_dir_all(directory_path)?;
    }
    let file_path = directory_path.join(filename);
    img.save_with_format(&file_path, ImageFormat::Png)?;
    info!("saved symbol to {}", file_path.display());
    Ok(file_path)
}

/// Loads a logo image from disk.
pub fn load_logo(path: impl AsRef<Path>) -> Result<DynamicImage, RenderError> {
    Ok(image::open(path)?)
}

// Returns a string of SVG code for an image depicting
// the given symbol, with the given number of border modules.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(qr: &QrCode, border: u32) -> String {
    let border = i64::from(border);
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    let dimension = i64::from(qr.size()) + border * 2;
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += "\t<path d=\"";
    let mut first = true;
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(y, x) {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!("M{},{}h1v1h-1z", i64::from(x) + border, i64::from(y) + border);
            }
        }
    }
    result += "\" fill=\"#000000\"/>\n";
    result += "</svg>\n";
    result
}

/// Draws the symbol with block characters, two per module.
pub fn to_console_string(qr: &QrCode, border: u32) -> String {
    let border = i64::from(border);
    let size = i64::from(qr.size());
    let mut result = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            let c: char = if module_at(qr, y, x) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

fn module_at(qr: &QrCode, row: i64, col: i64) -> bool {
    match (i32::try_from(row), i32::try_from(col)) {
        (Ok(row), Ok(col)) => qr.get_module(row, col),
        _ => false,
    }
}

/// Prints the given symbol to the console with a 4-module border.
pub fn print_qr(qr: &QrCode) {
    println!("{}", to_console_string(qr, 4));
}

/// Encodes `content` and rasterizes it.
///
/// # Example
///
/// ```rust
/// use qrsymbol::helper::{generate_image_buffer, RenderOptions};
///
/// let img = generate_image_buffer("Hello", &RenderOptions::new(210, 210)).unwrap();
/// assert_eq!(img.dimensions(), (210, 210));
/// ```
pub fn generate_image_buffer(content: &str, options: &RenderOptions) -> Result<RgbImage, RenderError> {
    let qr = QrCode::encode_text(content)?;
    render(&qr, options)
}

/// Encodes `content` and returns its SVG with a 4-module border.
pub fn generate_svg_string(content: &str) -> Result<String, QrError> {
    let qr = QrCode::encode_text(content)?;
    Ok(to_svg_string(&qr, 4))
}

/// Encodes `content`, rasterizes it and saves it as PNG.
pub fn generate_image(
    content: &str,
    options: &RenderOptions,
    directory: Option<&Path>,
    filename: Option<&str>,
) -> Result<PathBuf, RenderError> {
    let img = generate_image_buffer(content, options)?;
    save_png(&img, directory, filename)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_to_svg_string() {
        let qr = QrCode::encode_text("HELLO").unwrap();
        let svg = to_svg_string(&qr, 4);

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        assert!(svg.contains("d=\"M4,4h1v1h-1z"));
    }

    #[test]
    fn test_svg_large_border_does_not_wrap() {
        let qr = QrCode::encode_text("HI").unwrap();
        let svg = to_svg_string(&qr, u32::MAX);
        assert!(svg.contains("viewBox=\"0 0 8589934611 8589934611\""));
        assert!(svg.contains("d=\"M4294967295,4294967295h1v1h-1z"));
    }

    #[test]
    fn test_console_large_border_stays_outside_symbol() {
        let qr = QrCode::encode_text("HI").unwrap();
        assert!(!module_at(&qr, i64::from(u32::MAX), 0));
        assert!(!module_at(&qr, -i64::from(u32::MAX), 0));
        assert!(module_at(&qr, 0, 0));
    }

    #[test]
    fn test_console_string() {
        let qr = QrCode::encode_text("HI").unwrap();
        let text = to_console_string(&qr, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 23);
        assert!(lines[0].trim().is_empty());
        assert!(lines[1].starts_with("  ██████████████"));
    }

    #[test]
    fn test_module_size() {
        assert_eq!(RenderOptions::default().module_size(21).unwrap(), 14);
        assert_eq!(RenderOptions::new(300, 200).module_size(21).unwrap(), 9);
        assert_eq!(RenderOptions::new(290, 290).with_border(2).module_size(21).unwrap(), 11);
        assert!(matches!(
            RenderOptions::new(20, 300).module_size(21),
            Err(RenderError::CanvasTooSmall { width: 20, height: 300, modules: 21 })
        ));
    }

    #[test]
    fn test_render_pixels() {
        let qr = QrCode::encode_text("HI").unwrap();
        let img = render(&qr, &RenderOptions::default()).unwrap();
        assert_eq!(img.dimensions(), (300, 300));
        // finder corner, finder gap, leftover margin
        assert_eq!(*img.get_pixel(0, 0), BLACK);
        assert_eq!(*img.get_pixel(13, 13), BLACK);
        assert_eq!(*img.get_pixel(20, 20), WHITE);
        assert_eq!(*img.get_pixel(299, 299), WHITE);
    }

    #[test]
    fn test_render_border_offsets_symbol() {
        let qr = QrCode::encode_text("HI").unwrap();
        let img = render(&qr, &RenderOptions::new(290, 290).with_border(2)).unwrap();
        assert_eq!(*img.get_pixel(21, 21), WHITE);
        assert_eq!(*img.get_pixel(22, 22), BLACK);
    }

    #[test]
    fn test_render_with_logo() {
        let qr = QrCode::encode_text("HI").unwrap();
        let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let img = render_with_logo(&qr, &RenderOptions::default(), &logo).unwrap();

        assert_eq!(*img.get_pixel(150, 150), Rgb([255, 0, 0]));
        // stroke band, then white backing, then logo
        assert_eq!(*img.get_pixel(150, 122), BLACK);
        assert_eq!(*img.get_pixel(150, 123), BLACK);
        assert_eq!(*img.get_pixel(150, 124), WHITE);
        assert_eq!(*img.get_pixel(150, 125), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_transparent_logo_shows_backing() {
        let qr = QrCode::encode_text("HI").unwrap();
        let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let img = render_with_logo(&qr, &RenderOptions::default(), &logo).unwrap();
        assert_eq!(*img.get_pixel(150, 150), WHITE);
    }

    #[test]
    fn test_png_bytes() {
        let img = generate_image_buffer("HI", &RenderOptions::new(42, 42)).unwrap();
        let bytes = to_png_bytes(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let path = generate_image("HI", &RenderOptions::default(), Some(target.as_path()), Some("hi")).unwrap();
        assert_eq!(path, target.join("hi.png"));
        let loaded = load_logo(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (300, 300));
    }

    #[test]
    fn test_generate_propagates_capacity_error() {
        let err = generate_image_buffer(&"x".repeat(18), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Encode(QrError::CapacityExceeded { .. })));
        assert!(generate_svg_string(&"x".repeat(18)).is_err());
    }
}
