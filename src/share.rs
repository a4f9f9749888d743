/// Share export: the arranged floor plan as a PNG
///
/// Rendering happens at the image's native resolution, so furniture lands
/// exactly where it is stored (image-pixel centres, inch sizes through the
/// calibrated scale) regardless of how the canvas was zoomed.

use cgmath::{Basis2, Deg, Rotation, Rotation2, Vector2};
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;

use crate::color::Rgb;
use crate::error::Result;
use crate::state::data::FurnitureItem;
use crate::units::inches_to_pixels;

/// Outline width around each item, image pixels
const OUTLINE_PX: f32 = 1.5;

/// Scale bar lengths to choose from, in feet
const SCALE_BAR_FEET: [f32; 7] = [1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0];

/// Distance of the scale bar from the bottom-left corner
const SCALE_BAR_MARGIN: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct ShareOptions {
    pub title: String,
    pub include_scale: bool,
    pub include_furniture: bool,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            title: "My Floor Plan".to_string(),
            include_scale: true,
            include_furniture: true,
        }
    }
}

/// Suggested file name for the title, e.g. "My Floor Plan" -> "my-floor-plan.png"
pub fn default_filename(title: &str) -> String {
    let slug: String = title
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "floor-plan.png".to_string()
    } else {
        format!("{}.png", slug)
    }
}

/// Composite furniture and the scale bar over the floor plan
pub fn render_layout(
    base: &RgbaImage,
    furniture: &[FurnitureItem],
    pixels_per_inch: f32,
    options: &ShareOptions,
) -> RgbaImage {
    let mut canvas = base.clone();

    if options.include_furniture {
        for item in furniture {
            draw_item(&mut canvas, item, pixels_per_inch);
        }
    }

    if options.include_scale {
        draw_scale_bar(&mut canvas, pixels_per_inch);
    }

    canvas
}

/// Decode, render and write the PNG on the blocking pool
pub async fn export_png(
    bytes: Arc<Vec<u8>>,
    furniture: Vec<FurnitureItem>,
    pixels_per_inch: f32,
    options: ShareOptions,
    path: PathBuf,
) -> std::result::Result<PathBuf, String> {
    task::spawn_blocking(move || {
        write_png(&bytes, &furniture, pixels_per_inch, &options, &path)
            .map(|_| path)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

fn write_png(
    bytes: &[u8],
    furniture: &[FurnitureItem],
    pixels_per_inch: f32,
    options: &ShareOptions,
    path: &std::path::Path,
) -> Result<()> {
    let base = image::load_from_memory(bytes)?.to_rgba8();
    let rendered = render_layout(&base, furniture, pixels_per_inch, options);
    rendered.save_with_format(path, image::ImageFormat::Png)?;
    tracing::info!(path = %path.display(), title = %options.title, "📤 Shared layout as PNG");
    Ok(())
}

/// Fill and outline one rotated rectangle
fn draw_item(canvas: &mut RgbaImage, item: &FurnitureItem, pixels_per_inch: f32) {
    let half_w = inches_to_pixels(item.width, pixels_per_inch) / 2.0;
    let half_h = inches_to_pixels(item.height, pixels_per_inch) / 2.0;
    if !(half_w > 0.0 && half_h > 0.0) {
        return;
    }

    let fill = Rgb::from_hex(&item.color)
        .unwrap_or(Rgb { r: 0x64, g: 0x96, b: 0xFF })
        .to_rgba(item.opacity);
    let outline = Rgba([0, 0, 0, 255]);

    // Pixel -> item-local coordinates
    let to_local: Basis2<f32> = Rotation2::from_angle(Deg(-item.rotation));

    let reach = (half_w * half_w + half_h * half_h).sqrt();
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);
    let x0 = (item.x - reach).floor().max(0.0) as u32;
    let y0 = (item.y - reach).floor().max(0.0) as u32;
    let x1 = (item.x + reach).ceil().min(width) as u32;
    let y1 = (item.y + reach).ceil().min(height) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let offset = Vector2::new(px as f32 + 0.5 - item.x, py as f32 + 0.5 - item.y);
            let local = to_local.rotate_vector(offset);
            let (dx, dy) = (half_w - local.x.abs(), half_h - local.y.abs());
            if dx < 0.0 || dy < 0.0 {
                continue;
            }
            let color = if dx < OUTLINE_PX || dy < OUTLINE_PX { outline } else { fill };
            blend(canvas.get_pixel_mut(px, py), color);
        }
    }
}

/// A labelled-by-length bar: black bar on a white plate, ticks at both ends
fn draw_scale_bar(canvas: &mut RgbaImage, pixels_per_inch: f32) {
    let (width, height) = canvas.dimensions();
    let target = width as f32 * 0.1;

    let feet = SCALE_BAR_FEET
        .iter()
        .copied()
        .find(|feet| inches_to_pixels(feet * 12.0, pixels_per_inch) >= target)
        .unwrap_or(SCALE_BAR_FEET[SCALE_BAR_FEET.len() - 1]);
    let length = inches_to_pixels(feet * 12.0, pixels_per_inch).round() as u32;
    let thickness = (height / 150).max(4);

    let left = SCALE_BAR_MARGIN;
    let bottom = height.saturating_sub(SCALE_BAR_MARGIN);
    let plate_pad = thickness;
    let right = (left + length).min(width.saturating_sub(1));
    let top = bottom.saturating_sub(thickness * 3);

    let white = Rgba([255, 255, 255, 230]);
    let black = Rgba([0, 0, 0, 255]);

    fill_rect(
        canvas,
        left.saturating_sub(plate_pad),
        top.saturating_sub(plate_pad),
        (right + plate_pad).min(width),
        (bottom + plate_pad).min(height),
        white,
    );
    // Bar along the bottom, ticks rising at both ends
    fill_rect(canvas, left, bottom.saturating_sub(thickness), right, bottom, black);
    fill_rect(canvas, left, top, left + thickness, bottom, black);
    fill_rect(canvas, right.saturating_sub(thickness), top, right, bottom, black);

    tracing::debug!(feet, length, "Scale bar drawn");
}

fn fill_rect(canvas: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let x1 = x1.min(canvas.width());
    let y1 = y1.min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            blend(canvas.get_pixel_mut(x, y), color);
        }
    }
}

/// Source-over blend onto an opaque destination
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let a = src[3] as f32 / 255.0;
    for i in 0..3 {
        dst[i] = (src[i] as f32 * a + dst[i] as f32 * (1.0 - a)).round() as u8;
    }
    dst[3] = dst[3].max(src[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]))
    }

    fn item(width: f32, height: f32, rotation: f32) -> FurnitureItem {
        FurnitureItem {
            id: "desk-1-1".into(),
            name: "Desk".into(),
            width,
            height,
            x: 100.0,
            y: 100.0,
            rotation,
            color: "#FF0000".into(),
            opacity: 1.0,
        }
    }

    fn furniture_only() -> ShareOptions {
        ShareOptions { include_scale: false, ..Default::default() }
    }

    #[test]
    fn test_item_is_filled() {
        // 20" x 10" at 2 px/in = 40 x 20 px around (100, 100)
        let out = render_layout(&white(200), &[item(20.0, 10.0, 0.0)], 2.0, &furniture_only());
        assert_eq!(*out.get_pixel(100, 100), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(115, 100), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(100, 115), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_rotation_swaps_extent() {
        let out = render_layout(&white(200), &[item(20.0, 10.0, 90.0)], 2.0, &furniture_only());
        assert_eq!(*out.get_pixel(100, 115), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(115, 100), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_opacity_blends() {
        let mut translucent = item(20.0, 10.0, 0.0);
        translucent.opacity = 0.5;
        let out = render_layout(&white(200), &[translucent], 2.0, &furniture_only());
        let p = out.get_pixel(100, 100);
        assert_eq!(p[0], 255);
        assert!((126..=129).contains(&p[1]), "green was {}", p[1]);
    }

    #[test]
    fn test_furniture_can_be_left_out() {
        let options = ShareOptions { include_scale: false, include_furniture: false, ..Default::default() };
        let out = render_layout(&white(200), &[item(20.0, 10.0, 0.0)], 2.0, &options);
        assert_eq!(*out.get_pixel(100, 100), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_scale_bar_drawn_bottom_left() {
        let options = ShareOptions { include_furniture: false, ..Default::default() };
        let out = render_layout(&white(200), &[], 2.0, &options);
        // Bar runs along y in [180, 184) from x = 16
        assert_eq!(*out.get_pixel(20, 182), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(100, 20), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(default_filename("My Floor Plan"), "my-floor-plan.png");
        assert_eq!(default_filename("  Unit 4B / v2 "), "unit-4b-v2.png");
        assert_eq!(default_filename("???"), "floor-plan.png");
    }
}
