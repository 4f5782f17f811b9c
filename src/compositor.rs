//! Deterministic compositing: shared layout math, flatten, and PNG export
//!
//! Preview and export run the same pure [`layout`] function against different
//! print rectangles (display-space for the live overlay, native-space for the
//! flattened raster), so identical composition state always produces identical
//! geometry in either space.

use crate::composition::CompositionState;
use crate::error::Result;
use crate::mockup::{MockupTemplate, PixelRect};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Resolved pixel rectangle for one layer in a target render space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPlacement {
    /// Id of the placed layer
    pub layer_id: String,
    /// Left edge in target-space pixels
    pub x: i64,
    /// Top edge in target-space pixels
    pub y: i64,
    /// Rendered width in target-space pixels
    pub width: u32,
    /// Rendered height in target-space pixels, aspect-correct
    pub height: u32,
}

/// Compute every layer's pixel rectangle within the given print rect.
///
/// Pure and re-entrant: a repeatable function of the composition state and the
/// target rectangle. Width is `base_width * scale` in target-space pixels,
/// height follows the cutout's own aspect ratio, and the stored fractional
/// position is projected onto the print rect's extent.
#[must_use]
pub fn layout(state: &CompositionState, print_rect: PixelRect) -> Vec<LayerPlacement> {
    state
        .entries()
        .iter()
        .map(|entry| {
            let width = entry.layer.scaled_width();
            let height = width * entry.cutout.aspect_ratio();
            let position = entry.layer.position();
            LayerPlacement {
                layer_id: entry.layer.id().to_owned(),
                x: print_rect.x + (position.x * print_rect.width as f32).round() as i64,
                y: print_rect.y + (position.y * print_rect.height as f32).round() as i64,
                width: width.round().max(1.0) as u32,
                height: height.round().max(1.0) as u32,
            }
        })
        .collect()
}

/// Layout for the live preview, given the background's displayed box size
#[must_use]
pub fn preview_layout(
    state: &CompositionState,
    template: &MockupTemplate,
    display_width: u32,
    display_height: u32,
) -> Vec<LayerPlacement> {
    let print_rect = template
        .print_area()
        .to_pixel_rect(display_width, display_height);
    layout(state, print_rect)
}

/// Flatten the composition into one raster at the background's native
/// resolution. Layers draw in z-order inside the native print rect; an empty
/// composition yields the bare background.
///
/// # Errors
/// - Currently none beyond allocation; fallible to match [`encode_png`]
pub fn flatten(state: &CompositionState, template: &MockupTemplate) -> Result<RgbaImage> {
    let mut canvas = template.background().to_rgba8();
    let print_rect = template.native_print_rect();

    let placements = layout(state, print_rect);
    debug!(
        layers = placements.len(),
        width = canvas.width(),
        height = canvas.height(),
        "flattening composition"
    );

    for (entry, placement) in state.entries().iter().zip(&placements) {
        let resized = imageops::resize(
            entry.cutout.image(),
            placement.width,
            placement.height,
            FilterType::Lanczos3,
        );
        imageops::overlay(&mut canvas, &resized, placement.x, placement.y);
    }

    Ok(canvas)
}

/// Encode a flattened raster as in-memory PNG bytes
///
/// # Errors
/// - PNG encode failure
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    raster.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{CompositionState, Position, ScaleStep, DEFAULT_BASE_WIDTH};
    use crate::mockup::{MediaType, MockupTemplate, PrintArea};
    use crate::types::CutoutImage;
    use image::{DynamicImage, Rgba};
    use std::io::Cursor;

    fn cutout(id: &str, width: u32, height: u32) -> CutoutImage {
        let img = image::RgbaImage::from_pixel(width, height, Rgba([0, 255, 0, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        CutoutImage::from_bytes(id, "photo.png", buf).unwrap()
    }

    fn template(width: u32, height: u32) -> MockupTemplate {
        let bg = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            width,
            height,
            Rgba([120, 120, 120, 255]),
        ));
        MockupTemplate::with_print_area(
            MediaType::Tshirt,
            bg,
            PrintArea::new(0.25, 0.25, 0.5, 0.5),
        )
        .unwrap()
    }

    #[test]
    fn test_identity_transform_width_in_both_spaces() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(cutout("a", 200, 100));

        // Export space: native 800x800 background.
        let tpl = template(800, 800);
        let native = layout(&state, tpl.native_print_rect());
        assert_eq!(native[0].width, DEFAULT_BASE_WIDTH);
        assert_eq!(native[0].height, DEFAULT_BASE_WIDTH / 2);
        assert_eq!((native[0].x, native[0].y), (200, 200));

        // Preview space: same state, 400x400 displayed box.
        let preview = preview_layout(&state, &tpl, 400, 400);
        assert_eq!(preview[0].width, DEFAULT_BASE_WIDTH);
        assert_eq!((preview[0].x, preview[0].y), (100, 100));
    }

    #[test]
    fn test_layout_is_repeatable() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(cutout("a", 64, 64));
        state.set_position("a", Position::new(0.3, 0.6)).unwrap();
        state.step_scale("a", ScaleStep::Increase).unwrap();

        let tpl = template(640, 480);
        let first = layout(&state, tpl.native_print_rect());
        let second = layout(&state, tpl.native_print_rect());
        assert_eq!(first, second);
    }

    #[test]
    fn test_position_projects_onto_print_rect() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(cutout("a", 50, 50));
        state.set_position("a", Position::new(0.5, 0.5)).unwrap();

        let tpl = template(800, 400);
        // Print rect: x=200, y=100, 400x200.
        let placed = layout(&state, tpl.native_print_rect());
        assert_eq!((placed[0].x, placed[0].y), (200 + 200, 100 + 100));
    }

    #[test]
    fn test_flatten_empty_state_is_background_only() {
        let state = CompositionState::new(MediaType::Tshirt);
        let tpl = template(320, 240);
        let flat = flatten(&state, &tpl).unwrap();
        assert_eq!(flat, tpl.background().to_rgba8());
    }

    #[test]
    fn test_flatten_dimensions_match_native_background() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(cutout("a", 40, 40));

        let tpl = template(512, 384);
        let flat = flatten(&state, &tpl).unwrap();
        assert_eq!((flat.width(), flat.height()), (512, 384));
    }

    #[test]
    fn test_flatten_draws_layer_pixels() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(cutout("a", 40, 40));

        let tpl = template(400, 400);
        let flat = flatten(&state, &tpl).unwrap();
        // Print rect origin is (100, 100); the opaque green cutout covers it.
        assert_eq!(flat.get_pixel(110, 110), &Rgba([0, 255, 0, 255]));
        // Outside the print area the background is untouched.
        assert_eq!(flat.get_pixel(10, 10), &Rgba([120, 120, 120, 255]));
    }

    #[test]
    fn test_later_layers_draw_on_top() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(cutout("bottom", 40, 40));

        let red = image::RgbaImage::from_pixel(40, 40, Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(red)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        state.add_layer(CutoutImage::from_bytes("top", "red.png", buf).unwrap());

        let tpl = template(400, 400);
        let flat = flatten(&state, &tpl).unwrap();
        // Both layers sit at the print-rect origin; the later one wins.
        assert_eq!(flat.get_pixel(110, 110), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_encode_png_roundtrip() {
        let state = CompositionState::new(MediaType::Tshirt);
        let tpl = template(64, 48);
        let flat = flatten(&state, &tpl).unwrap();
        let png = encode_png(&flat).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }
}
