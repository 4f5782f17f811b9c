//! Layer model: the authoritative state of each placed cutout
//!
//! A [`CompositionState`] owns an ordered sequence of entries, each pairing a
//! [`CutoutImage`] with its [`Layer`] transform. The pairing is structural (an
//! entry owns both halves), so no operation can strand a layer without its
//! cutout or vice versa. Sequence order is paint order: later entries draw on
//! top.

use crate::error::{MockproofError, Result};
use crate::mockup::MediaType;
use crate::types::CutoutImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lower clamp for layer scale
pub const SCALE_MIN: f32 = 0.5;

/// Upper clamp for layer scale
pub const SCALE_MAX: f32 = 2.0;

/// Multiplier applied per discrete "increase" step
pub const SCALE_STEP_UP: f32 = 1.1;

/// Multiplier applied per discrete "decrease" step
pub const SCALE_STEP_DOWN: f32 = 0.9;

/// Reference layer width in pixels before scaling
pub const DEFAULT_BASE_WIDTH: u32 = 100;

/// Direction of a discrete scale adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleStep {
    /// Multiply the current scale by [`SCALE_STEP_UP`]
    Increase,
    /// Multiply the current scale by [`SCALE_STEP_DOWN`]
    Decrease,
}

/// Layer offset as a fraction of the print-safe area, measured from its
/// top-left corner. Fractions keep stored positions resolution-independent:
/// preview and export each multiply by their own print-rect pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset, fraction of print-area width
    pub x: f32,
    /// Vertical offset, fraction of print-area height
    pub y: f32,
}

impl Position {
    /// Origin of the print area
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Construct a fractional offset
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The positioned, scaled placement of one cutout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    id: String,
    position: Position,
    scale: f32,
    base_width: u32,
}

impl Layer {
    fn new(id: String) -> Self {
        Self {
            id,
            position: Position::ORIGIN,
            scale: 1.0,
            base_width: DEFAULT_BASE_WIDTH,
        }
    }

    /// Layer id, identical to the owning cutout's id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Committed print-area-relative offset
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current scale factor, always within `[SCALE_MIN, SCALE_MAX]`
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Reference width in pixels before scaling
    #[must_use]
    pub fn base_width(&self) -> u32 {
        self.base_width
    }

    /// Rendered width in pixels of the target space
    #[must_use]
    pub fn scaled_width(&self) -> f32 {
        self.base_width as f32 * self.scale
    }
}

/// One cutout together with its placement
#[derive(Debug, Clone)]
pub struct CompositionEntry {
    /// The background-removed source image
    pub cutout: CutoutImage,
    /// Its transform within the print area
    pub layer: Layer,
}

/// The aggregate composition: selected product plus the z-ordered layer stack
#[derive(Debug, Clone)]
pub struct CompositionState {
    media_type: MediaType,
    entries: Vec<CompositionEntry>,
}

impl CompositionState {
    /// Start an empty composition on the given product
    #[must_use]
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            entries: Vec::new(),
        }
    }

    /// Currently selected product
    #[must_use]
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Switch the product the composition renders onto; layers are kept
    pub fn select_media_type(&mut self, media_type: MediaType) {
        self.media_type = media_type;
    }

    /// Accept a cutout into the composition, appending a layer at the top of
    /// the z-order with position (0, 0) and scale 1.0. Returns the layer id.
    pub fn add_layer(&mut self, cutout: CutoutImage) -> String {
        let id = cutout.id().to_owned();
        debug!(layer_id = %id, filename = %cutout.original_filename(), "layer added");
        self.entries.push(CompositionEntry {
            layer: Layer::new(id.clone()),
            cutout,
        });
        id
    }

    /// Apply one discrete scale step, clamped to `[SCALE_MIN, SCALE_MAX]`.
    /// Steps at a clamp boundary are no-ops, so repeated increases converge to
    /// exactly [`SCALE_MAX`]. Returns the resulting scale.
    ///
    /// # Errors
    /// - [`MockproofError::UnknownLayer`] for an id not in the composition
    pub fn step_scale(&mut self, layer_id: &str, step: ScaleStep) -> Result<f32> {
        let layer = self.layer_mut(layer_id)?;
        let factor = match step {
            ScaleStep::Increase => SCALE_STEP_UP,
            ScaleStep::Decrease => SCALE_STEP_DOWN,
        };
        layer.scale = (layer.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
        Ok(layer.scale)
    }

    /// Overwrite a layer's committed position (the result of a completed drag)
    ///
    /// # Errors
    /// - [`MockproofError::UnknownLayer`] for an id not in the composition
    pub fn set_position(&mut self, layer_id: &str, position: Position) -> Result<()> {
        let layer = self.layer_mut(layer_id)?;
        layer.position = position;
        Ok(())
    }

    /// Drop all cutouts and layers (returning to the upload step)
    pub fn clear(&mut self) {
        debug!(layers = self.entries.len(), "composition cleared");
        self.entries.clear();
    }

    /// Entries in paint (z) order, bottom first
    #[must_use]
    pub fn entries(&self) -> &[CompositionEntry] {
        &self.entries
    }

    /// Look up one entry by layer id
    #[must_use]
    pub fn entry(&self, layer_id: &str) -> Option<&CompositionEntry> {
        self.entries.iter().find(|e| e.layer.id == layer_id)
    }

    /// Number of placed layers
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the composition holds no layers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn layer_mut(&mut self, layer_id: &str) -> Result<&mut Layer> {
        self.entries
            .iter_mut()
            .map(|e| &mut e.layer)
            .find(|l| l.id == layer_id)
            .ok_or_else(|| MockproofError::unknown_layer(layer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn test_cutout(id: &str) -> CutoutImage {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        CutoutImage::from_bytes(id, "photo.png", buf).unwrap()
    }

    #[test]
    fn test_add_layer_defaults() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        let id = state.add_layer(test_cutout("task-1"));
        assert_eq!(id, "task-1");

        let entry = state.entry("task-1").unwrap();
        assert_eq!(entry.layer.position(), Position::ORIGIN);
        assert!((entry.layer.scale() - 1.0).abs() < f32::EPSILON);
        assert_eq!(entry.layer.base_width(), DEFAULT_BASE_WIDTH);
        assert_eq!(entry.cutout.id(), entry.layer.id());
    }

    #[test]
    fn test_z_order_is_insertion_order() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(test_cutout("a"));
        state.add_layer(test_cutout("b"));
        let ids: Vec<&str> = state.entries().iter().map(|e| e.layer.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_scale_stays_in_bounds() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(test_cutout("a"));

        let mut scale = 1.0;
        for _ in 0..50 {
            scale = state.step_scale("a", ScaleStep::Increase).unwrap();
            assert!((SCALE_MIN..=SCALE_MAX).contains(&scale));
        }
        assert!((scale - SCALE_MAX).abs() < f32::EPSILON);

        for _ in 0..100 {
            scale = state.step_scale("a", ScaleStep::Decrease).unwrap();
            assert!((SCALE_MIN..=SCALE_MAX).contains(&scale));
        }
        assert!((scale - SCALE_MIN).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scale_increase_is_monotonic_then_fixed() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(test_cutout("a"));

        let mut previous = 1.0_f32;
        for _ in 0..40 {
            let next = state.step_scale("a", ScaleStep::Increase).unwrap();
            assert!(next >= previous);
            previous = next;
        }
        // Converged to exactly the ceiling; further steps are no-ops.
        assert_eq!(previous, SCALE_MAX);
        assert_eq!(state.step_scale("a", ScaleStep::Increase).unwrap(), SCALE_MAX);
    }

    #[test]
    fn test_set_position_overwrites() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(test_cutout("a"));
        state.set_position("a", Position::new(0.4, 0.7)).unwrap();
        let entry = state.entry("a").unwrap();
        assert_eq!(entry.layer.position(), Position::new(0.4, 0.7));
    }

    #[test]
    fn test_unknown_layer_errors() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        assert!(matches!(
            state.step_scale("ghost", ScaleStep::Increase),
            Err(MockproofError::UnknownLayer(_))
        ));
        assert!(matches!(
            state.set_position("ghost", Position::ORIGIN),
            Err(MockproofError::UnknownLayer(_))
        ));
    }

    #[test]
    fn test_clear_resets_both_collections() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(test_cutout("a"));
        state.add_layer(test_cutout("b"));
        assert_eq!(state.len(), 2);

        state.clear();
        assert!(state.is_empty());
        assert!(state.entry("a").is_none());

        // Clearing again is a no-op.
        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_media_type_switch_keeps_layers() {
        let mut state = CompositionState::new(MediaType::Tshirt);
        state.add_layer(test_cutout("a"));
        state.select_media_type(MediaType::Poster);
        assert_eq!(state.media_type(), MediaType::Poster);
        assert_eq!(state.len(), 1);
    }
}
