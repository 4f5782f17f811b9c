//! Placement controller: pointer drags into bounded position commits
//!
//! A [`DragSession`] tracks one gesture in display pixels against the
//! on-screen print area ([`PrintAreaViewport`]). Intermediate movement only
//! updates the session's live offset, clamped so the layer stays inside the
//! viewport; the composition is written exactly once, on [`DragSession::commit`].
//! Keeping live-drag rendering out of the model avoids state churn on every
//! pointer move and leaves the layer model the single source of truth.

use crate::composition::{CompositionState, Position};
use crate::error::{MockproofError, Result};

/// The print-safe area's on-screen rectangle, in display pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintAreaViewport {
    /// Left edge of the print area on screen
    pub origin_x: f32,
    /// Top edge of the print area on screen
    pub origin_y: f32,
    /// Displayed print-area width
    pub width: f32,
    /// Displayed print-area height
    pub height: f32,
}

impl PrintAreaViewport {
    /// Construct a display-space viewport
    ///
    /// # Errors
    /// - Non-positive extent
    pub fn new(origin_x: f32, origin_y: f32, width: f32, height: f32) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(MockproofError::invalid_config(format!(
                "viewport extent must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            origin_x,
            origin_y,
            width,
            height,
        })
    }
}

/// One in-progress drag gesture over a single layer
#[derive(Debug, Clone)]
pub struct DragSession {
    layer_id: String,
    viewport: PrintAreaViewport,
    /// Dragged layer's display size, fixed for the gesture
    layer_width: f32,
    layer_height: f32,
    /// Pointer position where the grab started
    grab_x: f32,
    grab_y: f32,
    /// Layer offset (display px from the viewport origin) when the grab started
    start_x: f32,
    start_y: f32,
    /// Current live offset, clamped to the viewport
    live_x: f32,
    live_y: f32,
}

impl DragSession {
    /// Begin a drag on `layer_id` with the pointer at `(pointer_x, pointer_y)`
    /// in display coordinates.
    ///
    /// # Errors
    /// - [`MockproofError::UnknownLayer`] for an id not in the composition
    pub fn begin(
        state: &CompositionState,
        viewport: PrintAreaViewport,
        layer_id: &str,
        pointer_x: f32,
        pointer_y: f32,
    ) -> Result<Self> {
        let entry = state
            .entry(layer_id)
            .ok_or_else(|| MockproofError::unknown_layer(layer_id))?;

        let layer_width = entry.layer.scaled_width();
        let layer_height = layer_width * entry.cutout.aspect_ratio();
        let position = entry.layer.position();
        let start_x = position.x * viewport.width;
        let start_y = position.y * viewport.height;

        let mut session = Self {
            layer_id: layer_id.to_owned(),
            viewport,
            layer_width,
            layer_height,
            grab_x: pointer_x,
            grab_y: pointer_y,
            start_x,
            start_y,
            live_x: start_x,
            live_y: start_y,
        };
        session.apply_clamp();
        Ok(session)
    }

    /// Update the live offset from the current pointer position. Does not
    /// touch the composition.
    pub fn move_to(&mut self, pointer_x: f32, pointer_y: f32) {
        self.live_x = self.start_x + (pointer_x - self.grab_x);
        self.live_y = self.start_y + (pointer_y - self.grab_y);
        self.apply_clamp();
    }

    /// Current clamped offset in display pixels from the viewport origin,
    /// for the host's live overlay rendering
    #[must_use]
    pub fn live_offset(&self) -> (f32, f32) {
        (self.live_x, self.live_y)
    }

    /// Layer being dragged
    #[must_use]
    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Finish the gesture: convert the resting offset to a print-area fraction
    /// and commit it to the composition in a single `set_position` call.
    ///
    /// # Errors
    /// - [`MockproofError::UnknownLayer`] if the layer vanished mid-gesture
    pub fn commit(self, state: &mut CompositionState) -> Result<()> {
        let position = Position::new(
            self.live_x / self.viewport.width,
            self.live_y / self.viewport.height,
        );
        state.set_position(&self.layer_id, position)
    }

    /// Clamp the live offset so the layer's display rectangle stays inside
    /// the viewport. A layer larger than the area pins to the origin.
    fn apply_clamp(&mut self) {
        let max_x = (self.viewport.width - self.layer_width).max(0.0);
        let max_y = (self.viewport.height - self.layer_height).max(0.0);
        self.live_x = self.live_x.clamp(0.0, max_x);
        self.live_y = self.live_y.clamp(0.0, max_y);
    }
}
