//! Proofing session orchestrator
//!
//! Ties the removal client, the mockup registry, and the composition state
//! together the way the original page shell did: uploads are processed
//! sequentially (one awaited at a time, in order), a failure on one image is
//! recorded as the session's single current error without touching layers
//! already accumulated from earlier successes, and export flattens the current
//! state on demand. No failure is fatal to the session.

use crate::client::RemovalClient;
use crate::composition::CompositionState;
use crate::compositor;
use crate::error::{MockproofError, Result};
use crate::mockup::{MediaType, MockupRegistry, MockupTemplate};
use crate::types::Upload;
use tracing::{info, instrument, warn};

/// Result of running one upload through the removal pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The cutout was accepted into the composition
    Added {
        /// Original upload filename
        filename: String,
        /// Id of the new layer
        layer_id: String,
    },
    /// This image's removal attempt failed; later uploads still ran
    Failed {
        /// Original upload filename
        filename: String,
        /// Display text of the failure
        error: String,
    },
}

impl UploadOutcome {
    /// Whether this upload produced a layer
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

/// One merchant proofing session: client + registry + composition + current error
pub struct ProofSession {
    client: RemovalClient,
    registry: MockupRegistry,
    state: CompositionState,
    last_error: Option<MockproofError>,
}

impl ProofSession {
    /// Start a session on the given product
    #[must_use]
    pub fn new(client: RemovalClient, registry: MockupRegistry, media_type: MediaType) -> Self {
        Self {
            client,
            registry,
            state: CompositionState::new(media_type),
            last_error: None,
        }
    }

    /// Current composition state
    #[must_use]
    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Mutable composition state, for placement commits and scale steps
    pub fn state_mut(&mut self) -> &mut CompositionState {
        &mut self.state
    }

    /// Registered mockup templates
    #[must_use]
    pub fn registry(&self) -> &MockupRegistry {
        &self.registry
    }

    /// Template for the currently selected product
    ///
    /// # Errors
    /// - [`MockproofError::UnknownTemplate`] when nothing is registered for it
    pub fn current_template(&self) -> Result<&MockupTemplate> {
        self.registry.resolve(self.state.media_type())
    }

    /// Switch the product the proof renders onto
    pub fn select_media_type(&mut self, media_type: MediaType) {
        self.state.select_media_type(media_type);
    }

    /// Run each upload through the removal pipeline, strictly one at a time in
    /// the order given. A successful cutout becomes a layer immediately; a
    /// failure is recorded as the current error and in that upload's outcome,
    /// and processing moves on to the next upload.
    ///
    /// Starting this operation clears any previous error.
    #[instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn process_uploads(&mut self, uploads: Vec<Upload>) -> Vec<UploadOutcome> {
        self.last_error = None;
        let mut outcomes = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let filename = upload.filename.clone();
            match self.client.submit(&upload).await {
                Ok(cutout) => {
                    let layer_id = self.state.add_layer(cutout);
                    info!(%filename, %layer_id, "cutout added to composition");
                    outcomes.push(UploadOutcome::Added { filename, layer_id });
                },
                Err(error) => {
                    warn!(%filename, %error, "background removal failed for upload");
                    outcomes.push(UploadOutcome::Failed {
                        filename,
                        error: error.to_string(),
                    });
                    self.last_error = Some(error);
                },
            }
        }

        outcomes
    }

    /// Flatten the current composition against the selected template and
    /// encode it as PNG bytes. Pure with respect to the composition: repeated
    /// exports of identical state yield identical output.
    ///
    /// Starting this operation clears any previous error.
    ///
    /// # Errors
    /// - [`MockproofError::UnknownTemplate`] for an unregistered product
    /// - PNG encode failure
    pub fn export_png(&mut self) -> Result<Vec<u8>> {
        self.last_error = None;
        let template = self.registry.resolve(self.state.media_type())?;
        let raster = compositor::flatten(&self.state, template)?;
        compositor::encode_png(&raster)
    }

    /// Drop all layers and clear the current error (back to the upload step)
    pub fn reset(&mut self) {
        self.last_error = None;
        self.state.clear();
    }

    /// The single current error surfaced to the user, if any
    #[must_use]
    pub fn last_error(&self) -> Option<&MockproofError> {
        self.last_error.as_ref()
    }

    /// Take the current error, leaving the session error-free
    pub fn take_error(&mut self) -> Option<MockproofError> {
        self.last_error.take()
    }
}
