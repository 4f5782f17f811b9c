#![allow(clippy::uninlined_format_args)]

//! # Mockproof
//!
//! Core engine for a product-mockup proofing tool: merchants upload product
//! photos, an external service removes their backgrounds, and the resulting
//! cutouts are placed, scaled, and dragged inside a product template's
//! print-safe area, then flattened deterministically into a single PNG proof.
//!
//! The crate is UI-agnostic. A host shell supplies raw upload bytes from its
//! file-drop surface and renders previews from the pure layout output; this
//! crate owns everything in between:
//!
//! - **Removal client**: submit → poll → fetch against the asynchronous
//!   background-removal job API, with injected configuration and credentials
//!   and a bounded polling budget.
//! - **Layer model**: the authoritative per-cutout transform state (fractional
//!   position, clamped scale, z-order).
//! - **Placement**: drag gestures clamped to the print area, committed to the
//!   model once per gesture.
//! - **Mockup registry**: product type → background template + print-safe-area
//!   geometry.
//! - **Compositor**: one pure layout function shared by live preview and
//!   native-resolution export, plus flatten and PNG encoding.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mockproof::{
//!     EnvKeyProvider, MediaType, MockupRegistry, MockupTemplate, ProofSession,
//!     RemovalClient, RemovalServiceConfig, Upload,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RemovalServiceConfig::builder()
//!     .service_base_url("https://removal.example.com")
//!     .build()?;
//! let client = RemovalClient::new(config, Arc::new(EnvKeyProvider::new("REMOVAL_API_KEY")))?;
//!
//! let mut registry = MockupRegistry::new();
//! let background = image::open("templates/tshirt.png")?;
//! registry.register(MockupTemplate::new(MediaType::Tshirt, background)?);
//!
//! let mut session = ProofSession::new(client, registry, MediaType::Tshirt);
//! let outcomes = session
//!     .process_uploads(vec![Upload::new("photo.jpg", std::fs::read("photo.jpg")?)])
//!     .await;
//! assert!(outcomes.iter().all(|o| o.is_added()));
//!
//! let proof_png = session.export_png()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod composition;
pub mod compositor;
pub mod config;
pub mod error;
pub mod mockup;
pub mod placement;
pub mod session;
pub mod types;

// Public API exports
pub use client::{ApiResponse, HttpTransport, RemovalClient, RemovalTransport, API_KEY_HEADER};
pub use composition::{
    CompositionEntry, CompositionState, Layer, Position, ScaleStep, DEFAULT_BASE_WIDTH, SCALE_MAX,
    SCALE_MIN,
};
pub use compositor::{encode_png, flatten, layout, preview_layout, LayerPlacement};
pub use config::{
    ApiKeyProvider, EnvKeyProvider, RemovalServiceConfig, RemovalServiceConfigBuilder,
    StaticKeyProvider,
};
pub use error::{MockproofError, Result};
pub use mockup::{MediaType, MockupRegistry, MockupTemplate, PixelRect, PrintArea};
pub use placement::{DragSession, PrintAreaViewport};
pub use session::{ProofSession, UploadOutcome};
pub use types::{is_previewable_mime, CutoutImage, TaskStatus, Upload};

/// Flatten a composition against a template and return in-memory PNG bytes
///
/// Convenience wrapper over [`compositor::flatten`] and
/// [`compositor::encode_png`] for hosts driving the compositor directly
/// rather than through a [`ProofSession`].
///
/// # Errors
/// - PNG encode failure
pub fn flatten_composition_png(
    state: &CompositionState,
    template: &MockupTemplate,
) -> Result<Vec<u8>> {
    let raster = compositor::flatten(state, template)?;
    compositor::encode_png(&raster)
}
