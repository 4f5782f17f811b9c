//! Mockup template registry
//!
//! Maps a product media type to its background image and print-safe-area
//! geometry. Print areas are stored as fractions of the background box so the
//! same template serves any display or export resolution.

use crate::error::{MockproofError, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Product types a proof can be composed onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// T-shirt front
    Tshirt,
    /// Mug wrap
    Mug,
    /// Poster sheet
    Poster,
}

impl MediaType {
    /// All known media types, in display order
    pub const ALL: &'static [Self] = &[Self::Tshirt, Self::Mug, Self::Poster];

    /// Built-in print-safe-area geometry for this product
    #[must_use]
    pub fn default_print_area(self) -> PrintArea {
        match self {
            // Chest print region
            Self::Tshirt => PrintArea::new(0.30, 0.25, 0.40, 0.35),
            // Printable wrap, clear of the handle
            Self::Mug => PrintArea::new(0.20, 0.30, 0.45, 0.40),
            // Full sheet with a margin
            Self::Poster => PrintArea::new(0.10, 0.10, 0.80, 0.80),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tshirt => write!(f, "tshirt"),
            Self::Mug => write!(f, "mug"),
            Self::Poster => write!(f, "poster"),
        }
    }
}

impl std::str::FromStr for MediaType {
    type Err = MockproofError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tshirt" => Ok(Self::Tshirt),
            "mug" => Ok(Self::Mug),
            "poster" => Ok(Self::Poster),
            other => Err(MockproofError::UnknownTemplate(other.to_owned())),
        }
    }
}

/// Print-safe area as fractions of the rendered background box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintArea {
    /// Left edge offset, fraction of background width
    pub left: f32,
    /// Top edge offset, fraction of background height
    pub top: f32,
    /// Width, fraction of background width
    pub width: f32,
    /// Height, fraction of background height
    pub height: f32,
}

impl PrintArea {
    /// Construct a fractional print area
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Validate that the area has positive extent and stays inside the box
    ///
    /// # Errors
    /// - Negative offsets, non-positive extent, or overflow past 1.0
    pub fn validate(&self) -> Result<()> {
        if self.left < 0.0 || self.top < 0.0 {
            return Err(MockproofError::invalid_config(format!(
                "print area offsets must be non-negative, got ({}, {})",
                self.left, self.top
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(MockproofError::invalid_config(format!(
                "print area extent must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.left + self.width > 1.0 || self.top + self.height > 1.0 {
            return Err(MockproofError::invalid_config(
                "print area extends past the background box",
            ));
        }
        Ok(())
    }

    /// Project the fractional area onto a pixel box of the given dimensions
    #[must_use]
    pub fn to_pixel_rect(&self, box_width: u32, box_height: u32) -> PixelRect {
        PixelRect {
            x: (self.left * box_width as f32).round() as i64,
            y: (self.top * box_height as f32).round() as i64,
            width: (self.width * box_width as f32).round() as u32,
            height: (self.height * box_height as f32).round() as u32,
        }
    }
}

/// An axis-aligned pixel rectangle in some render space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge in pixels
    pub x: i64,
    /// Top edge in pixels
    pub y: i64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A product backdrop plus its print-safe-area geometry
#[derive(Debug, Clone)]
pub struct MockupTemplate {
    media_type: MediaType,
    background: DynamicImage,
    print_area: PrintArea,
}

impl MockupTemplate {
    /// Build a template with this product's built-in print area
    ///
    /// # Errors
    /// - Zero-sized background
    pub fn new(media_type: MediaType, background: DynamicImage) -> Result<Self> {
        Self::with_print_area(media_type, background, media_type.default_print_area())
    }

    /// Build a template with explicit print-area geometry
    ///
    /// # Errors
    /// - Zero-sized background or invalid print area
    pub fn with_print_area(
        media_type: MediaType,
        background: DynamicImage,
        print_area: PrintArea,
    ) -> Result<Self> {
        if background.width() == 0 || background.height() == 0 {
            return Err(MockproofError::invalid_config(format!(
                "background for {media_type} has zero size"
            )));
        }
        print_area.validate()?;
        Ok(Self {
            media_type,
            background,
            print_area,
        })
    }

    /// Product this template renders
    #[must_use]
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Backdrop raster at native resolution
    #[must_use]
    pub fn background(&self) -> &DynamicImage {
        &self.background
    }

    /// Print-safe area as fractions of the background box
    #[must_use]
    pub fn print_area(&self) -> PrintArea {
        self.print_area
    }

    /// Native background dimensions in pixels
    #[must_use]
    pub fn native_dimensions(&self) -> (u32, u32) {
        (self.background.width(), self.background.height())
    }

    /// Print area projected onto the native background resolution
    #[must_use]
    pub fn native_print_rect(&self) -> PixelRect {
        let (w, h) = self.native_dimensions();
        self.print_area.to_pixel_rect(w, h)
    }
}

/// Static lookup from media type to mockup template
#[derive(Debug, Clone, Default)]
pub struct MockupRegistry {
    templates: HashMap<MediaType, MockupTemplate>,
}

impl MockupRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a template, keyed by its media type
    pub fn register(&mut self, template: MockupTemplate) {
        self.templates.insert(template.media_type(), template);
    }

    /// Look up the template for a media type.
    ///
    /// A miss means the caller passed an id outside the registered set, which
    /// is a programming error rather than a user-recoverable condition, but it
    /// still surfaces as a typed error per house style.
    ///
    /// # Errors
    /// - [`MockproofError::UnknownTemplate`] when nothing is registered
    pub fn resolve(&self, media_type: MediaType) -> Result<&MockupTemplate> {
        self.templates
            .get(&media_type)
            .ok_or_else(|| MockproofError::UnknownTemplate(media_type.to_string()))
    }

    /// Media types with a registered template
    #[must_use]
    pub fn media_types(&self) -> Vec<MediaType> {
        MediaType::ALL
            .iter()
            .copied()
            .filter(|m| self.templates.contains_key(m))
            .collect()
    }

    /// Number of registered templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether any template is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
