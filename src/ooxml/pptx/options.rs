//! Runtime settings for an open presentation.

use crate::common::unit::Dpi;
use std::time::Duration;

/// Options applied to every slide of a presentation.
///
/// # Examples
///
/// ```rust,ignore
/// let options = PresentationOptions::default()
///     .with_max_picture_size(800)
///     .with_dpi(Dpi::new(144.0, 144.0));
/// let pres = Presentation::open_with("deck.pptx", options)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationOptions {
    /// Largest width or height, in pixels, of a newly added picture
    pub max_picture_size: u32,
    /// Offset from the slide's top-left corner, in pixels, of a new picture
    pub picture_origin: f64,
    /// Resolution used to convert pixels to EMU and back
    pub dpi: Dpi,
    /// Time allowed for scanning shape names when generating a new name
    pub name_match_budget: Duration,
}

impl PresentationOptions {
    pub fn with_max_picture_size(mut self, px: u32) -> Self {
        self.max_picture_size = px;
        self
    }

    pub fn with_picture_origin(mut self, px: f64) -> Self {
        self.picture_origin = px;
        self
    }

    pub fn with_dpi(mut self, dpi: Dpi) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_name_match_budget(mut self, budget: Duration) -> Self {
        self.name_match_budget = budget;
        self
    }
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            max_picture_size: 500,
            picture_origin: 100.0,
            dpi: Dpi::default(),
            name_match_budget: Duration::from_secs(100),
        }
    }
}
