pub const SCROLLED_BACKGROUND: &str = "rgba(0, 0, 0, 0.95)";
pub const SCROLLED_BACKDROP_FILTER: &str = "blur(10px)";
pub const RESTING_BACKGROUND: &str = "linear-gradient(135deg, #000000 0%, #1a1a1a 100%)";
pub const RESTING_BACKDROP_FILTER: &str = "none";

/// Presentational state of the fixed navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarAppearance {
    Resting,
    Scrolled,
}

impl NavbarAppearance {
    /// Strictly greater than the threshold switches to the scrolled fill.
    #[must_use]
    pub fn for_scroll_offset(scroll_y: f64, threshold_px: f64) -> Self {
        if scroll_y > threshold_px {
            Self::Scrolled
        } else {
            Self::Resting
        }
    }

    #[must_use]
    pub fn background(self) -> &'static str {
        match self {
            Self::Resting => RESTING_BACKGROUND,
            Self::Scrolled => SCROLLED_BACKGROUND,
        }
    }

    #[must_use]
    pub fn backdrop_filter(self) -> &'static str {
        match self {
            Self::Resting => RESTING_BACKDROP_FILTER,
            Self::Scrolled => SCROLLED_BACKDROP_FILTER,
        }
    }
}
