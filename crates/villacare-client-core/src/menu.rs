/// Collapsible navigation menu on narrow viewports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenuState {
    shown: bool,
}

impl MobileMenuState {
    #[must_use]
    pub fn new(shown: bool) -> Self {
        Self { shown }
    }

    #[must_use]
    pub fn is_shown(self) -> bool {
        self.shown
    }

    /// Flips the menu and returns the new visibility.
    pub fn toggle(&mut self) -> bool {
        self.shown = !self.shown;
        self.shown
    }

    /// Collapses the menu after a nav link was followed.
    ///
    /// Returns `true` only when the menu was open, so callers touch the DOM
    /// only on an actual change.
    pub fn collapse(&mut self) -> bool {
        std::mem::replace(&mut self.shown, false)
    }
}
