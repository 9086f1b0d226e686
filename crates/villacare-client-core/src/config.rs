use serde::{Deserialize, Serialize};

use crate::submission::FormKind;

pub const DEFAULT_CONTACT_ENDPOINT: &str = "/submit-contact/";
pub const DEFAULT_REVIEW_ENDPOINT: &str = "/submit-review/";
pub const DEFAULT_CSRF_COOKIE_NAME: &str = "csrftoken";
pub const DEFAULT_CSRF_HEADER_NAME: &str = "X-CSRFToken";
pub const DEFAULT_NOTIFICATION_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_NAVBAR_SCROLL_THRESHOLD_PX: f64 = 100.0;
pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;
pub const DEFAULT_REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
pub const PACKAGE_NAME_PLACEHOLDER: &str = "{package}";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to decode page config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("page config field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("notification timeout must be greater than zero")]
    InvalidNotificationTimeout,
    #[error("reveal threshold must be within [0, 1], got {0}")]
    InvalidRevealThreshold(f64),
    #[error("navbar scroll threshold must be finite and non-negative, got {0}")]
    InvalidNavbarThreshold(f64),
    #[error("unknown log level `{0}`")]
    InvalidLogLevel(String),
}

/// Endpoint and copy for one of the two backend-posted forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormMessages<'a> {
    pub endpoint: &'a str,
    pub busy_label: &'a str,
    pub success_message: &'a str,
    pub failure_message: &'a str,
}

/// Element ids and selectors the page template is expected to provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub in_page_link: String,
    pub reveal_targets: String,
    pub revealed_class: String,
    pub contact_form_id: String,
    pub review_form_id: String,
    pub submit_button: String,
    pub search_form_id: String,
    pub search_input_id: String,
    pub search_sections: String,
    pub subscribe_button: String,
    pub package_attribute: String,
    pub contact_section_id: String,
    pub navbar: String,
    pub navbar_toggler: String,
    pub navbar_collapse: String,
    pub nav_link: String,
    pub menu_shown_class: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            in_page_link: "a[href^=\"#\"]".to_string(),
            reveal_targets: ".section, .service-card, .package-card, .review-card".to_string(),
            revealed_class: "fade-in-up".to_string(),
            contact_form_id: "contactForm".to_string(),
            review_form_id: "reviewForm".to_string(),
            submit_button: "button[type=\"submit\"]".to_string(),
            search_form_id: "searchForm".to_string(),
            search_input_id: "searchInput".to_string(),
            search_sections: ".section".to_string(),
            subscribe_button: ".subscribe-btn".to_string(),
            package_attribute: "data-package".to_string(),
            contact_section_id: "contact".to_string(),
            navbar: ".navbar".to_string(),
            navbar_toggler: ".navbar-toggler".to_string(),
            navbar_collapse: ".navbar-collapse".to_string(),
            nav_link: ".navbar-nav .nav-link".to_string(),
            menu_shown_class: "show".to_string(),
        }
    }
}

/// Runtime configuration of the page script.
///
/// Every field has a default matching the shipped site template, so an
/// empty JSON object (or no config at all) yields a working controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
    pub contact_endpoint: String,
    pub contact_busy_label: String,
    pub contact_success_message: String,
    pub contact_failure_message: String,
    pub review_endpoint: String,
    pub review_busy_label: String,
    pub review_success_message: String,
    pub review_failure_message: String,
    pub no_results_message: String,
    pub subscribe_message_template: String,
    pub unnamed_package_label: String,
    pub notification_timeout_ms: u32,
    pub navbar_scroll_threshold_px: f64,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub log_level: String,
    pub selectors: PageSelectors,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            csrf_cookie_name: DEFAULT_CSRF_COOKIE_NAME.to_string(),
            csrf_header_name: DEFAULT_CSRF_HEADER_NAME.to_string(),
            contact_endpoint: DEFAULT_CONTACT_ENDPOINT.to_string(),
            contact_busy_label: "Sending...".to_string(),
            contact_success_message: "Thank you for your message! We will get back to you soon."
                .to_string(),
            contact_failure_message: "There was an error sending your message. Please try again."
                .to_string(),
            review_endpoint: DEFAULT_REVIEW_ENDPOINT.to_string(),
            review_busy_label: "Submitting...".to_string(),
            review_success_message:
                "Thank you for your review! It will be published after approval.".to_string(),
            review_failure_message:
                "There was an error submitting your review. Please try again.".to_string(),
            no_results_message: "No results found for your search.".to_string(),
            subscribe_message_template: format!(
                "Thank you for your interest in the {PACKAGE_NAME_PLACEHOLDER} package! We will contact you soon."
            ),
            unnamed_package_label: "selected".to_string(),
            notification_timeout_ms: DEFAULT_NOTIFICATION_TIMEOUT_MS,
            navbar_scroll_threshold_px: DEFAULT_NAVBAR_SCROLL_THRESHOLD_PX,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            reveal_root_margin: DEFAULT_REVEAL_ROOT_MARGIN.to_string(),
            log_level: "info".to_string(),
            selectors: PageSelectors::default(),
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("contact_endpoint", &self.contact_endpoint)?;
        require_non_empty("review_endpoint", &self.review_endpoint)?;
        require_non_empty("csrf_cookie_name", &self.csrf_cookie_name)?;
        require_non_empty("csrf_header_name", &self.csrf_header_name)?;
        require_non_empty("selectors.contact_section_id", &self.selectors.contact_section_id)?;
        require_non_empty("selectors.revealed_class", &self.selectors.revealed_class)?;
        require_non_empty("selectors.menu_shown_class", &self.selectors.menu_shown_class)?;

        if self.notification_timeout_ms == 0 {
            return Err(ConfigError::InvalidNotificationTimeout);
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(ConfigError::InvalidRevealThreshold(self.reveal_threshold));
        }
        if !self.navbar_scroll_threshold_px.is_finite() || self.navbar_scroll_threshold_px < 0.0 {
            return Err(ConfigError::InvalidNavbarThreshold(
                self.navbar_scroll_threshold_px,
            ));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .trim()
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    #[must_use]
    pub fn form(&self, kind: FormKind) -> FormMessages<'_> {
        match kind {
            FormKind::Contact => FormMessages {
                endpoint: &self.contact_endpoint,
                busy_label: &self.contact_busy_label,
                success_message: &self.contact_success_message,
                failure_message: &self.contact_failure_message,
            },
            FormKind::Review => FormMessages {
                endpoint: &self.review_endpoint,
                busy_label: &self.review_busy_label,
                success_message: &self.review_success_message,
                failure_message: &self.review_failure_message,
            },
        }
    }

    #[must_use]
    pub fn form_element_id(&self, kind: FormKind) -> &str {
        match kind {
            FormKind::Contact => &self.selectors.contact_form_id,
            FormKind::Review => &self.selectors.review_form_id,
        }
    }

    #[must_use]
    pub fn subscribe_message(&self, package_name: &str) -> String {
        let name = package_name.trim();
        let name = if name.is_empty() {
            self.unnamed_package_label.as_str()
        } else {
            name
        };
        self.subscribe_message_template
            .replace(PACKAGE_NAME_PLACEHOLDER, name)
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField(field));
    }
    Ok(())
}
