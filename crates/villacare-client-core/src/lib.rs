//! Platform-independent half of the VillaCare site script.
//!
//! [`PageController`] owns every interaction handler of the marketing page and
//! talks to the browser only through the [`PageHost`] and [`FormTransport`]
//! seams, so the same handlers run against the real DOM in the web shell and
//! against recording fakes in tests.

pub mod config;
pub mod controller;
pub mod cookie;
pub mod menu;
pub mod navbar;
pub mod navigation;
pub mod notification;
pub mod reveal;
pub mod search;
pub mod submission;

pub use config::{ConfigError, FormMessages, PageConfig, PageSelectors};
pub use controller::{PageController, PageHost, PageSnapshot, Task};
pub use menu::MobileMenuState;
pub use navbar::NavbarAppearance;
pub use notification::{
    Notification, NotificationCenter, NotificationId, NotificationKind, ShowOutcome,
};
pub use reveal::{RevealKey, RevealState, RevealTracker};
pub use search::SearchOutcome;
pub use submission::{
    FormKind, FormPayload, FormTransport, SubmissionOutcome, SubmitError, SubmitRequest,
    SubmitResponse, decode_submit_response,
};
