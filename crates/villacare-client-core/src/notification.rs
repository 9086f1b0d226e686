use serde::{Deserialize, Serialize};

pub const NOTIFICATION_CLASS: &str = "notification";
pub const NOTIFICATION_CONTENT_CLASS: &str = "notification-content";
pub const NOTIFICATION_MESSAGE_CLASS: &str = "notification-message";
pub const NOTIFICATION_CLOSE_CLASS: &str = "notification-close";
pub const NOTIFICATION_CLOSE_LABEL: &str = "\u{00d7}";

/// Stylesheet injected once per page for notification layout and entrance.
pub const NOTIFICATION_STYLESHEET: &str = "
@keyframes slideInRight {
    from {
        transform: translateX(100%);
        opacity: 0;
    }
    to {
        transform: translateX(0);
        opacity: 1;
    }
}

.notification-content {
    display: flex;
    align-items: center;
    justify-content: space-between;
}

.notification-close {
    background: none;
    border: none;
    color: white;
    font-size: 1.5rem;
    cursor: pointer;
    margin-left: 1rem;
    padding: 0;
    line-height: 1;
}

.notification-close:hover {
    opacity: 0.7;
}
";

/// Inline style properties shared by every notification kind.
pub const NOTIFICATION_BASE_STYLE: [(&str, &str); 10] = [
    ("position", "fixed"),
    ("top", "20px"),
    ("right", "20px"),
    ("color", "white"),
    ("padding", "1rem 1.5rem"),
    ("border-radius", "10px"),
    ("box-shadow", "0 5px 15px rgba(0, 0, 0, 0.3)"),
    ("z-index", "9999"),
    ("max-width", "400px"),
    ("animation", "slideInRight 0.3s ease-out"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
}

impl NotificationKind {
    /// Parses a kind name as passed from page script; unknown names are `Info`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    #[must_use]
    pub fn background_color(self) -> &'static str {
        match self {
            Self::Success => "#28a745",
            Self::Error => "#dc3545",
            Self::Info => "#17a2b8",
        }
    }

    /// Full class list of the notification root element.
    #[must_use]
    pub fn class_name(self) -> String {
        format!("{NOTIFICATION_CLASS} {NOTIFICATION_CLASS}-{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(u64);

impl NotificationId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// DOM id of the mounted notification element.
    #[must_use]
    pub fn element_id(self) -> String {
        format!("villacare-notification-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}

/// Result of [`NotificationCenter::show`]: the notification to mount and the
/// ones that must come off the page first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowOutcome {
    pub notification: Notification,
    pub replaced: Vec<NotificationId>,
}

/// Owns the "currently displayed notification" slot.
///
/// Last writer wins: showing a notification replaces whatever was current.
/// Removal by id is idempotent, so a late auto-dismiss timer for a
/// notification that was already closed (or replaced) does nothing.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationCenter {
    current: Option<Notification>,
    #[serde(skip)]
    next_id: u64,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self {
            current: None,
            next_id: 1,
        }
    }
}

impl NotificationCenter {
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) -> ShowOutcome {
        let id = NotificationId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let notification = Notification {
            id,
            message: message.into(),
            kind,
        };
        let replaced = self
            .current
            .replace(notification.clone())
            .map(|previous| vec![previous.id])
            .unwrap_or_default();

        ShowOutcome {
            notification,
            replaced,
        }
    }

    /// Clears `id` if it is still the current notification.
    ///
    /// Returns `false` when it was already removed or replaced.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        if self.current.as_ref().is_some_and(|current| current.id == id) {
            self.current = None;
            return true;
        }
        false
    }

    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_current(&self, id: NotificationId) -> bool {
        self.current.as_ref().is_some_and(|current| current.id == id)
    }
}
