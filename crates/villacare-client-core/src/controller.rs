use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PageConfig;
use crate::cookie::read_cookie;
use crate::menu::MobileMenuState;
use crate::navbar::NavbarAppearance;
use crate::navigation::fragment_target;
use crate::notification::{Notification, NotificationCenter, NotificationId, NotificationKind};
use crate::reveal::{RevealKey, RevealTracker};
use crate::search::{SearchOutcome, first_matching_section, normalize_query};
use crate::submission::{FormKind, FormPayload, FormTransport, SubmissionOutcome, SubmitRequest};

/// Deferred work handed to the host (timer callbacks, close buttons).
pub type Task = Box<dyn FnOnce()>;

/// Everything the page controller needs from the document.
///
/// Lookups that can miss return `Option`/`bool`; a missing element is never
/// an error. Scrolling is always smooth and aligns the element's top edge
/// with the viewport's top.
pub trait PageHost {
    /// Scrolls to the element with `element_id`. `false` when it is absent.
    fn scroll_to_element(&self, element_id: &str) -> bool;

    /// Raw value of the search input, `None` when the page has none.
    fn search_query(&self) -> Option<String>;
    /// Text content of every searchable section, in document order.
    fn search_section_texts(&self) -> Vec<String>;
    fn scroll_to_search_section(&self, index: usize) -> bool;

    fn read_form(&self, kind: FormKind) -> Option<FormPayload>;
    /// Disables the form's submit control and shows `busy_label` on it.
    /// Returns the label it replaced, or `None` when there is no control.
    fn begin_submit(&self, kind: FormKind, busy_label: &str) -> Option<String>;
    /// Puts `label` back on the submit control and re-enables it.
    fn end_submit(&self, kind: FormKind, label: &str);
    fn reset_form(&self, kind: FormKind);

    /// The page's cookie string (`document.cookie`).
    fn cookie_string(&self) -> String;

    /// Attaches `notification` to the page. `on_close` runs when the user
    /// clicks its close control.
    fn mount_notification(&self, notification: &Notification, on_close: Task);
    /// Detaches a notification element; a no-op when it is not attached.
    fn unmount_notification(&self, id: NotificationId);
    fn schedule(&self, delay_ms: u32, task: Task);

    fn apply_navbar(&self, appearance: NavbarAppearance);
    fn set_menu_shown(&self, shown: bool);
    fn mark_revealed(&self, key: RevealKey);
}

/// JSON-facing view of controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub notification: Option<Notification>,
    pub menu_shown: bool,
    pub revealed_count: usize,
}

/// Owns all interaction handlers of the marketing page.
///
/// The controller is single-threaded: handlers take `&self` and keep their
/// state in `Cell`/`RefCell`, and no borrow is held across an `.await`.
pub struct PageController<H, T> {
    config: PageConfig,
    host: Rc<H>,
    transport: T,
    notifications: Rc<RefCell<NotificationCenter>>,
    menu: Cell<MobileMenuState>,
    reveal: RefCell<RevealTracker>,
}

impl<H, T> PageController<H, T>
where
    H: PageHost + 'static,
    T: FormTransport,
{
    pub fn new(config: PageConfig, host: Rc<H>, transport: T, menu_shown: bool) -> Self {
        Self {
            config,
            host,
            transport,
            notifications: Rc::new(RefCell::new(NotificationCenter::default())),
            menu: Cell::new(MobileMenuState::new(menu_shown)),
            reveal: RefCell::new(RevealTracker::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// Shows a toast, replacing any notification currently on the page, and
    /// schedules its automatic removal.
    pub fn notify(&self, message: &str, kind: NotificationKind) -> NotificationId {
        let outcome = self.notifications.borrow_mut().show(message, kind);
        for replaced in &outcome.replaced {
            self.host.unmount_notification(*replaced);
        }

        let notification = outcome.notification;
        let id = notification.id;
        self.host.mount_notification(
            &notification,
            retire_task(Rc::clone(&self.notifications), Rc::clone(&self.host), id, "closed"),
        );
        self.host.schedule(
            self.config.notification_timeout_ms,
            retire_task(Rc::clone(&self.notifications), Rc::clone(&self.host), id, "expired"),
        );
        debug!(id = id.get(), kind = kind.as_str(), "notification shown");
        id
    }

    /// Removes a notification if it is still on the page.
    pub fn dismiss_notification(&self, id: NotificationId) -> bool {
        retire_notification(&self.notifications, self.host.as_ref(), id, "dismissed")
    }

    /// Handles activation of an `href="#..."` link. The caller has already
    /// suppressed default navigation.
    pub fn follow_in_page_link(&self, href: &str) -> bool {
        let Some(target) = fragment_target(href) else {
            debug!(href, "in-page link without target");
            return false;
        };
        let scrolled = self.host.scroll_to_element(target);
        if !scrolled {
            debug!(target, "in-page link target not found");
        }
        scrolled
    }

    pub fn observe_reveal(&self, key: RevealKey, is_intersecting: bool) -> bool {
        let revealed = self.reveal.borrow_mut().observe(key, is_intersecting);
        if revealed {
            self.host.mark_revealed(key);
        }
        revealed
    }

    /// Posts a contact or review form and reports the result as a toast.
    ///
    /// The submit control is disabled for the duration of the request and
    /// restored when this future completes or is dropped. Returns `None`
    /// when the form is not on the page.
    pub async fn submit_form(&self, kind: FormKind) -> Option<SubmissionOutcome> {
        let Some(payload) = self.host.read_form(kind) else {
            debug!(form = kind.as_str(), "form not on page");
            return None;
        };
        let form = self.config.form(kind);
        let _control = SubmitControlGuard::begin(self.host.as_ref(), kind, form.busy_label);

        let csrf_token = read_cookie(&self.host.cookie_string(), &self.config.csrf_cookie_name);
        if csrf_token.is_none() {
            warn!(
                cookie = self.config.csrf_cookie_name.as_str(),
                "csrf cookie missing, submitting without token"
            );
        }

        info!(
            form = kind.as_str(),
            endpoint = form.endpoint,
            fields = payload.len(),
            "submitting form"
        );
        let request = SubmitRequest {
            kind,
            endpoint: form.endpoint.to_string(),
            csrf_header_name: self.config.csrf_header_name.clone(),
            csrf_token,
            payload,
        };
        let result = self.transport.submit(request).await;

        let outcome = SubmissionOutcome::from_result(&result);
        match (&result, outcome) {
            (_, SubmissionOutcome::Accepted) => {
                info!(form = kind.as_str(), "form accepted");
                self.notify(form.success_message, NotificationKind::Success);
                self.host.reset_form(kind);
            }
            (Ok(response), SubmissionOutcome::Rejected) => {
                warn!(
                    form = kind.as_str(),
                    errors = ?response.errors,
                    "form rejected by backend"
                );
                self.notify(form.failure_message, NotificationKind::Error);
            }
            (Err(error), SubmissionOutcome::Rejected) => {
                warn!(form = kind.as_str(), %error, "form submission failed");
                self.notify(form.failure_message, NotificationKind::Error);
            }
        }
        Some(outcome)
    }

    /// Scrolls to the first section containing the search query.
    pub fn search(&self) -> SearchOutcome {
        let Some(query) = self
            .host
            .search_query()
            .as_deref()
            .and_then(normalize_query)
        else {
            return SearchOutcome::Skipped;
        };

        let sections = self.host.search_section_texts();
        match first_matching_section(&sections, &query) {
            Some(index) => {
                debug!(query = query.as_str(), index, "search hit");
                self.host.scroll_to_search_section(index);
                SearchOutcome::Found(index)
            }
            None => {
                debug!(query = query.as_str(), sections = sections.len(), "search miss");
                self.notify(&self.config.no_results_message, NotificationKind::Info);
                SearchOutcome::NotFound
            }
        }
    }

    /// Acknowledges interest in a package and brings the contact form into
    /// view. Returns whether the contact section was found.
    pub fn subscribe_package(&self, package_name: &str) -> bool {
        info!(package = package_name, "package subscription requested");
        let message = self.config.subscribe_message(package_name);
        self.notify(&message, NotificationKind::Success);
        self.host
            .scroll_to_element(&self.config.selectors.contact_section_id)
    }

    pub fn on_scroll(&self, scroll_y: f64) -> NavbarAppearance {
        let appearance =
            NavbarAppearance::for_scroll_offset(scroll_y, self.config.navbar_scroll_threshold_px);
        self.host.apply_navbar(appearance);
        appearance
    }

    pub fn toggle_menu(&self) -> bool {
        let mut menu = self.menu.get();
        let shown = menu.toggle();
        self.menu.set(menu);
        self.host.set_menu_shown(shown);
        shown
    }

    /// Collapses the mobile menu after a nav link was clicked.
    pub fn nav_link_activated(&self) -> bool {
        let mut menu = self.menu.get();
        let collapsed = menu.collapse();
        self.menu.set(menu);
        if collapsed {
            self.host.set_menu_shown(false);
        }
        collapsed
    }

    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            notification: self.notifications.borrow().current().cloned(),
            menu_shown: self.menu.get().is_shown(),
            revealed_count: self.reveal.borrow().revealed_count(),
        }
    }
}

fn retire_task<H: PageHost + 'static>(
    notifications: Rc<RefCell<NotificationCenter>>,
    host: Rc<H>,
    id: NotificationId,
    reason: &'static str,
) -> Task {
    Box::new(move || {
        retire_notification(&notifications, host.as_ref(), id, reason);
    })
}

fn retire_notification<H: PageHost>(
    notifications: &RefCell<NotificationCenter>,
    host: &H,
    id: NotificationId,
    reason: &'static str,
) -> bool {
    let removed = notifications.borrow_mut().remove(id);
    if removed {
        host.unmount_notification(id);
        debug!(id = id.get(), reason, "notification removed");
    } else {
        debug!(id = id.get(), reason, "notification already gone");
    }
    removed
}

/// Restores a submit control when the submission settles.
struct SubmitControlGuard<'a, H: PageHost> {
    host: &'a H,
    kind: FormKind,
    original_label: Option<String>,
}

impl<'a, H: PageHost> SubmitControlGuard<'a, H> {
    fn begin(host: &'a H, kind: FormKind, busy_label: &str) -> Self {
        let original_label = host.begin_submit(kind, busy_label);
        Self {
            host,
            kind,
            original_label,
        }
    }
}

impl<H: PageHost> Drop for SubmitControlGuard<'_, H> {
    fn drop(&mut self) {
        if let Some(label) = self.original_label.take() {
            self.host.end_submit(self.kind, &label);
        }
    }
}
