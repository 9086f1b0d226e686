use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::executor::block_on;
use villacare_client_core::{
    FormKind, FormPayload, FormTransport, NavbarAppearance, Notification, NotificationId,
    NotificationKind, PageConfig, PageController, PageHost, RevealKey, SearchOutcome,
    SubmissionOutcome, SubmitError, SubmitRequest, SubmitResponse, Task,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FakeForm {
    fields: Vec<(String, String)>,
    button: Option<FakeButton>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FakeButton {
    label: String,
    disabled: bool,
}

impl FakeForm {
    fn contact() -> Self {
        Self {
            fields: vec![
                ("name".to_string(), "Ana".to_string()),
                ("email".to_string(), "ana@example.com".to_string()),
                ("message".to_string(), "Weekly pool cleaning?".to_string()),
            ],
            button: Some(FakeButton {
                label: "Send Message".to_string(),
                disabled: false,
            }),
        }
    }
}

#[derive(Default)]
struct FakeHost {
    element_ids: RefCell<BTreeSet<String>>,
    scrolled_to: RefCell<Vec<String>>,
    search_input: RefCell<Option<String>>,
    sections: RefCell<Vec<String>>,
    scrolled_sections: RefCell<Vec<usize>>,
    forms: RefCell<BTreeMap<&'static str, FakeForm>>,
    cookie: RefCell<String>,
    mounted: RefCell<Vec<Notification>>,
    max_mounted: Cell<usize>,
    close_tasks: RefCell<BTreeMap<NotificationId, Task>>,
    scheduled: RefCell<Vec<(u32, Task)>>,
    unmount_calls: Cell<usize>,
    navbar: RefCell<Vec<NavbarAppearance>>,
    menu_updates: RefCell<Vec<bool>>,
    revealed: RefCell<Vec<RevealKey>>,
}

impl FakeHost {
    fn with_ids(ids: &[&str]) -> Rc<Self> {
        let host = Self::default();
        host.element_ids
            .borrow_mut()
            .extend(ids.iter().map(|id| (*id).to_string()));
        *host.cookie.borrow_mut() = "sessionid=s1; csrftoken=tok%2B1".to_string();
        Rc::new(host)
    }

    fn add_form(&self, kind: FormKind, form: FakeForm) {
        self.forms.borrow_mut().insert(kind.as_str(), form);
    }

    fn form(&self, kind: FormKind) -> Option<FakeForm> {
        self.forms.borrow().get(kind.as_str()).cloned()
    }

    fn mounted(&self) -> Vec<Notification> {
        self.mounted.borrow().clone()
    }

    fn take_close_task(&self, id: NotificationId) -> Option<Task> {
        self.close_tasks.borrow_mut().remove(&id)
    }

    fn take_scheduled(&self) -> Vec<(u32, Task)> {
        std::mem::take(&mut *self.scheduled.borrow_mut())
    }
}

impl PageHost for FakeHost {
    fn scroll_to_element(&self, element_id: &str) -> bool {
        if !self.element_ids.borrow().contains(element_id) {
            return false;
        }
        self.scrolled_to.borrow_mut().push(element_id.to_string());
        true
    }

    fn search_query(&self) -> Option<String> {
        self.search_input.borrow().clone()
    }

    fn search_section_texts(&self) -> Vec<String> {
        self.sections.borrow().clone()
    }

    fn scroll_to_search_section(&self, index: usize) -> bool {
        if index >= self.sections.borrow().len() {
            return false;
        }
        self.scrolled_sections.borrow_mut().push(index);
        true
    }

    fn read_form(&self, kind: FormKind) -> Option<FormPayload> {
        self.forms
            .borrow()
            .get(kind.as_str())
            .map(|form| form.fields.iter().cloned().collect())
    }

    fn begin_submit(&self, kind: FormKind, busy_label: &str) -> Option<String> {
        let mut forms = self.forms.borrow_mut();
        let button = forms.get_mut(kind.as_str())?.button.as_mut()?;
        button.disabled = true;
        Some(std::mem::replace(&mut button.label, busy_label.to_string()))
    }

    fn end_submit(&self, kind: FormKind, label: &str) {
        let mut forms = self.forms.borrow_mut();
        if let Some(button) = forms
            .get_mut(kind.as_str())
            .and_then(|form| form.button.as_mut())
        {
            button.disabled = false;
            button.label = label.to_string();
        }
    }

    fn reset_form(&self, kind: FormKind) {
        if let Some(form) = self.forms.borrow_mut().get_mut(kind.as_str()) {
            for (_, value) in &mut form.fields {
                value.clear();
            }
        }
    }

    fn cookie_string(&self) -> String {
        self.cookie.borrow().clone()
    }

    fn mount_notification(&self, notification: &Notification, on_close: Task) {
        let mut mounted = self.mounted.borrow_mut();
        mounted.push(notification.clone());
        self.max_mounted.set(self.max_mounted.get().max(mounted.len()));
        self.close_tasks.borrow_mut().insert(notification.id, on_close);
    }

    fn unmount_notification(&self, id: NotificationId) {
        self.unmount_calls.set(self.unmount_calls.get() + 1);
        self.mounted.borrow_mut().retain(|mounted| mounted.id != id);
    }

    fn schedule(&self, delay_ms: u32, task: Task) {
        self.scheduled.borrow_mut().push((delay_ms, task));
    }

    fn apply_navbar(&self, appearance: NavbarAppearance) {
        self.navbar.borrow_mut().push(appearance);
    }

    fn set_menu_shown(&self, shown: bool) {
        self.menu_updates.borrow_mut().push(shown);
    }

    fn mark_revealed(&self, key: RevealKey) {
        self.revealed.borrow_mut().push(key);
    }
}

/// Replays canned replies and records what it was asked to send, plus the
/// submit button state observed while the request was in flight.
struct ScriptedTransport {
    host: Rc<FakeHost>,
    replies: RefCell<VecDeque<Result<SubmitResponse, SubmitError>>>,
    requests: Rc<RefCell<Vec<SubmitRequest>>>,
    buttons_in_flight: Rc<RefCell<Vec<Option<FakeButton>>>>,
}

impl ScriptedTransport {
    fn new(host: &Rc<FakeHost>, replies: Vec<Result<SubmitResponse, SubmitError>>) -> Self {
        Self {
            host: Rc::clone(host),
            replies: RefCell::new(replies.into()),
            requests: Rc::new(RefCell::new(Vec::new())),
            buttons_in_flight: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

#[async_trait(?Send)]
impl FormTransport for ScriptedTransport {
    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        self.buttons_in_flight
            .borrow_mut()
            .push(self.host.form(request.kind).and_then(|form| form.button));
        self.requests.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SubmitError::Network("no scripted reply".to_string())))
    }
}

/// Never answers; used to drop a submission mid-flight.
struct StalledTransport;

#[async_trait(?Send)]
impl FormTransport for StalledTransport {
    async fn submit(&self, _request: SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        std::future::pending().await
    }
}

fn success(flag: bool) -> Result<SubmitResponse, SubmitError> {
    Ok(SubmitResponse {
        success: flag,
        ..SubmitResponse::default()
    })
}

fn controller(
    host: &Rc<FakeHost>,
    replies: Vec<Result<SubmitResponse, SubmitError>>,
) -> (
    PageController<FakeHost, ScriptedTransport>,
    Rc<RefCell<Vec<SubmitRequest>>>,
    Rc<RefCell<Vec<Option<FakeButton>>>>,
) {
    let transport = ScriptedTransport::new(host, replies);
    let requests = Rc::clone(&transport.requests);
    let in_flight = Rc::clone(&transport.buttons_in_flight);
    (
        PageController::new(PageConfig::default(), Rc::clone(host), transport, false),
        requests,
        in_flight,
    )
}

#[test]
fn in_page_link_scrolls_to_existing_target() {
    let host = FakeHost::with_ids(&["services", "contact"]);
    let (page, _, _) = controller(&host, Vec::new());

    assert!(page.follow_in_page_link("#services"));
    assert_eq!(*host.scrolled_to.borrow(), vec!["services".to_string()]);
}

#[test]
fn in_page_link_without_target_is_a_quiet_no_op() {
    let host = FakeHost::with_ids(&["services"]);
    let (page, _, _) = controller(&host, Vec::new());

    assert!(!page.follow_in_page_link("#pricing"));
    assert!(!page.follow_in_page_link("#"));
    assert!(host.scrolled_to.borrow().is_empty());
    assert!(host.mounted().is_empty());
}

#[test]
fn at_most_one_notification_is_mounted_after_each_call() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    let kinds = [
        NotificationKind::Info,
        NotificationKind::Success,
        NotificationKind::Error,
        NotificationKind::Info,
    ];
    let mut last = None;
    for (index, kind) in kinds.into_iter().enumerate() {
        last = Some(page.notify(&format!("message {index}"), kind));
        assert_eq!(host.mounted().len(), 1);
    }

    let mounted = host.mounted();
    assert_eq!(Some(mounted[0].id), last);
    assert_eq!(mounted[0].message, "message 3");
    assert_eq!(host.max_mounted.get(), 1);
}

#[test]
fn notification_expires_after_timeout_and_late_timer_is_harmless() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    let id = page.notify("Saved", NotificationKind::Success);
    let mut scheduled = host.take_scheduled();
    assert_eq!(scheduled.len(), 1);
    let (delay, expire) = scheduled.remove(0);
    assert_eq!(delay, 5_000);

    expire();
    assert!(host.mounted().is_empty());
    assert_eq!(host.unmount_calls.get(), 1);
    assert!(page.snapshot().notification.is_none());

    // Closing after expiry touches nothing.
    let close = host.take_close_task(id).expect("close task registered");
    close();
    assert_eq!(host.unmount_calls.get(), 1);
}

#[test]
fn manual_close_removes_immediately_and_timer_becomes_no_op() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    let id = page.notify("Hello", NotificationKind::Info);
    let close = host.take_close_task(id).expect("close task registered");
    close();
    assert!(host.mounted().is_empty());
    assert_eq!(host.unmount_calls.get(), 1);

    for (_, expire) in host.take_scheduled() {
        expire();
    }
    assert_eq!(host.unmount_calls.get(), 1);
    assert!(!page.dismiss_notification(id));
}

#[test]
fn stale_timer_does_not_remove_newer_notification() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    page.notify("first", NotificationKind::Info);
    let first_timer = host.take_scheduled().remove(0).1;
    let second = page.notify("second", NotificationKind::Info);

    first_timer();
    let mounted = host.mounted();
    assert_eq!(mounted.len(), 1);
    assert_eq!(mounted[0].id, second);
}

#[test]
fn accepted_contact_form_clears_fields_and_restores_button() -> anyhow::Result<()> {
    let host = FakeHost::with_ids(&[]);
    host.add_form(FormKind::Contact, FakeForm::contact());
    let (page, requests, in_flight) = controller(&host, vec![success(true)]);

    let outcome = block_on(page.submit_form(FormKind::Contact));
    assert_eq!(outcome, Some(SubmissionOutcome::Accepted));

    let form = host.form(FormKind::Contact).ok_or_else(|| anyhow::anyhow!("form missing"))?;
    assert!(form.fields.iter().all(|(_, value)| value.is_empty()));
    assert_eq!(
        form.button,
        Some(FakeButton {
            label: "Send Message".to_string(),
            disabled: false,
        })
    );

    let mounted = host.mounted();
    assert_eq!(mounted.len(), 1);
    assert_eq!(mounted[0].kind, NotificationKind::Success);
    assert_eq!(
        mounted[0].message,
        "Thank you for your message! We will get back to you soon."
    );

    let requests = requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].endpoint, "/submit-contact/");
    assert_eq!(requests[0].csrf_header_name, "X-CSRFToken");
    assert_eq!(requests[0].csrf_token.as_deref(), Some("tok+1"));
    assert_eq!(requests[0].payload.get("email"), Some("ana@example.com"));

    assert_eq!(
        *in_flight.borrow(),
        vec![Some(FakeButton {
            label: "Sending...".to_string(),
            disabled: true,
        })]
    );
    Ok(())
}

#[test]
fn rejected_contact_form_keeps_fields_and_restores_button() -> anyhow::Result<()> {
    let host = FakeHost::with_ids(&[]);
    host.add_form(FormKind::Contact, FakeForm::contact());
    let (page, _, _) = controller(&host, vec![success(false)]);

    let outcome = block_on(page.submit_form(FormKind::Contact));
    assert_eq!(outcome, Some(SubmissionOutcome::Rejected));

    let form = host.form(FormKind::Contact).ok_or_else(|| anyhow::anyhow!("form missing"))?;
    assert_eq!(form.fields, FakeForm::contact().fields);
    assert_eq!(form.button, FakeForm::contact().button);

    let mounted = host.mounted();
    assert_eq!(mounted.len(), 1);
    assert_eq!(mounted[0].kind, NotificationKind::Error);
    assert_eq!(
        mounted[0].message,
        "There was an error sending your message. Please try again."
    );
    Ok(())
}

#[test]
fn network_failure_matches_rejected_response() {
    let rejected_host = FakeHost::with_ids(&[]);
    rejected_host.add_form(FormKind::Contact, FakeForm::contact());
    let (rejected_page, _, _) = controller(&rejected_host, vec![success(false)]);
    block_on(rejected_page.submit_form(FormKind::Contact));

    let failed_host = FakeHost::with_ids(&[]);
    failed_host.add_form(FormKind::Contact, FakeForm::contact());
    let (failed_page, _, _) = controller(
        &failed_host,
        vec![Err(SubmitError::Network("connection refused".to_string()))],
    );
    let outcome = block_on(failed_page.submit_form(FormKind::Contact));

    assert_eq!(outcome, Some(SubmissionOutcome::Rejected));
    assert_eq!(
        failed_host.form(FormKind::Contact),
        rejected_host.form(FormKind::Contact)
    );
    let failed = failed_host.mounted();
    let rejected = rejected_host.mounted();
    assert_eq!(failed[0].kind, rejected[0].kind);
    assert_eq!(failed[0].message, rejected[0].message);
}

#[test]
fn review_form_uses_review_endpoint_and_copy() {
    let host = FakeHost::with_ids(&[]);
    host.add_form(
        FormKind::Review,
        FakeForm {
            fields: vec![("rating".to_string(), "5".to_string())],
            button: Some(FakeButton {
                label: "Submit Review".to_string(),
                disabled: false,
            }),
        },
    );
    let (page, requests, in_flight) = controller(
        &host,
        vec![Err(SubmitError::Decode("expected value".to_string()))],
    );

    block_on(page.submit_form(FormKind::Review));

    assert_eq!(requests.borrow()[0].endpoint, "/submit-review/");
    assert_eq!(
        in_flight.borrow()[0].as_ref().map(|button| button.label.as_str()),
        Some("Submitting...")
    );
    assert_eq!(
        host.mounted()[0].message,
        "There was an error submitting your review. Please try again."
    );
    assert_eq!(
        host.form(FormKind::Review).and_then(|form| form.button),
        Some(FakeButton {
            label: "Submit Review".to_string(),
            disabled: false,
        })
    );
}

#[test]
fn missing_form_or_cookie_is_tolerated() {
    let host = FakeHost::with_ids(&[]);
    let (page, requests, _) = controller(&host, vec![success(true)]);
    assert_eq!(block_on(page.submit_form(FormKind::Review)), None);
    assert!(requests.borrow().is_empty());

    host.add_form(FormKind::Review, FakeForm::contact());
    host.cookie.borrow_mut().clear();
    assert_eq!(
        block_on(page.submit_form(FormKind::Review)),
        Some(SubmissionOutcome::Accepted)
    );
    assert_eq!(requests.borrow()[0].csrf_token, None);
}

#[test]
fn dropped_submission_still_restores_button() {
    let host = FakeHost::with_ids(&[]);
    host.add_form(FormKind::Contact, FakeForm::contact());
    let page = PageController::new(
        PageConfig::default(),
        Rc::clone(&host),
        StalledTransport,
        false,
    );

    assert!(page.submit_form(FormKind::Contact).now_or_never().is_none());
    assert_eq!(
        host.form(FormKind::Contact).and_then(|form| form.button),
        FakeForm::contact().button
    );
    assert!(host.mounted().is_empty());
}

#[test]
fn search_scrolls_to_single_matching_section() {
    let host = FakeHost::with_ids(&[]);
    *host.sections.borrow_mut() = vec![
        "About VillaCare".to_string(),
        "Pool and Garden Maintenance".to_string(),
        "Reviews from owners".to_string(),
    ];
    *host.search_input.borrow_mut() = Some("  garden ".to_string());
    let (page, _, _) = controller(&host, Vec::new());

    assert_eq!(page.search(), SearchOutcome::Found(1));
    assert_eq!(*host.scrolled_sections.borrow(), vec![1]);
    assert!(host.mounted().is_empty());
}

#[test]
fn search_without_match_shows_info_notification() {
    let host = FakeHost::with_ids(&[]);
    *host.sections.borrow_mut() = vec!["About VillaCare".to_string()];
    *host.search_input.borrow_mut() = Some("helicopter".to_string());
    let (page, _, _) = controller(&host, Vec::new());

    assert_eq!(page.search(), SearchOutcome::NotFound);
    assert!(host.scrolled_sections.borrow().is_empty());
    let mounted = host.mounted();
    assert_eq!(mounted[0].kind, NotificationKind::Info);
    assert_eq!(mounted[0].message, "No results found for your search.");
}

#[test]
fn blank_search_is_a_no_op() {
    let host = FakeHost::with_ids(&[]);
    *host.sections.borrow_mut() = vec!["About".to_string()];
    *host.search_input.borrow_mut() = Some("   ".to_string());
    let (page, _, _) = controller(&host, Vec::new());

    assert_eq!(page.search(), SearchOutcome::Skipped);
    *host.search_input.borrow_mut() = None;
    assert_eq!(page.search(), SearchOutcome::Skipped);
    assert!(host.mounted().is_empty());
    assert!(host.scrolled_sections.borrow().is_empty());
}

#[test]
fn subscribing_names_package_and_scrolls_to_contact() {
    let host = FakeHost::with_ids(&["contact"]);
    let (page, _, _) = controller(&host, Vec::new());

    assert!(page.subscribe_package("Gold"));
    let mounted = host.mounted();
    assert_eq!(mounted[0].kind, NotificationKind::Success);
    assert!(mounted[0].message.contains("Gold"));
    assert_eq!(*host.scrolled_to.borrow(), vec!["contact".to_string()]);
}

#[test]
fn subscribing_without_contact_section_still_notifies() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    assert!(!page.subscribe_package("Silver"));
    assert!(host.mounted()[0].message.contains("Silver"));
}

#[test]
fn navbar_follows_scroll_offset_every_tick() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    for offset in [0.0, 150.0, 150.0, 100.0] {
        page.on_scroll(offset);
    }
    assert_eq!(
        *host.navbar.borrow(),
        vec![
            NavbarAppearance::Resting,
            NavbarAppearance::Scrolled,
            NavbarAppearance::Scrolled,
            NavbarAppearance::Resting,
        ]
    );
}

#[test]
fn menu_toggles_and_collapses_on_nav_link() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    assert!(!page.nav_link_activated());
    assert!(page.toggle_menu());
    assert!(page.snapshot().menu_shown);
    assert!(page.nav_link_activated());
    assert!(!page.snapshot().menu_shown);
    assert!(page.toggle_menu());
    assert!(!page.toggle_menu());

    assert_eq!(*host.menu_updates.borrow(), vec![true, false, true, false]);
}

#[test]
fn reveal_marks_each_element_once() {
    let host = FakeHost::with_ids(&[]);
    let (page, _, _) = controller(&host, Vec::new());

    assert!(!page.observe_reveal(0, false));
    assert!(page.observe_reveal(0, true));
    assert!(page.observe_reveal(2, true));
    assert!(!page.observe_reveal(0, false));
    assert!(!page.observe_reveal(0, true));

    assert_eq!(*host.revealed.borrow(), vec![0, 2]);
    assert_eq!(page.snapshot().revealed_count, 2);
}
