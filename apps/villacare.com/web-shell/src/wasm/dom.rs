use super::*;

/// [`PageHost`] backed by the live document.
pub(super) struct DomHost {
    window: Window,
    document: Document,
    selectors: PageSelectors,
}

impl DomHost {
    pub(super) fn new(window: Window, document: Document, selectors: PageSelectors) -> Self {
        Self {
            window,
            document,
            selectors,
        }
    }

    pub(super) fn window(&self) -> &Window {
        &self.window
    }

    pub(super) fn document(&self) -> &Document {
        &self.document
    }

    pub(super) fn selectors(&self) -> &PageSelectors {
        &self.selectors
    }

    /// Whether the collapsible menu is open in the markup we booted on.
    pub(super) fn menu_initially_shown(&self) -> bool {
        self.document
            .query_selector(&self.selectors.navbar_collapse)
            .ok()
            .flatten()
            .is_some_and(|collapse| {
                collapse
                    .class_list()
                    .contains(&self.selectors.menu_shown_class)
            })
    }

    fn form(&self, kind: FormKind) -> Option<HtmlFormElement> {
        let id = match kind {
            FormKind::Contact => &self.selectors.contact_form_id,
            FormKind::Review => &self.selectors.review_form_id,
        };
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlFormElement>()
            .ok()
    }

    fn submit_button(&self, kind: FormKind) -> Option<HtmlButtonElement> {
        self.form(kind)?
            .query_selector(&self.selectors.submit_button)
            .ok()
            .flatten()?
            .dyn_into::<HtmlButtonElement>()
            .ok()
    }

    fn search_sections(&self) -> Vec<Element> {
        query_elements(&self.document, &self.selectors.search_sections)
    }

    /// Removes notification elements this controller no longer tracks, such
    /// as ones left behind by a previous page script.
    fn sweep_stray_notifications(&self, keep: &str) {
        for element in query_elements(&self.document, &format!(".{NOTIFICATION_CLASS}")) {
            if element.id() != keep {
                element.remove();
            }
        }
    }

    fn build_notification(
        &self,
        notification: &Notification,
        on_close: Task,
    ) -> Result<HtmlElement, String> {
        let root = self
            .document
            .create_element("div")
            .map_err(|_| "failed to create notification element".to_string())?
            .dyn_into::<HtmlElement>()
            .map_err(|_| "notification element is not HtmlElement".to_string())?;
        root.set_id(&notification.id.element_id());
        root.set_class_name(&notification.kind.class_name());

        let style = root.style();
        for (property, value) in NOTIFICATION_BASE_STYLE {
            style
                .set_property(property, value)
                .map_err(|_| "failed to style notification".to_string())?;
        }
        style
            .set_property("background", notification.kind.background_color())
            .map_err(|_| "failed to style notification".to_string())?;

        let content = self
            .document
            .create_element("div")
            .map_err(|_| "failed to create notification content".to_string())?;
        content.set_class_name(NOTIFICATION_CONTENT_CLASS);

        let message = self
            .document
            .create_element("span")
            .map_err(|_| "failed to create notification message".to_string())?;
        message.set_class_name(NOTIFICATION_MESSAGE_CLASS);
        message.set_text_content(Some(&notification.message));

        let close = self
            .document
            .create_element("button")
            .map_err(|_| "failed to create notification close".to_string())?;
        close.set_class_name(NOTIFICATION_CLOSE_CLASS);
        close
            .set_attribute("type", "button")
            .map_err(|_| "failed to set notification close type".to_string())?;
        close
            .set_attribute("aria-label", "Close")
            .map_err(|_| "failed to label notification close".to_string())?;
        close.set_text_content(Some(NOTIFICATION_CLOSE_LABEL));

        let on_click = Closure::once_into_js(move |_event: web_sys::Event| on_close());
        close
            .add_event_listener_with_callback("click", on_click.unchecked_ref())
            .map_err(|_| "failed to bind notification close".to_string())?;

        content
            .append_child(&message)
            .map_err(|_| "failed to assemble notification".to_string())?;
        content
            .append_child(&close)
            .map_err(|_| "failed to assemble notification".to_string())?;
        root.append_child(&content)
            .map_err(|_| "failed to assemble notification".to_string())?;
        Ok(root)
    }
}

impl PageHost for DomHost {
    fn scroll_to_element(&self, element_id: &str) -> bool {
        match self.document.get_element_by_id(element_id) {
            Some(element) => {
                smooth_scroll_to(&element);
                true
            }
            None => false,
        }
    }

    fn search_query(&self) -> Option<String> {
        self.document
            .get_element_by_id(&self.selectors.search_input_id)?
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| input.value())
    }

    fn search_section_texts(&self) -> Vec<String> {
        self.search_sections()
            .iter()
            .map(|section| section.text_content().unwrap_or_default())
            .collect()
    }

    fn scroll_to_search_section(&self, index: usize) -> bool {
        match self.search_sections().get(index) {
            Some(section) => {
                smooth_scroll_to(section);
                true
            }
            None => false,
        }
    }

    fn read_form(&self, kind: FormKind) -> Option<FormPayload> {
        let form = self.form(kind)?;
        let data = FormData::new_with_form(&form).ok()?;
        let entries = match js_sys::try_iter(&data) {
            Ok(Some(entries)) => entries,
            _ => {
                warn!(form = kind.as_str(), "form data is not iterable");
                return Some(FormPayload::default());
            }
        };

        let mut payload = FormPayload::default();
        for entry in entries.flatten() {
            let entry = js_sys::Array::from(&entry);
            let Some(name) = entry.get(0).as_string() else {
                continue;
            };
            match entry.get(1).as_string() {
                Some(value) => payload.push(name, value),
                None => debug!(form = kind.as_str(), field = name.as_str(), "skipping non-text field"),
            }
        }
        Some(payload)
    }

    fn begin_submit(&self, kind: FormKind, busy_label: &str) -> Option<String> {
        let button = self.submit_button(kind)?;
        let original = button.text_content().unwrap_or_default();
        button.set_text_content(Some(busy_label));
        button.set_disabled(true);
        Some(original)
    }

    fn end_submit(&self, kind: FormKind, label: &str) {
        if let Some(button) = self.submit_button(kind) {
            button.set_text_content(Some(label));
            button.set_disabled(false);
        }
    }

    fn reset_form(&self, kind: FormKind) {
        if let Some(form) = self.form(kind) {
            form.reset();
        }
    }

    fn cookie_string(&self) -> String {
        self.document
            .dyn_ref::<HtmlDocument>()
            .and_then(|document| document.cookie().ok())
            .unwrap_or_default()
    }

    fn mount_notification(&self, notification: &Notification, on_close: Task) {
        let element_id = notification.id.element_id();
        self.sweep_stray_notifications(&element_id);

        let Some(body) = self.document.body() else {
            warn!("document body is unavailable, notification not shown");
            return;
        };
        match self.build_notification(notification, on_close) {
            Ok(element) => {
                if body.append_child(&element).is_err() {
                    warn!(id = notification.id.get(), "failed to attach notification");
                }
            }
            Err(error) => warn!(%error, "failed to build notification"),
        }
    }

    fn unmount_notification(&self, id: NotificationId) {
        if let Some(element) = self.document.get_element_by_id(&id.element_id()) {
            if element.is_connected() {
                element.remove();
            }
        }
    }

    fn schedule(&self, delay_ms: u32, task: Task) {
        Timeout::new(delay_ms, task).forget();
    }

    fn apply_navbar(&self, appearance: NavbarAppearance) {
        let Some(navbar) = self
            .document
            .query_selector(&self.selectors.navbar)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let style = navbar.style();
        if style
            .set_property("background", appearance.background())
            .and_then(|()| style.set_property("backdrop-filter", appearance.backdrop_filter()))
            .is_err()
        {
            debug!("failed to style navbar");
        }
    }

    fn set_menu_shown(&self, shown: bool) {
        let Some(collapse) = self
            .document
            .query_selector(&self.selectors.navbar_collapse)
            .ok()
            .flatten()
        else {
            return;
        };
        if collapse
            .class_list()
            .toggle_with_force(&self.selectors.menu_shown_class, shown)
            .is_err()
        {
            debug!(shown, "failed to toggle menu class");
        }
    }

    fn mark_revealed(&self, key: RevealKey) {
        let selector = format!("[{REVEAL_KEY_ATTRIBUTE}=\"{key}\"]");
        let Some(element) = self.document.query_selector(&selector).ok().flatten() else {
            return;
        };
        if element
            .class_list()
            .add_1(&self.selectors.revealed_class)
            .is_err()
        {
            debug!(key, "failed to mark element revealed");
        }
    }
}

pub(super) fn query_elements(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        warn!(selector, "invalid selector");
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Injects the notification stylesheet once per document.
pub(super) fn ensure_notification_styles(document: &Document) -> Result<(), String> {
    if document
        .get_element_by_id(NOTIFICATION_STYLE_ELEMENT_ID)
        .is_some()
    {
        return Ok(());
    }
    let head = document
        .head()
        .ok_or_else(|| "document head is unavailable".to_string())?;
    let style = document
        .create_element("style")
        .map_err(|_| "failed to create notification stylesheet".to_string())?;
    style.set_id(NOTIFICATION_STYLE_ELEMENT_ID);
    style.set_text_content(Some(NOTIFICATION_STYLESHEET));
    head.append_child(&style)
        .map_err(|_| "failed to append notification stylesheet".to_string())?;
    Ok(())
}

/// Tags every reveal target with its key and returns the tagged elements.
pub(super) fn tag_reveal_targets(document: &Document, selector: &str) -> Vec<Element> {
    let targets = query_elements(document, selector);
    for (key, target) in targets.iter().enumerate() {
        if target
            .set_attribute(REVEAL_KEY_ATTRIBUTE, &key.to_string())
            .is_err()
        {
            debug!(key, "failed to tag reveal target");
        }
    }
    targets
}

pub(super) fn reveal_key_of(element: &Element) -> Option<RevealKey> {
    element.get_attribute(REVEAL_KEY_ATTRIBUTE)?.parse().ok()
}

fn smooth_scroll_to(element: &Element) {
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}
