#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use gloo_net::http::Request;
    use gloo_timers::callback::Timeout;
    use serde::Serialize;
    use tracing::{debug, info, warn};
    use villacare_client_core::notification::{
        NOTIFICATION_BASE_STYLE, NOTIFICATION_CLASS, NOTIFICATION_CLOSE_CLASS,
        NOTIFICATION_CLOSE_LABEL, NOTIFICATION_CONTENT_CLASS, NOTIFICATION_MESSAGE_CLASS,
        NOTIFICATION_STYLESHEET,
    };
    use villacare_client_core::{
        FormKind, FormPayload, FormTransport, NavbarAppearance, Notification, NotificationId,
        NotificationKind, PageConfig, PageController, PageHost, PageSelectors, RevealKey,
        SubmitError, SubmitRequest, SubmitResponse, Task, decode_submit_response,
    };
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{
        Document, Element, EventTarget, FormData, HtmlButtonElement, HtmlDocument, HtmlElement,
        HtmlFormElement, HtmlInputElement, IntersectionObserver, IntersectionObserverEntry,
        IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
        Window,
    };

    use crate::wasm_constants::*;

    mod dom;
    mod lifecycle;
    mod logging;
    mod network;

    use dom::DomHost;
    use lifecycle::*;
    use network::GlooFormTransport;

    type WebPageController = PageController<DomHost, GlooFormTransport>;

    thread_local! {
        static PAGE: RefCell<Option<Rc<WebPageController>>> = const { RefCell::new(None) };
        static DIAGNOSTICS: RefCell<BootDiagnostics> = RefCell::new(BootDiagnostics::default());
        static PAGE_LISTENERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static REVEAL_OBSERVER: RefCell<Option<RevealObserver>> = const { RefCell::new(None) };
    }

    struct RevealObserver {
        _observer: IntersectionObserver,
        _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    struct BootDiagnostics {
        phase: String,
        detail: String,
        last_error: Option<String>,
        listeners: usize,
        reveal_targets: usize,
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        let (config, config_warning) = load_page_config();
        logging::init_logging(&config);
        if let Some(warning) = config_warning {
            warn!(%warning, "ignoring page config, using defaults");
        }

        set_boot_phase("booting", "waiting for document");
        if let Err(error) = when_dom_ready(move || {
            if let Err(error) = boot(config) {
                set_boot_error(&error);
            }
        }) {
            set_boot_error(&error);
        }
    }

    /// Shows a toast from page script: `show_notification("Saved", "success")`.
    #[wasm_bindgen]
    pub fn show_notification(message: String, kind: Option<String>) {
        let kind = kind
            .as_deref()
            .map(NotificationKind::from_name)
            .unwrap_or_default();
        let shown = with_page(|page| {
            page.notify(&message, kind);
        });
        if shown.is_none() {
            debug!("page controller not booted, dropping notification");
        }
    }

    #[wasm_bindgen]
    pub fn page_state_json() -> String {
        let boot = DIAGNOSTICS.with(|state| state.borrow().clone());
        let page = with_page(|page| page.snapshot());
        serde_json::to_string(&serde_json::json!({ "boot": boot, "page": page }))
            .unwrap_or_else(|_| {
                "{\"boot\":{\"phase\":\"error\",\"detail\":\"state serialization failed\"}}"
                    .to_string()
            })
    }

    fn with_page<R>(f: impl FnOnce(&WebPageController) -> R) -> Option<R> {
        let page = PAGE.with(|slot| slot.borrow().clone())?;
        Some(f(&page))
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::page_state_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn page_state_json() -> String {
    "{\"boot\":{\"phase\":\"native\",\"detail\":\"page script only runs on wasm\"},\"page\":null}"
        .to_string()
}
