use super::*;

use super::dom::{ensure_notification_styles, query_elements, reveal_key_of, tag_reveal_targets};

/// Reads `window.__VILLACARE_CONFIG__`. Falls back to defaults when the global
/// is absent, and also when it is invalid, returning the reason in that case.
pub(super) fn load_page_config() -> (PageConfig, Option<String>) {
    let Some(window) = web_sys::window() else {
        return (PageConfig::default(), None);
    };
    let raw = match js_sys::Reflect::get(&window, &JsValue::from_str(PAGE_CONFIG_GLOBAL)) {
        Ok(value) if !value.is_undefined() && !value.is_null() => value,
        _ => return (PageConfig::default(), None),
    };
    let json = match js_sys::JSON::stringify(&raw) {
        Ok(json) => String::from(json),
        Err(_) => {
            return (
                PageConfig::default(),
                Some("page config is not serializable".to_string()),
            );
        }
    };
    match PageConfig::from_json(&json) {
        Ok(config) => (config, None),
        Err(error) => (PageConfig::default(), Some(error.to_string())),
    }
}

pub(super) fn set_boot_phase(phase: &str, detail: &str) {
    DIAGNOSTICS.with(|state| {
        let mut state = state.borrow_mut();
        state.phase = phase.to_string();
        state.detail = detail.to_string();
        if phase != "error" {
            state.last_error = None;
        }
    });
}

pub(super) fn set_boot_error(message: &str) {
    DIAGNOSTICS.with(|state| {
        let mut state = state.borrow_mut();
        state.phase = "error".to_string();
        state.detail = "startup failed".to_string();
        state.last_error = Some(message.to_string());
    });
    tracing::error!(error = message, "page script failed to start");
}

/// Runs `ready` once the document is parsed: immediately when it already is,
/// otherwise on `DOMContentLoaded`.
pub(super) fn when_dom_ready(ready: impl FnOnce() + 'static) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let document = window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())?;

    if document.ready_state() != DOCUMENT_LOADING_STATE {
        ready();
        return Ok(());
    }
    let callback = Closure::once_into_js(move |_event: web_sys::Event| ready());
    document
        .add_event_listener_with_callback(DOM_READY_EVENT, callback.unchecked_ref())
        .map_err(|_| "failed to wait for DOMContentLoaded".to_string())
}

pub(super) fn boot(config: PageConfig) -> Result<(), String> {
    if PAGE.with(|slot| slot.borrow().is_some()) {
        debug!("page script already booted");
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let document = window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())?;

    set_boot_phase("booting", "installing notification styles");
    ensure_notification_styles(&document)?;

    let host = Rc::new(DomHost::new(window, document, config.selectors.clone()));
    let menu_shown = host.menu_initially_shown();
    let page = Rc::new(PageController::new(
        config,
        Rc::clone(&host),
        GlooFormTransport,
        menu_shown,
    ));
    PAGE.with(|slot| {
        *slot.borrow_mut() = Some(Rc::clone(&page));
    });

    set_boot_phase("booting", "installing handlers");
    install_in_page_links(&page)?;
    install_menu(&page)?;
    install_forms(&page)?;
    install_search(&page)?;
    install_subscribe_buttons(&page)?;
    install_scroll(&page)?;
    if let Err(error) = install_reveal_observer(&page) {
        warn!(%error, "scroll reveal disabled");
    }

    let listeners = DIAGNOSTICS.with(|state| state.borrow().listeners);
    set_boot_phase("ready", "handlers installed");
    info!(listeners, "page script ready");
    Ok(())
}

fn listen(
    target: &EventTarget,
    event_name: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), String> {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(handler));
    target
        .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
        .map_err(|_| format!("failed to install {event_name} handler"))?;
    PAGE_LISTENERS.with(|slot| {
        slot.borrow_mut().push(callback);
    });
    DIAGNOSTICS.with(|state| {
        state.borrow_mut().listeners += 1;
    });
    Ok(())
}

fn install_in_page_links(page: &Rc<WebPageController>) -> Result<(), String> {
    let host = page.host();
    for link in query_elements(host.document(), &host.selectors().in_page_link) {
        let page = Rc::clone(page);
        let anchor = link.clone();
        listen(&link, "click", move |event| {
            event.prevent_default();
            let href = anchor.get_attribute("href").unwrap_or_default();
            page.follow_in_page_link(&href);
        })?;
    }
    Ok(())
}

fn install_menu(page: &Rc<WebPageController>) -> Result<(), String> {
    let host = page.host();
    let selectors = host.selectors();
    let toggler = host
        .document()
        .query_selector(&selectors.navbar_toggler)
        .ok()
        .flatten();
    let collapse = host
        .document()
        .query_selector(&selectors.navbar_collapse)
        .ok()
        .flatten();

    if let (Some(toggler), Some(_)) = (toggler, collapse) {
        let page_for_toggle = Rc::clone(page);
        listen(&toggler, "click", move |_event| {
            page_for_toggle.toggle_menu();
        })?;
    } else {
        debug!("navbar toggler or collapse missing, mobile menu not wired");
    }

    for link in query_elements(host.document(), &selectors.nav_link) {
        let page = Rc::clone(page);
        listen(&link, "click", move |_event| {
            page.nav_link_activated();
        })?;
    }
    Ok(())
}

fn install_forms(page: &Rc<WebPageController>) -> Result<(), String> {
    for kind in FormKind::ALL {
        let form_id = page.config().form_element_id(kind);
        let Some(form) = page.host().document().get_element_by_id(form_id) else {
            debug!(form = kind.as_str(), "form not on page");
            continue;
        };
        let page = Rc::clone(page);
        listen(&form, "submit", move |event| {
            event.prevent_default();
            let page = Rc::clone(&page);
            spawn_local(async move {
                page.submit_form(kind).await;
            });
        })?;
    }
    Ok(())
}

fn install_search(page: &Rc<WebPageController>) -> Result<(), String> {
    let host = page.host();
    let Some(form) = host
        .document()
        .get_element_by_id(&host.selectors().search_form_id)
    else {
        return Ok(());
    };
    let page = Rc::clone(page);
    listen(&form, "submit", move |event| {
        event.prevent_default();
        page.search();
    })
}

fn install_subscribe_buttons(page: &Rc<WebPageController>) -> Result<(), String> {
    let host = page.host();
    let attribute = host.selectors().package_attribute.clone();
    for button in query_elements(host.document(), &host.selectors().subscribe_button) {
        let page = Rc::clone(page);
        let source = button.clone();
        let attribute = attribute.clone();
        listen(&button, "click", move |event| {
            event.prevent_default();
            let package = source.get_attribute(&attribute).unwrap_or_default();
            page.subscribe_package(&package);
        })?;
    }
    Ok(())
}

fn install_scroll(page: &Rc<WebPageController>) -> Result<(), String> {
    let window = page.host().window().clone();
    let page = Rc::clone(page);
    let source = window.clone();
    listen(&window, "scroll", move |_event| {
        page.on_scroll(source.scroll_y().unwrap_or(0.0));
    })
}

fn install_reveal_observer(page: &Rc<WebPageController>) -> Result<(), String> {
    let host = page.host();
    let targets = tag_reveal_targets(host.document(), &host.selectors().reveal_targets);
    DIAGNOSTICS.with(|state| {
        state.borrow_mut().reveal_targets = targets.len();
    });
    if targets.is_empty() {
        return Ok(());
    }

    let page_for_entries = Rc::clone(page);
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::wrap(Box::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                if let Some(key) = reveal_key_of(&entry.target()) {
                    page_for_entries.observe_reveal(key, entry.is_intersecting());
                }
            }
        },
    ));

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(page.config().reveal_threshold));
    options.set_root_margin(&page.config().reveal_root_margin);
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|_| "IntersectionObserver is unavailable".to_string())?;
    for target in &targets {
        observer.observe(target);
    }

    REVEAL_OBSERVER.with(|slot| {
        *slot.borrow_mut() = Some(RevealObserver {
            _observer: observer,
            _callback: callback,
        });
    });
    Ok(())
}
