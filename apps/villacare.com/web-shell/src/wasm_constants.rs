pub(crate) const PAGE_CONFIG_GLOBAL: &str = "__VILLACARE_CONFIG__";
pub(crate) const NOTIFICATION_STYLE_ELEMENT_ID: &str = "villacare-notification-styles";
pub(crate) const REVEAL_KEY_ATTRIBUTE: &str = "data-villacare-reveal";
pub(crate) const DOM_READY_EVENT: &str = "DOMContentLoaded";
pub(crate) const DOCUMENT_LOADING_STATE: &str = "loading";
