/// Extracts the target element id from an in-page link `href`.
///
/// Only fragment hrefs (`#pricing`) qualify. A bare `#` has no target and
/// yields `None`, as does anything that is not a fragment.
#[must_use]
pub fn fragment_target(href: &str) -> Option<&str> {
    let target = href.trim().strip_prefix('#')?;
    if target.is_empty() {
        return None;
    }
    Some(target)
}
