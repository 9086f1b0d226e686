/// Looks up `name` in a `document.cookie` style string (`a=1; b=2`).
///
/// The value is URI-decoded; a value that is not valid percent-encoding is
/// returned verbatim rather than dropped. The first matching pair wins.
#[must_use]
pub fn read_cookie(cookie_header: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let value = pair.strip_prefix(name)?.strip_prefix('=')?;
            Some(
                urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string()),
            )
        })
}
