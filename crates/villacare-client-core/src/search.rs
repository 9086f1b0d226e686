/// What a search submission did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query or no search input on the page.
    Skipped,
    /// Scrolled to the section at this index.
    Found(usize),
    NotFound,
}

/// Trims a raw search input; an empty query is `None`.
#[must_use]
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Index of the first section whose text contains `query`, ignoring case.
///
/// Sections are scanned in the order given (document order on the page) and
/// scanning stops at the first hit.
pub fn first_matching_section<I, S>(sections: I, query: &str) -> Option<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let needle = query.to_lowercase();
    sections
        .into_iter()
        .position(|text| text.as_ref().to_lowercase().contains(&needle))
}
