//! Page id extraction from user input
//!
//! Accepts a bare 32-character id, a dashed UUID, or any Notion page URL such
//! as `https://www.notion.so/team/Meeting-Notes-0123456789abcdef0123456789abcdef?pvs=4`.

use regex::Regex;
use std::sync::LazyLock;

static TRAILING_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12})$",
    )
    .expect("page id pattern is valid")
});

/// Extract the page id from an id or URL, or `None` for blank input
pub fn extract_page_id(input: &str) -> Option<String> {
    let without_query = input.trim().split(['?', '#']).next().unwrap_or_default();
    let segment = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if let Some(found) = TRAILING_ID.captures(segment).and_then(|caps| caps.get(1)) {
        return Some(found.as_str().replace('-', "").to_lowercase());
    }

    // Anything else: the part after the last dash of the slug
    segment
        .rsplit('-')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
