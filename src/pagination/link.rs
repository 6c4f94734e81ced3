//! Continuation links
//!
//! Rewrites the current request URL so that following it fetches the next
//! page. Query parameters are re-emitted sorted by name.

use super::types::{CursorSpec, QueryParamNames};
use url::Url;

/// Link to the page starting at `cursor`
///
/// Drops any after parameter and replaces the from and start-from
/// parameters with the cursor's values; other parameters are kept.
pub fn build_next_link(request_url: &Url, names: &QueryParamNames, cursor: &CursorSpec) -> Url {
    let replaced = [&names.after, &names.from, &names.start_from];
    let mut pairs = retained_pairs(request_url, &replaced);
    pairs.extend(cursor.to_query_pairs(names));
    with_query(request_url, pairs)
}

/// Link to a numbered page
///
/// Page 1 is expressed by omitting the page parameter.
pub fn build_page_link(request_url: &Url, page_param: &str, page: u64) -> Url {
    let page_param = page_param.to_string();
    let mut pairs = retained_pairs(request_url, &[&page_param]);
    if page > 1 {
        pairs.push((page_param, page.to_string()));
    }
    with_query(request_url, pairs)
}

fn retained_pairs(url: &Url, removed: &[&String]) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| !removed.iter().any(|r| r.as_str() == key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

fn with_query(url: &Url, mut pairs: Vec<(String, String)>) -> Url {
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut next = url.clone();
    if pairs.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(pairs);
    }
    next
}
