//! Link classification: whether a discovered link stays in the crawl, and
//! whether its raw text looks suspicious. The two checks are independent.

use crate::policy::ScopePolicy;
use std::collections::HashSet;
use url::Url;

/// Links shorter than this are reported as suspicious
pub const MIN_LINK_LEN: usize = 10;

/// Resolve `href` against the page URL and return it if the crawl should follow it.
///
/// Returns `None` for unparseable links, links without a host, hosts outside the
/// allowlist and paths ending in an excluded extension. The fragment is removed.
pub fn resolve_followable(
    base: &Url,
    href: &str,
    allowlist: &HashSet<String>,
    scope: &ScopePolicy,
) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    let host = resolved.host_str()?;
    if !allowlist.contains(host) {
        return None;
    }
    if scope.is_excluded_path(resolved.path()) {
        return None;
    }

    Some(resolved)
}

pub fn is_followable(
    base: &Url,
    href: &str,
    allowlist: &HashSet<String>,
    scope: &ScopePolicy,
) -> bool {
    resolve_followable(base, href, allowlist, scope).is_some()
}

/// Syntactic heuristic over the raw, unresolved link text.
///
/// Flags links containing characters outside `[A-Za-z0-9_/.-]`, links shorter than
/// [`MIN_LINK_LEN`] characters and purely numeric links. A leading `http://` or
/// `https://` does not count against the character check.
pub fn is_suspicious(raw: &str) -> bool {
    if raw.chars().count() < MIN_LINK_LEN {
        return true;
    }
    if raw.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    let rest = strip_web_scheme(raw);
    rest.chars().any(|c| !is_plain_link_char(c))
}

fn strip_web_scheme(raw: &str) -> &str {
    for scheme in ["https://", "http://"] {
        if let Some(prefix) = raw.get(..scheme.len())
            && prefix.eq_ignore_ascii_case(scheme)
        {
            return &raw[scheme.len()..];
        }
    }
    raw
}

fn is_plain_link_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-')
}
