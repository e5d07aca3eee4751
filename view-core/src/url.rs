use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{form_urlencoded, Url};

use crate::error::{ViewError, ViewResult};

// Base used to resolve same-origin relative locations; never rendered.
const RELATIVE_BASE: &str = "http://dashboard.invalid/";

// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query string as an ordered list of decoded `(name, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamSet {
    pairs: Vec<(String, String)>,
}

impl QueryParamSet {
    /// Parse `a=1&b=2` (a leading `?` is tolerated).
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Drop every occurrence of the named parameters; true if anything was removed.
    pub fn remove_all<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> bool {
        let names: Vec<&str> = names.into_iter().collect();
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| !names.contains(&k.as_str()));
        self.pairs.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        f.write_str(&encoded)
    }
}

/// Path, query and fragment of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Accepts an absolute href or a same-origin relative one (`/x?a=1#y`).
    pub fn parse(href: &str) -> ViewResult<Self> {
        let base = Url::parse(RELATIVE_BASE).map_err(|e| ViewError::History(e.to_string()))?;
        let url = base
            .join(href)
            .map_err(|e| ViewError::History(format!("invalid location {href:?}: {e}")))?;
        Ok(Self { url })
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> QueryParamSet {
        QueryParamSet::parse(self.url.query().unwrap_or(""))
    }

    pub fn set_query(&mut self, params: &QueryParamSet) {
        if params.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.set_query(Some(&params.to_string()));
        }
    }

    /// Fragment without the leading `#`; empty fragments count as absent.
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment().filter(|f| !f.is_empty())
    }

    /// `path[?query][#fragment]`, suitable for `history.replaceState`.
    pub fn to_relative(&self) -> String {
        let mut out = self.url.path().to_string();
        if let Some(query) = self.url.query().filter(|q| !q.is_empty()) {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = self.fragment() {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// Read access to the page URL plus in-place history replacement.
pub trait QueryStringEditor {
    fn location(&self) -> ViewResult<PageLocation>;

    /// Replace the current history entry without navigating.
    fn replace_location(&mut self, location: &PageLocation) -> ViewResult<()>;
}

/// Remove the named query parameters from the current URL.
///
/// Path, the remaining parameters and the fragment are kept. History is only
/// touched when at least one of the names was present; returns whether it was.
pub fn strip_params<E, I, N>(editor: &mut E, names: I) -> ViewResult<bool>
where
    E: QueryStringEditor + ?Sized,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let names: Vec<N> = names.into_iter().collect();
    let mut location = editor.location()?;
    let mut query = location.query();
    if !query.remove_all(names.iter().map(|n| n.as_ref())) {
        return Ok(false);
    }
    location.set_query(&query);
    editor.replace_location(&location)?;
    tracing::debug!(location = %location.to_relative(), "stripped query parameters");
    Ok(true)
}

/// Build `/seg1/seg2/...` with every segment percent-encoded.
pub fn encoded_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut url = match Url::parse(RELATIVE_BASE) {
        Ok(url) => url,
        Err(_) => return String::from("/"),
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// Percent-encode a single query value the way `encodeURIComponent` does.
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryLocation;

    #[test]
    fn strips_named_param_and_keeps_the_rest() {
        let mut loc = MemoryLocation::new("/?open_copy_modal=1&range=7d#trades");
        let changed = strip_params(&mut loc, ["open_copy_modal"]).unwrap();
        assert!(changed);
        assert_eq!(loc.current(), "/?range=7d#trades");
        assert_eq!(loc.replacements(), 1);
    }

    #[test]
    fn absent_param_leaves_history_alone() {
        let mut loc = MemoryLocation::new("/?range=7d#trades");
        let changed = strip_params(&mut loc, ["open_copy_modal"]).unwrap();
        assert!(!changed);
        assert_eq!(loc.current(), "/?range=7d#trades");
        assert_eq!(loc.replacements(), 0);
    }

    #[test]
    fn stripping_last_param_drops_question_mark() {
        let mut loc = MemoryLocation::new("/accounts?open_stop_modal=1&stop_strategy_id=9");
        strip_params(&mut loc, ["open_stop_modal", "stop_strategy_id"]).unwrap();
        assert_eq!(loc.current(), "/accounts");
        assert_eq!(loc.replacements(), 1);
    }

    #[test]
    fn repeated_params_are_all_removed() {
        let mut params = QueryParamSet::parse("?a=1&b=2&a=3");
        assert!(params.remove_all(["a"]));
        assert_eq!(params.to_string(), "b=2");
        assert!(!params.remove_all(["a"]));
    }

    #[test]
    fn query_values_are_decoded() {
        let params = QueryParamSet::parse("name=Acct%2042&x=a+b");
        assert_eq!(params.get("name"), Some("Acct 42"));
        assert_eq!(params.get("x"), Some("a b"));
        assert!(params.contains("x"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn absolute_href_keeps_only_path_query_fragment() {
        let loc = PageLocation::parse("https://example.com/accounts?range=30d#trades").unwrap();
        assert_eq!(loc.path(), "/accounts");
        assert_eq!(loc.fragment(), Some("trades"));
        assert!(loc.query().contains("range"));
        assert_eq!(loc.to_relative(), "/accounts?range=30d#trades");
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(encoded_path(["accounts", "42", "unlink"]), "/accounts/42/unlink");
        assert_eq!(
            encoded_path(["accounts", "a/b c", "unlink"]),
            "/accounts/a%2Fb%20c/unlink"
        );
        assert_eq!(encode_query_value("IC Markets"), "IC%20Markets");
        assert_eq!(encode_query_value("a+b&c=d"), "a%2Bb%26c%3Dd");
        assert_eq!(encode_query_value("Pepperstone-Live_01.(x)"), "Pepperstone-Live_01.(x)");
    }
}
