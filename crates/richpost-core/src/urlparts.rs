use std::fmt;

use url::Url;
use url::form_urlencoded;

/// The pieces of an absolute URL the embedder looks at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UrlParts {
    pub scheme: String,
    /// `user` or `user:password`, without the `@`.
    pub userinfo: Option<String>,
    /// Host name, with `:port` appended when the URL names a non-default port.
    pub host: String,
    pub path: String,
    /// Raw query string without the leading `?`; `None` when empty.
    pub query: Option<String>,
    /// Fragment without the leading `#`; `None` when empty.
    pub fragment: Option<String>,
}

/// Reassembles the normalized URL: lower-case scheme and host, default
/// port dropped.
impl fmt::Display for UrlParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(userinfo) = &self.userinfo {
            write!(f, "{}@", userinfo)?;
        }
        write!(f, "{}{}", self.host, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// Splits an absolute URL into [`UrlParts`].
pub trait UrlDecomposer {
    fn decompose(&self, url: &str) -> Option<UrlParts>;
}

/// [`UrlDecomposer`] backed by the WHATWG parser of the `url` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardUrls;

impl UrlDecomposer for StandardUrls {
    fn decompose(&self, url: &str) -> Option<UrlParts> {
        let parsed = Url::parse(url).ok()?;
        let mut host = parsed.host_str().unwrap_or_default().to_string();
        if let Some(port) = parsed.port() {
            host.push(':');
            host.push_str(&port.to_string());
        }
        let userinfo = match (parsed.username(), parsed.password()) {
            ("", None) => None,
            (user, None) => Some(user.to_string()),
            (user, Some(password)) => Some(format!("{}:{}", user, password)),
        };
        Some(UrlParts {
            scheme: parsed.scheme().to_string(),
            userinfo,
            host,
            path: parsed.path().to_string(),
            query: non_empty(parsed.query()),
            fragment: non_empty(parsed.fragment()),
        })
    }
}

fn non_empty(part: Option<&str>) -> Option<String> {
    part.filter(|part| !part.is_empty()).map(str::to_string)
}

/// Looks up a single-valued query parameter.
///
/// A name given more than once is a list, not a string, and yields `None`.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let mut found = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != name {
            continue;
        }
        if found.is_some() {
            return None;
        }
        found = Some(value.into_owned());
    }
    found
}
