//! Route model and the router integration point.

use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

/// Path plus query of an in-app location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    /// Parses `"/path?key=value"`. A fragment, if any, is dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or_default();
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// A resolved route as handed to the navigation hook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    pub location: Location,
    /// Route metadata `requiresAuth`.
    pub requires_auth: bool,
}

impl Route {
    #[must_use]
    pub fn public(path: &str) -> Self {
        Self {
            location: Location::parse(path),
            requires_auth: false,
        }
    }

    #[must_use]
    pub fn protected(path: &str) -> Self {
        Self {
            location: Location::parse(path),
            requires_auth: true,
        }
    }
}

/// Where a redirect goes: an in-app route or a full page navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteTarget {
    Route(Location),
    External(String),
}

impl RouteTarget {
    /// `http://` and `https://` strings are external, anything else is an
    /// in-app path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::External(trimmed.to_string())
        } else {
            Self::Route(Location::parse(trimmed))
        }
    }
}

impl From<Location> for RouteTarget {
    fn from(location: Location) -> Self {
        Self::Route(location)
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(location) => location.fmt(f),
            Self::External(url) => f.write_str(url),
        }
    }
}

/// Host router operations the guard drives.
pub trait Router: Send + Sync {
    /// In-app navigation that adds a history entry.
    fn push(&self, location: &Location);

    /// In-app navigation that replaces the current history entry.
    fn replace(&self, location: &Location);

    /// Full page navigation to an external location.
    fn assign(&self, url: &str);

    fn navigate(&self, target: &RouteTarget) {
        match target {
            RouteTarget::Route(location) => self.push(location),
            RouteTarget::External(url) => self.assign(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_path_and_query() {
        let location = Location::parse("/dashboard?accessToken=abc&tab=1");
        assert_eq!(location.path, "/dashboard");
        assert_eq!(location.query.get("accessToken").map(String::as_str), Some("abc"));
        assert_eq!(location.query.get("tab").map(String::as_str), Some("1"));
    }

    #[test]
    fn parse_defaults_empty_path_to_root() {
        assert_eq!(Location::parse("?a=1").path, "/");
        assert_eq!(Location::parse("").path, "/");
    }

    #[test]
    fn display_round_trips_encoded_query() {
        let location = Location::new("/search").with_query("q", "a b");
        assert_eq!(location.to_string(), "/search?q=a+b");
        assert_eq!(Location::parse(&location.to_string()), location);
    }

    #[test]
    fn route_target_detects_external_urls() {
        assert_eq!(
            RouteTarget::parse("https://accounts.example.com/login"),
            RouteTarget::External("https://accounts.example.com/login".to_string())
        );
        assert_eq!(
            RouteTarget::parse("/login"),
            RouteTarget::Route(Location::new("/login"))
        );
    }
}
