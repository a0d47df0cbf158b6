//! Locations and step addressing modes.
//!
//! A [`Location`] is the path-and-query part of the address bar. An
//! [`AddressMode`] decides how a step is encoded into it: as a `?step=`
//! query parameter preserving all other parameters, or as an extra path
//! segment under a fixed base path where the flow's initial step maps to
//! the bare base.

/// Path and query of the current address, query order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            query: Vec::new(),
        }
    }

    /// Parse a `path?key=value&...` string. Keys without `=` get an empty
    /// value.
    pub fn parse(url: &str) -> Self {
        let (path, query_str) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };
        let query = query_str
            .map(|q| {
                q.split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            path: normalize_path(path),
            query,
        }
    }

    pub fn to_url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.clone()
                } else {
                    format!("{k}={v}")
                }
            })
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace a query parameter, preserving the others in place.
    pub fn with_query_param(mut self, key: &str, value: &str) -> Self {
        match self.query.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.query.push((key.to_string(), value.to_string())),
        }
        self
    }

    pub fn without_query_param(mut self, key: &str) -> Self {
        self.query.retain(|(k, _)| k != key);
        self
    }
}

/// Strip a trailing slash (except on the root path).
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Addressing modes
// ---------------------------------------------------------------------------

/// How a step is encoded into the address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressMode {
    /// `?<param>=<slug>` appended to the current path, all other query
    /// parameters preserved.
    Query { param: String },
    /// `<base>/<slug>`; the flow's initial step maps to the bare base
    /// path with no extra segment.
    PathSegment { base: String },
}

impl AddressMode {
    pub fn query(param: impl Into<String>) -> Self {
        Self::Query {
            param: param.into(),
        }
    }

    pub fn path_segment(base: impl Into<String>) -> Self {
        Self::PathSegment {
            base: normalize_path(&base.into()),
        }
    }

    /// The raw step slug encoded in `location`, if any.
    pub fn read_slug<'a>(&self, location: &'a Location) -> Option<&'a str> {
        match self {
            Self::Query { param } => location.query_value(param).filter(|v| !v.is_empty()),
            Self::PathSegment { base } => {
                let rest = location.path.strip_prefix(base.as_str())?;
                let segment = rest.strip_prefix('/')?;
                if segment.is_empty() || segment.contains('/') {
                    None
                } else {
                    Some(segment)
                }
            }
        }
    }

    /// The location encoding `slug` (or no step at all, for `None`),
    /// derived from the current location.
    pub fn location_for(&self, current: &Location, slug: Option<&str>) -> Location {
        match self {
            Self::Query { param } => match slug {
                Some(slug) => current.clone().with_query_param(param, slug),
                None => current.clone().without_query_param(param),
            },
            Self::PathSegment { base } => {
                let path = match slug {
                    Some(slug) => format!("{base}/{slug}"),
                    None => base.clone(),
                };
                Location {
                    path,
                    query: current.query.clone(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
