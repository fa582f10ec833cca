//! Request access policy.
//!
//! Decides, for every inbound request, whether it reaches its handler or is bounced to
//! `/home` or `/sign-in`. The decision is a pure function of the request path and the
//! caller's [`AuthContext`]; the allow-lists are compiled once at startup and never change.

use regex::Regex;

use crate::auth::AuthContext;

pub const ROOT_PATH: &str = "/";
pub const HOME_PATH: &str = "/home";
pub const SIGN_IN_PATH: &str = "/sign-in";
pub const SIGN_UP_PATH: &str = "/sign-up";
pub const VIDEOS_API_PATH: &str = "/api/videos";

/// Pages served to anonymous visitors.
pub const PUBLIC_PAGES: [&str; 4] = [SIGN_IN_PATH, SIGN_UP_PATH, ROOT_PATH, HOME_PATH];

/// API endpoints reachable without a session.
pub const PUBLIC_APIS: [&str; 1] = [VIDEOS_API_PATH];

const API_PREFIX: &str = "/api";
const RPC_PREFIX: &str = "/trpc";
const INTERNAL_PREFIX: &str = "/_";
const STATIC_ASSET_PATTERN: &str =
    r"\.(?:html?|css|js|jpe?g|webp|png|gif|svg|ttf|woff2?|ico|csv|docx?|xlsx?|zip|webmanifest)(?:/|$)";

/// A single allow-list entry.
///
/// Written as a plain path for an exact match, or with a trailing `(.*)` for a prefix
/// match (`/api/videos(.*)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("(.*)") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    /// Exact entries tolerate a single trailing slash. Anything that is not an absolute
    /// path matches nothing.
    pub fn matches(&self, path: &str) -> bool {
        if !path.starts_with('/') {
            return false;
        }

        match self {
            PathPattern::Exact(expected) => {
                path == expected
                    || (path.len() > 1 && path.strip_suffix('/') == Some(expected.as_str()))
            }
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// An immutable set of [`PathPattern`]s.
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    patterns: Vec<PathPattern>,
}

impl RouteMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| PathPattern::parse(pattern.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }
}

/// Where a rejected request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Home,
    SignIn,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Home => HOME_PATH,
            RedirectTarget::SignIn => SIGN_IN_PATH,
        }
    }
}

/// Outcome of evaluating the policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Proceed,
    Redirect(RedirectTarget),
}

/// Per-request facts the decision is made from. Computed fresh and dropped right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestClassification<'a> {
    pub path: &'a str,
    pub is_authenticated: bool,
    pub is_public_page: bool,
    pub is_public_api: bool,
    pub is_home_page: bool,
}

impl RequestClassification<'_> {
    /// The ordered rules. Order matters: the root bounce wins over everything, and an
    /// authenticated visitor on a public page is sent to the dashboard before any
    /// anonymous-caller checks run.
    pub fn decision(&self) -> AccessDecision {
        if self.path == ROOT_PATH {
            return AccessDecision::Redirect(RedirectTarget::Home);
        }

        if self.is_authenticated && self.is_public_page && !self.is_home_page {
            return AccessDecision::Redirect(RedirectTarget::Home);
        }

        if !self.is_authenticated {
            if !self.is_public_api && !self.is_public_page {
                return AccessDecision::Redirect(RedirectTarget::SignIn);
            }

            // Only reachable for an API path that also matches a public page pattern.
            if self.path.starts_with(API_PREFIX) && !self.is_public_api {
                return AccessDecision::Redirect(RedirectTarget::SignIn);
            }
        }

        AccessDecision::Proceed
    }
}

/// Paths the policy never sees: framework internals (first segment starting with `_`)
/// and static files. API routes are always evaluated.
#[derive(Debug, Clone)]
pub struct RouteExclusion {
    static_asset: Regex,
}

impl RouteExclusion {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            static_asset: Regex::new(STATIC_ASSET_PATTERN)?,
        })
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        if path.starts_with(API_PREFIX) || path.starts_with(RPC_PREFIX) {
            return false;
        }

        path.starts_with(INTERNAL_PREFIX) || self.static_asset.is_match(path)
    }
}

/// AccessPolicy
///
/// The compiled allow-lists plus the scope exclusion. Shared read-only across all requests.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public_pages: RouteMatcher,
    public_apis: RouteMatcher,
    exclusion: RouteExclusion,
}

impl AccessPolicy {
    pub fn new(public_pages: RouteMatcher, public_apis: RouteMatcher) -> Result<Self, regex::Error> {
        Ok(Self {
            public_pages,
            public_apis,
            exclusion: RouteExclusion::new()?,
        })
    }

    /// The deployment allow-lists: sign-in, sign-up, root and home pages; the video listing API.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(RouteMatcher::new(PUBLIC_PAGES), RouteMatcher::new(PUBLIC_APIS))
    }

    pub fn classify<'a>(&self, path: &'a str, auth: &AuthContext) -> RequestClassification<'a> {
        RequestClassification {
            path,
            is_authenticated: auth.is_authenticated(),
            is_public_page: self.public_pages.matches(path),
            is_public_api: self.public_apis.matches(path),
            is_home_page: path == HOME_PATH,
        }
    }

    pub fn evaluate(&self, path: &str, auth: &AuthContext) -> AccessDecision {
        self.classify(path, auth).decision()
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusion.is_excluded(path)
    }

    pub fn public_pages(&self) -> &RouteMatcher {
        &self.public_pages
    }

    pub fn public_apis(&self) -> &RouteMatcher {
        &self.public_apis
    }
}
