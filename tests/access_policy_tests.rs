use media_studio::{
    auth::AuthContext,
    policy::{
        AccessDecision, AccessPolicy, PathPattern, RedirectTarget, RouteExclusion, RouteMatcher,
    },
};

// --- Helpers ---

fn policy() -> AccessPolicy {
    AccessPolicy::standard().unwrap()
}

fn anonymous() -> AuthContext {
    AuthContext::anonymous()
}

fn user() -> AuthContext {
    AuthContext::authenticated("u1")
}

const PROCEED: AccessDecision = AccessDecision::Proceed;
const TO_HOME: AccessDecision = AccessDecision::Redirect(RedirectTarget::Home);
const TO_SIGN_IN: AccessDecision = AccessDecision::Redirect(RedirectTarget::SignIn);

// --- Concrete Scenarios ---

#[test]
fn test_root_redirects_anonymous_to_home() {
    assert_eq!(policy().evaluate("/", &anonymous()), TO_HOME);
}

#[test]
fn test_home_proceeds_for_signed_in_user() {
    assert_eq!(policy().evaluate("/home", &user()), PROCEED);
}

#[test]
fn test_sign_in_redirects_signed_in_user_home() {
    assert_eq!(policy().evaluate("/sign-in", &user()), TO_HOME);
}

#[test]
fn test_public_api_proceeds_for_anonymous() {
    assert_eq!(policy().evaluate("/api/videos", &anonymous()), PROCEED);
}

#[test]
fn test_protected_page_redirects_anonymous_to_sign_in() {
    assert_eq!(policy().evaluate("/video-upload", &anonymous()), TO_SIGN_IN);
}

#[test]
fn test_protected_api_redirects_anonymous_to_sign_in() {
    assert_eq!(policy().evaluate("/api/secret", &anonymous()), TO_SIGN_IN);
}

// --- Properties ---

#[test]
fn test_root_always_redirects_home_regardless_of_auth() {
    let policy = policy();
    for auth in [anonymous(), user(), AuthContext::authenticated("someone-else")] {
        assert_eq!(policy.evaluate("/", &auth), TO_HOME);
    }
}

#[test]
fn test_signed_in_user_on_public_pages_goes_home() {
    let policy = policy();
    for path in ["/sign-in", "/sign-up", "/sign-in/"] {
        assert_eq!(policy.evaluate(path, &user()), TO_HOME, "path {path}");
    }
}

#[test]
fn test_anonymous_on_non_public_paths_goes_to_sign_in() {
    let policy = policy();
    for path in [
        "/video-upload",
        "/social-share",
        "/api/video-upload",
        "/api/image-upload",
        "/api/videos/123",
        "/api/social-formats",
        "/does-not-exist",
        "/HOME",
    ] {
        assert_eq!(policy.evaluate(path, &anonymous()), TO_SIGN_IN, "path {path}");
    }
}

#[test]
fn test_signed_in_user_on_non_public_paths_proceeds() {
    let policy = policy();
    for path in [
        "/video-upload",
        "/social-share",
        "/api/video-upload",
        "/api/videos",
        "/api/secret",
        "/does-not-exist",
    ] {
        assert_eq!(policy.evaluate(path, &user()), PROCEED, "path {path}");
    }
}

#[test]
fn test_anonymous_public_pages_proceed() {
    let policy = policy();
    for path in ["/home", "/sign-in", "/sign-up"] {
        assert_eq!(policy.evaluate(path, &anonymous()), PROCEED, "path {path}");
    }
}

#[test]
fn test_evaluation_is_idempotent() {
    let policy = policy();
    for path in ["/", "/home", "/sign-in", "/api/videos", "/api/secret", "/video-upload"] {
        for auth in [anonymous(), user()] {
            assert_eq!(policy.evaluate(path, &auth), policy.evaluate(path, &auth));
        }
    }
}

#[test]
fn test_malformed_paths_fail_closed() {
    let policy = policy();
    assert_eq!(policy.evaluate("", &anonymous()), TO_SIGN_IN);
    assert_eq!(policy.evaluate("home", &anonymous()), TO_SIGN_IN);
}

// --- Rule Ordering Edge Cases ---

#[test]
fn test_api_path_matching_public_page_pattern_still_requires_session() {
    // An API route wrongly listed as a page still needs a session.
    let policy = AccessPolicy::new(
        RouteMatcher::new(["/sign-in", "/", "/home", "/api/status"]),
        RouteMatcher::new(["/api/videos"]),
    )
    .unwrap();

    assert_eq!(policy.evaluate("/api/status", &anonymous()), TO_SIGN_IN);
    assert_eq!(policy.evaluate("/api/status", &user()), TO_HOME);
}

#[test]
fn test_prefix_patterns_cover_sub_paths() {
    let policy = AccessPolicy::new(
        RouteMatcher::new(["/sign-in(.*)", "/", "/home"]),
        RouteMatcher::new(["/api/videos(.*)"]),
    )
    .unwrap();

    assert_eq!(policy.evaluate("/sign-in/factor-one", &anonymous()), PROCEED);
    assert_eq!(policy.evaluate("/api/videos/123", &anonymous()), PROCEED);
    assert_eq!(policy.evaluate("/api/other", &anonymous()), TO_SIGN_IN);
}

#[test]
fn test_classification_fields() {
    let policy = policy();

    let home = policy.classify("/home", &user());
    assert!(home.is_authenticated);
    assert!(home.is_public_page);
    assert!(!home.is_public_api);
    assert!(home.is_home_page);

    let videos = policy.classify("/api/videos", &anonymous());
    assert!(!videos.is_authenticated);
    assert!(!videos.is_public_page);
    assert!(videos.is_public_api);
    assert!(!videos.is_home_page);
}

// --- Pattern Matching ---

#[test]
fn test_path_pattern_parsing() {
    assert_eq!(
        PathPattern::parse("/sign-in"),
        PathPattern::Exact("/sign-in".to_string())
    );
    assert_eq!(
        PathPattern::parse("/api/videos(.*)"),
        PathPattern::Prefix("/api/videos".to_string())
    );
}

#[test]
fn test_exact_pattern_semantics() {
    let pattern = PathPattern::parse("/sign-in");
    assert!(pattern.matches("/sign-in"));
    assert!(pattern.matches("/sign-in/"));
    assert!(!pattern.matches("/sign-in//"));
    assert!(!pattern.matches("/sign-in/extra"));
    assert!(!pattern.matches("/sign-inx"));
    assert!(!pattern.matches("sign-in"));

    let root = PathPattern::parse("/");
    assert!(root.matches("/"));
    assert!(!root.matches("/home"));
}

#[test]
fn test_standard_allow_lists() {
    let policy = policy();
    assert_eq!(policy.public_pages().patterns().len(), 4);
    assert_eq!(
        policy.public_apis().patterns(),
        &[PathPattern::Exact("/api/videos".to_string())]
    );
}

// --- Scope Exclusion ---

#[test]
fn test_static_assets_and_internals_are_excluded() {
    let exclusion = RouteExclusion::new().unwrap();
    for path in [
        "/_health",
        "/_docs/openapi.json",
        "/assets/app.js",
        "/assets/app.css",
        "/favicon.ico",
        "/images/banner.jpeg",
        "/fonts/inter.woff2",
        "/site.webmanifest",
        "/reports/summary.xlsx",
    ] {
        assert!(exclusion.is_excluded(path), "path {path} should be excluded");
    }
}

#[test]
fn test_pages_and_api_routes_are_evaluated() {
    let exclusion = RouteExclusion::new().unwrap();
    for path in [
        "/",
        "/home",
        "/video-upload",
        "/data.json",
        "/api/videos",
        "/api/export.csv",
        "/api/_internal",
        "/trpc/videos.list",
    ] {
        assert!(!exclusion.is_excluded(path), "path {path} should be evaluated");
    }
}
