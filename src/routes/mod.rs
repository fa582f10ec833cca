/// Router Module Index
///
/// Routes are grouped by who may reach them once the access policy has run. The policy
/// itself wraps the whole application in `create_router`; the groups below only decide
/// which extra guards apply.

/// HTML page shells (home, sign-in, sign-up, video upload, social share).
pub mod pages;

/// API endpoints reachable without a session.
pub mod public;

/// API endpoints that additionally require a resolved `AuthUser`.
pub mod authenticated;
