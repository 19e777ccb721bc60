/// Router Module Index
///
/// Splits the routes by the access they require. Guards are applied per module: the
/// authenticated router carries a sign-in layer, and admin handlers check the session's
/// access level themselves.

/// Routes open to anyone: catalog reads, the login flow and health checks.
pub mod public;

/// Routes behind the `require_sign_in` layer.
pub mod authenticated;

/// Catalog writes and user management. Every handler requires an admin session.
pub mod admin;
