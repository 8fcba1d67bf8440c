//! Well-known durable storage keys.
//!
//! Key names are part of the on-disk contract: they must survive client
//! upgrades so an existing session is still recognized after an update.

/// The access token. Written by the login/refresh flows, read during
/// startup reconciliation, cleared on logout.
pub const ACCESS_TOKEN: &str = "accessToken";

/// The refresh token. Same lifecycle as [`ACCESS_TOKEN`].
pub const REFRESH_TOKEN: &str = "refreshToken";

/// The serialized session snapshot (user, memberships, active tenant,
/// flags — never credentials). Written on every session mutation.
pub const SESSION_SNAPSHOT: &str = "auth-session-snapshot";
