//! Shared constants for end-to-end tests
//!
//! When seeded data changes (credentials, ids, names), update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Password shared by every seeded user
pub const TEST_PASS: &str = "testpass123";

/// Seeded with role super_admin (user id 1)
pub const SUPER_ADMIN_EMAIL: &str = "root@example.com";

/// Seeded with role artist_manager (user id 2)
pub const ARTIST_MANAGER_EMAIL: &str = "manager@example.com";

/// Seeded with role artist (user id 3)
pub const ARTIST_EMAIL: &str = "artist@example.com";

/// Seeded with role admin (user id 4)
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub const SUPER_ADMIN_ID: i64 = 1;
pub const ARTIST_USER_ID: i64 = 3;
pub const SEEDED_USERS: u64 = 4;

// ============================================================================
// Seeded artists and songs
// ============================================================================

/// Linked to the artist user, has two songs
pub const ARTIST_1_ID: i64 = 1;
pub const ARTIST_1_NAME: &str = "The Test Band";

/// No user link, no songs
pub const ARTIST_2_ID: i64 = 2;
pub const ARTIST_2_NAME: &str = "Jazz Ensemble, Trio & Friends";

pub const SONG_1_ID: i64 = 1;
pub const SONG_1_TITLE: &str = "Opening Track";
pub const SONG_2_ID: i64 = 2;

/// An id no seeded row has
pub const MISSING_ID: i64 = 9999;

// ============================================================================
// Timeouts
// ============================================================================

/// Request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum time to wait for the server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
