//! Shared constants for end-to-end tests

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user
pub const TEST_EMAIL: &str = "listener@example.com";
pub const TEST_PASS: &str = "listenerpass";
pub const TEST_USERNAME: &str = "Listener";
pub const TEST_NICK: &str = "listener";

/// Admin test user, promoted right after registration
pub const ADMIN_EMAIL: &str = "curator@example.com";
pub const ADMIN_PASS: &str = "curatorpass";
pub const ADMIN_USERNAME: &str = "Curator";
pub const ADMIN_NICK: &str = "curator";

// ============================================================================
// Test Catalog Metadata
// ============================================================================

pub const ARTIST_1_NAME: &str = "The Test Band";
pub const ARTIST_2_NAME: &str = "Jazz Ensemble";
pub const ALBUM_1_TITLE: &str = "First Album";
pub const ALBUM_2_TITLE: &str = "Second Album";
pub const TRACK_1_TITLE: &str = "Opening Track";
pub const TRACK_2_TITLE: &str = "Closing Track";

/// Placeholders stored on new artists, albums and songs
pub const DEFAULT_IMAGE: &str = "default.png";
pub const DEFAULT_AUDIO_FILE: &str = "default.mp3";

// ============================================================================
// Test Files
// ============================================================================

/// Smallest byte sequence sniffed as a PNG
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// An ID3 tagged MP3 header
pub const MP3_BYTES: &[u8] = &[
    0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A, 0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00,
];

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Signing secret of the test servers
pub const TEST_TOKEN_SECRET: &[u8] = b"e2e-test-secret";

/// Upload limit of the test servers
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;
