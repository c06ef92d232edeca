//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When fixture data changes, update only this file.
#![allow(dead_code)]

// ============================================================================
// Test Users
// ============================================================================

/// Owner of playlist 10, likes song 5
pub const USER_1_ID: i64 = 1;
pub const USER_1_NAME: &str = "ann";

/// Followed by user 1, comments on song 6
pub const USER_2_ID: i64 = 2;
pub const USER_2_NAME: &str = "bob";

/// Password shared by the fixture users
pub const TEST_PASS: &str = "testpass123";

// ============================================================================
// Test Catalog IDs
// ============================================================================

/// Artist of every fixture song
pub const ARTIST_3_ID: i64 = 3;
pub const ARTIST_3_NAME: &str = "The Test Band";

/// Never inserted
pub const MISSING_ARTIST_ID: i64 = 99;

/// "First Album" by The Test Band, holds songs 5 and 6
pub const ALBUM_4_ID: i64 = 4;
pub const ALBUM_4_TITLE: &str = "First Album";

pub const SONG_5_ID: i64 = 5;
pub const SONG_5_TITLE: &str = "Opening Track";

pub const SONG_6_ID: i64 = 6;
pub const SONG_6_TITLE: &str = "Closing Track";

/// Single by The Test Band, no album
pub const SONG_7_ID: i64 = 7;
pub const SONG_7_TITLE: &str = "Lone Single";

/// Owned by user 1, holds songs 5 and 6
pub const PLAYLIST_10_ID: i64 = 10;
pub const PLAYLIST_10_NAME: &str = "Road Trip";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
