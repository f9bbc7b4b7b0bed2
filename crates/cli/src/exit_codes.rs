//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args)                          |
//! | 3    | Invalid match config                                |
//! | 4    | Input error (unreadable or malformed CSV)           |
//! | 5    | Unmatched clusters found (only with `--strict`)     |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file failed to parse or validate, or an override made it invalid.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input file missing, unreadable, or malformed.
pub const EXIT_INPUT: u8 = 4;

/// `--strict` was given and at least one cluster stayed unmatched.
pub const EXIT_UNMATCHED: u8 = 5;
