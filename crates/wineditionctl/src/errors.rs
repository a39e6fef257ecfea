//! Exit codes for wineditionctl

use winedition::PlatformQueryError;

/// Success, or the queried edition / role matched
pub const EXIT_SUCCESS: i32 = 0;

/// No edition or role matched
pub const EXIT_NO_MATCH: i32 = 1;

/// Bad arguments, unreadable snapshot or invalid config
pub const EXIT_USAGE_ERROR: i32 = 2;

/// A platform query failed while capturing the live snapshot
pub const EXIT_PLATFORM_ERROR: i32 = 3;

/// Map a command failure to its exit code
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.is::<PlatformQueryError>()) {
        EXIT_PLATFORM_ERROR
    } else {
        EXIT_USAGE_ERROR
    }
}

pub fn exit_code_for_match(matched: bool) -> i32 {
    if matched {
        EXIT_SUCCESS
    } else {
        EXIT_NO_MATCH
    }
}
