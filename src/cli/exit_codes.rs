//! exit codes for jbdap commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help schedulers and scripts tell failure types apart

use crate::error::Error;

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error (bad input files, unreadable JSON)
pub const ERROR: i32 = 1;

/// the engine rejected a definition or failed to evaluate it
pub const ENGINE_ERROR: i32 = 2;

/// a cross-entity reference needs an entity that is not in the root yet
pub const NEEDS_REF: i32 = 3;

/// configuration file error
pub const CONFIG_ERROR: i32 = 5;

/// exit code for an engine error
pub fn for_error(err: &Error) -> i32 {
    if err.is_ref_not_filled() {
        NEEDS_REF
    } else {
        ENGINE_ERROR
    }
}
