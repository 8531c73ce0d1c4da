//! Guest-memory helpers shared by the host function implementations.

use extism::{CurrentPlugin, Error, Val};

/// Maximum allowed length for a key guests pass into a host function (4 KB).
pub const MAX_KEY_LEN: u64 = 4 * 1024;

/// Maximum allowed length for a value guests pass into a host function (10 MB).
pub const MAX_VALUE_LEN: u64 = 10 * 1024 * 1024;

/// Maximum allowed length for a log message (64 KB).
pub const MAX_LOG_MESSAGE_LEN: u64 = 64 * 1024;

/// Read raw bytes from guest memory, rejecting the read before it
/// allocates if it would exceed `limit`.
#[allow(clippy::cast_sign_loss)]
pub fn get_safe_bytes(plugin: &mut CurrentPlugin, val: &Val, limit: u64) -> Result<Vec<u8>, Error> {
    let ptr = match val {
        Val::I64(v) => *v as u64,
        Val::I32(v) => u64::from(*v as u32),
        _ => return Err(Error::msg("expected memory pointer value")),
    };

    let len = plugin.memory_length(ptr)?;
    if len > limit {
        return Err(Error::msg(format!(
            "guest memory read of {len} bytes exceeds limit of {limit} bytes"
        )));
    }

    #[allow(clippy::cast_possible_wrap)]
    let safe_val = Val::I64(ptr as i64);
    plugin.memory_get_val(&safe_val)
}
