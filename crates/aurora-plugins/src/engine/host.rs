//! Host functions exposed to plugin guests.
//!
//! Every function here is gated on the manifest permission it belongs
//! to ([`HostState::has_permission`]); a guest that calls a host function
//! its manifest never declared gets an error back instead of silently
//! succeeding. The coarse `plugin_system` capability is authorized once,
//! up front, by [`crate::loader::PluginLoader::load`] against the policy
//! gate — these checks are the finer-grained, per-permission layer the
//! manifest declares on top of that.

use extism::{CurrentPlugin, Error, PluginBuilder, UserData, Val};

use crate::engine::host_state::HostState;
use crate::engine::util::{self, MAX_KEY_LEN, MAX_LOG_MESSAGE_LEN, MAX_VALUE_LEN};

/// Register the host function surface on `builder`, bound to `user_data`.
pub fn register_host_functions(
    builder: PluginBuilder,
    user_data: UserData<HostState>,
) -> PluginBuilder {
    builder
        .with_function(
            "aurora_kv_get",
            [extism::PTR],
            [extism::PTR],
            user_data.clone(),
            kv_get,
        )
        .with_function(
            "aurora_kv_set",
            [extism::PTR, extism::PTR],
            [],
            user_data.clone(),
            kv_set,
        )
        .with_function("aurora_log", [extism::PTR, extism::PTR], [], user_data, log)
}

#[allow(clippy::needless_pass_by_value)]
fn kv_get(
    plugin: &mut CurrentPlugin,
    inputs: &[Val],
    outputs: &mut [Val],
    user_data: UserData<HostState>,
) -> Result<(), Error> {
    let key_bytes = util::get_safe_bytes(plugin, &inputs[0], MAX_KEY_LEN)?;
    let key = String::from_utf8_lossy(&key_bytes).to_string();

    let ud = user_data.get()?;
    let state = ud
        .lock()
        .map_err(|e| Error::msg(format!("host state lock poisoned: {e}")))?;

    if !state.has_permission("kv") {
        return Err(Error::msg(format!(
            "plugin '{}' has no declared 'kv' permission",
            state.plugin_id
        )));
    }

    let value = tokio::task::block_in_place(|| {
        state
            .runtime_handle
            .block_on(async { state.kv.get(&key).await })
    })
    .map_err(|e| Error::msg(format!("kv get failed: {e}")))?;

    let bytes = value.unwrap_or_default();
    let mem = plugin.memory_new(&bytes)?;
    outputs[0] = plugin.memory_to_val(mem);
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn kv_set(
    plugin: &mut CurrentPlugin,
    inputs: &[Val],
    _outputs: &mut [Val],
    user_data: UserData<HostState>,
) -> Result<(), Error> {
    let key_bytes = util::get_safe_bytes(plugin, &inputs[0], MAX_KEY_LEN)?;
    let value_bytes = util::get_safe_bytes(plugin, &inputs[1], MAX_VALUE_LEN)?;
    let key = String::from_utf8_lossy(&key_bytes).to_string();

    let ud = user_data.get()?;
    let state = ud
        .lock()
        .map_err(|e| Error::msg(format!("host state lock poisoned: {e}")))?;

    if !state.has_permission("kv") {
        return Err(Error::msg(format!(
            "plugin '{}' has no declared 'kv' permission",
            state.plugin_id
        )));
    }

    tokio::task::block_in_place(|| {
        state
            .runtime_handle
            .block_on(async { state.kv.set(&key, value_bytes).await })
    })
    .map_err(|e| Error::msg(format!("kv set failed: {e}")))?;
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn log(
    plugin: &mut CurrentPlugin,
    inputs: &[Val],
    _outputs: &mut [Val],
    user_data: UserData<HostState>,
) -> Result<(), Error> {
    let level_bytes = util::get_safe_bytes(plugin, &inputs[0], 16)?;
    let message_bytes = util::get_safe_bytes(plugin, &inputs[1], MAX_LOG_MESSAGE_LEN)?;
    let level = String::from_utf8_lossy(&level_bytes).to_lowercase();
    let message = String::from_utf8_lossy(&message_bytes).to_string();

    let ud = user_data.get()?;
    let state = ud
        .lock()
        .map_err(|e| Error::msg(format!("host state lock poisoned: {e}")))?;
    let plugin_id = state.plugin_id.clone();
    drop(state);

    match level.as_str() {
        "trace" => tracing::trace!(plugin = %plugin_id, "{message}"),
        "debug" => tracing::debug!(plugin = %plugin_id, "{message}"),
        "warn" | "warning" => tracing::warn!(plugin = %plugin_id, "{message}"),
        "error" | "err" => tracing::error!(plugin = %plugin_id, "{message}"),
        _ => tracing::info!(plugin = %plugin_id, "{message}"),
    }
    Ok(())
}
