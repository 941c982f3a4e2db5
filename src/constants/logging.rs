//! Log output configuration.
use std::{env::var, sync::LazyLock};

/// Default filter directive, used when `RUST_LOG` is not set.
pub static LOG_LEVEL: LazyLock<String> =
    LazyLock::new(|| var("LOG_LEVEL").unwrap_or_else(|_| String::from("info")));

/// Emit JSON lines instead of human readable output when `LOG_FORMAT=json`.
pub static LOG_JSON: LazyLock<bool> = LazyLock::new(|| {
    var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"))
});
