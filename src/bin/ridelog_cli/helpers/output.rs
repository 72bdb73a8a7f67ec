// ABOUTME: Output formatting helpers for ridelog-cli
// ABOUTME: Pretty-printed JSON on stdout; logs stay on stderr

use ridelog::errors::AppResult;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
