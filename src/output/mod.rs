pub mod csv;
pub mod format;
pub mod table;

use anyhow::Result;
use serde::Serialize;

/// Pretty JSON for any report or record list.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
