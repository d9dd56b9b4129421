//! Human readable sizes (`10m`, `512k`) to byte counts.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid size: {0:?}")]
pub struct InvalidSize(pub String);

/// Convert a size with an optional binary `k`, `m` or `g` suffix into bytes.
///
/// An empty string means "unset" and converts to 0.
pub fn size_suffix_to_int64(size: &str) -> Result<i64, InvalidSize> {
    if size.is_empty() {
        return Ok(0);
    }
    if let Ok(value) = size.parse::<i64>() {
        return Ok(value);
    }

    let invalid = || InvalidSize(size.to_string());
    let Some((split, suffix)) = size.char_indices().last() else {
        return Err(invalid());
    };
    let multiplier: i64 = match suffix {
        'k' | 'K' => 1024,
        'm' | 'M' => 1024 * 1024,
        'g' | 'G' => 1024 * 1024 * 1024,
        _ => return Err(invalid()),
    };
    let number = &size[..split];
    let value = number.parse::<i64>().map_err(|_| invalid())?;
    value.checked_mul(multiplier).ok_or_else(invalid)
}
