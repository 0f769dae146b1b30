use chrono::{DateTime, TimeZone, Utc};
use ethereum_types::U256;

use crate::errors::RpcError;

pub fn to_u64(hex: &str) -> Result<u64, RpcError> {
    let trimmed = hex.trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16).map_err(|_| RpcError::Malformed(format!("invalid hex u64: {hex}")))
}

/// Stringifies a 256-bit hex quantity into its base-10 decimal
/// representation, the form the store persists as `decimal(78,0)`.
pub fn to_decimal_string(hex: &str) -> Result<String, RpcError> {
    let trimmed = hex.trim_start_matches("0x");
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    let value = U256::from_str_radix(trimmed, 16)
        .map_err(|_| RpcError::Malformed(format!("invalid hex integer: {hex}")))?;
    Ok(value.to_string())
}

pub fn to_timestamp(hex: &str) -> Result<DateTime<Utc>, RpcError> {
    let seconds = to_u64(hex)? as i64;
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| RpcError::Malformed(format!("timestamp out of range: {hex}")))
}

pub fn to_hex_quantity(height: u64) -> String {
    format!("0x{height:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_string_round_trips_small_values() {
        assert_eq!(to_decimal_string("0x1a").unwrap(), "26");
        assert_eq!(to_decimal_string("0x0").unwrap(), "0");
    }

    #[test]
    fn decimal_string_handles_full_width_256_bit_values() {
        let max_hex = format!("0x{}", "f".repeat(64));
        let decimal = to_decimal_string(&max_hex).unwrap();
        assert_eq!(decimal, U256::max_value().to_string());
    }

    #[test]
    fn hex_quantity_round_trips_through_u64() {
        assert_eq!(to_hex_quantity(255), "0xff");
        assert_eq!(to_u64("0xff").unwrap(), 255);
    }
}
