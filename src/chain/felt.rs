//! Felt and uint256 marshaling
//!
//! StarkNet contracts take every argument as a field element. A `uint256`
//! travels as two felts (`low`, `high`) of 128 bits each, and short strings
//! are packed big-endian into a single felt.

use crate::error::{LootError, LootResult};

use alloy_primitives::U256;
use std::fmt;
use std::str::FromStr;

/// StarkNet field prime: 2^251 + 17 * 2^192 + 1
pub const FIELD_PRIME: U256 = U256::from_limbs([1, 0, 0, 0x0800_0000_0000_0011]);

/// Longest short string that fits in a felt
#[cfg(test)]
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// A field element, always below [`FIELD_PRIME`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt(U256);

impl Felt {
    pub const ZERO: Felt = Felt(U256::ZERO);

    /// Wrap a raw value, rejecting anything outside the field
    pub fn new(value: U256) -> LootResult<Self> {
        if value >= FIELD_PRIME {
            return Err(LootError::InvalidFelt {
                value: value.to_string(),
                message: "value is not below the field prime".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Felt {
    type Err = LootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_u256(s).map_err(|message| LootError::InvalidFelt {
            value: s.to_string(),
            message,
        })?;
        Felt::new(value)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A uint256 in its two-felt on-chain form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uint256 {
    pub low: Felt,
    pub high: Felt,
}

impl Uint256 {
    /// Split a 256-bit value into its low and high 128-bit halves
    pub fn from_u256(value: U256) -> Self {
        let mask = U256::from(u128::MAX);
        // Both halves are < 2^128, well inside the field
        Self {
            low: Felt(value & mask),
            high: Felt(value >> 128usize),
        }
    }

    /// Parse a decimal or 0x-prefixed token id
    pub fn parse(text: &str) -> LootResult<Self> {
        parse_u256(text)
            .map(Self::from_u256)
            .map_err(|_| LootError::InvalidTokenId(text.to_string()))
    }

    /// Recombine the halves
    pub fn to_u256(&self) -> U256 {
        (self.high.value() << 128usize) | self.low.value()
    }

    /// Argument-list form: `[low, high]`
    pub fn to_felts(&self) -> [Felt; 2] {
        [self.low, self.high]
    }
}

impl FromStr for Uint256 {
    type Err = LootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_u256())
    }
}

/// Decode a felt holding a packed short string
pub fn felt_to_str(felt: &Felt) -> LootResult<String> {
    if *felt == Felt::ZERO {
        return Ok(String::new());
    }
    let bytes = felt.0.to_be_bytes::<32>();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[start..].to_vec())
        .map_err(|e| LootError::Decode(format!("felt {} is not a UTF-8 string: {}", felt, e)))
}

/// Pack a short string into a felt
#[cfg(test)]
pub fn str_to_felt(text: &str) -> LootResult<Felt> {
    let bytes = text.as_bytes();
    if bytes.len() > MAX_SHORT_STRING_LEN {
        return Err(LootError::Decode(format!(
            "'{}' is longer than {} bytes",
            text, MAX_SHORT_STRING_LEN
        )));
    }
    let value = U256::try_from_be_slice(bytes)
        .ok_or_else(|| LootError::Decode(format!("cannot pack '{}'", text)))?;
    Felt::new(value)
}

fn parse_u256(text: &str) -> Result<U256, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty value".to_string());
    }

    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(text, 10),
    };
    parsed.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_token_id_has_zero_high() {
        let id = Uint256::parse("42").unwrap();
        assert_eq!(id.low, Felt::from(42u128));
        assert_eq!(id.high, Felt::ZERO);
        assert_eq!(id.to_felts(), [Felt::from(42u128), Felt::ZERO]);
    }

    #[test]
    fn test_split_is_reversible() {
        let values = [
            U256::ZERO,
            U256::from(u128::MAX),
            U256::from(u128::MAX) + U256::from(1u8),
            U256::MAX,
            (U256::from(7u8) << 200usize) | U256::from(12345u32),
        ];

        for value in values {
            let split = Uint256::from_u256(value);
            assert_eq!(split.to_u256(), value);
            assert_eq!(Uint256::from_u256(value), split);
            assert!(split.low.value() <= U256::from(u128::MAX));
            assert!(split.high.value() <= U256::from(u128::MAX));
        }
    }

    #[test]
    fn test_split_above_128_bits() {
        let id = Uint256::parse("0x0000000000000000000000000000000300000000000000000000000000000005")
            .unwrap();
        assert_eq!(id.low, Felt::from(5u128));
        assert_eq!(id.high, Felt::from(3u128));
    }

    #[test]
    fn test_invalid_token_id() {
        assert!(matches!(
            Uint256::parse("not-a-number"),
            Err(LootError::InvalidTokenId(_))
        ));
        assert!(Uint256::parse("").is_err());
        assert!(Uint256::parse("-1").is_err());
    }

    #[test]
    fn test_felt_parse_hex_and_decimal() {
        let a: Felt = "0x1f".parse().unwrap();
        let b: Felt = "31".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "31");
        assert_eq!(format!("{:x}", a), "1f");
    }

    #[test]
    fn test_felt_rejects_prime() {
        let prime = FIELD_PRIME.to_string();
        assert!(prime.parse::<Felt>().is_err());

        let below = (FIELD_PRIME - U256::from(1u8)).to_string();
        assert!(below.parse::<Felt>().is_ok());
    }

    #[test]
    fn test_short_string_packing() {
        let felt = str_to_felt("Demon Grasp").unwrap();
        assert_eq!(felt_to_str(&felt).unwrap(), "Demon Grasp");

        // "abc" = 0x616263
        assert_eq!(str_to_felt("abc").unwrap(), Felt::from(0x616263u128));
        assert_eq!(felt_to_str(&Felt::ZERO).unwrap(), "");
    }

    #[test]
    fn test_short_string_too_long() {
        let long = "x".repeat(MAX_SHORT_STRING_LEN + 1);
        assert!(str_to_felt(&long).is_err());
        assert!(str_to_felt(&"x".repeat(MAX_SHORT_STRING_LEN)).is_ok());
    }

    #[test]
    fn test_invalid_utf8_string() {
        assert!(felt_to_str(&Felt::from(0xffu128)).is_err());
    }
}
