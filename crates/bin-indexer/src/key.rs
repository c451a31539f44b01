//! Time-ordered range keys
//!
//! A [`RangeKey`] is 20 bytes: a 4-byte big-endian count of seconds since
//! [`EPOCH`] followed by 16 random bytes. Its text form is 27 base-62
//! characters, zero-padded, so keys sort lexicographically by creation time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use rand::RngCore;

use crate::error::KeyError;

/// Unix time of timestamp zero (2014-05-13T16:53:20Z)
pub const EPOCH: i64 = 1_400_000_000;

/// Length of the encoded key
pub const ENCODED_LEN: usize = 27;

const TIMESTAMP_LEN: usize = 4;
const PAYLOAD_LEN: usize = 16;
const KEY_LEN: usize = TIMESTAMP_LEN + PAYLOAD_LEN;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeKey([u8; KEY_LEN]);

impl RangeKey {
    /// Fresh key stamped with the current time
    pub fn generate() -> Self {
        let mut payload = [0u8; PAYLOAD_LEN];
        rand::rng().fill_bytes(&mut payload);
        Self::from_parts(Utc::now(), payload)
    }

    /// Key for a given instant; instants outside the 32-bit window saturate
    pub fn from_parts(at: DateTime<Utc>, payload: [u8; PAYLOAD_LEN]) -> Self {
        let offset = (at.timestamp() - EPOCH).clamp(0, i64::from(u32::MAX));
        let seconds = u32::try_from(offset).unwrap_or(u32::MAX);

        let mut bytes = [0u8; KEY_LEN];
        bytes[..TIMESTAMP_LEN].copy_from_slice(&seconds.to_be_bytes());
        bytes[TIMESTAMP_LEN..].copy_from_slice(&payload);
        Self(bytes)
    }

    /// Seconds since [`EPOCH`]
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(EPOCH + i64::from(self.timestamp()), 0)
    }

    pub fn payload(&self) -> &[u8] {
        &self.0[TIMESTAMP_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = BigUint::from_bytes_be(&self.0).to_radix_be(62);
        let encoded: String = digits
            .iter()
            .map(|&d| char::from(ALPHABET[usize::from(d)]))
            .collect();
        write!(f, "{:0>width$}", encoded, width = ENCODED_LEN)
    }
}

impl FromStr for RangeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ENCODED_LEN {
            return Err(KeyError::Length {
                expected: ENCODED_LEN,
                actual: s.len(),
            });
        }

        let digits = s
            .chars()
            .map(|c| match c {
                '0'..='9' => Ok(c as u8 - b'0'),
                'A'..='Z' => Ok(c as u8 - b'A' + 10),
                'a'..='z' => Ok(c as u8 - b'a' + 36),
                other => Err(KeyError::Character(other)),
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let value = BigUint::from_radix_be(&digits, 62).ok_or(KeyError::Overflow)?;
        let raw = value.to_bytes_be();
        if raw.len() > KEY_LEN {
            return Err(KeyError::Overflow);
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes[KEY_LEN - raw.len()..].copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generated_key_is_27_chars() {
        let key = RangeKey::generate().to_string();
        assert_eq!(key.len(), ENCODED_LEN);
        assert!(key.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_zero_key_is_padded() {
        let key = RangeKey::from_parts(DateTime::from_timestamp(EPOCH, 0).unwrap(), [0; 16]);
        assert_eq!(key.to_string(), "0".repeat(ENCODED_LEN));
        assert_eq!(key.timestamp(), 0);
    }

    #[test]
    fn test_max_key_fits() {
        let key = RangeKey([0xff; KEY_LEN]);
        let text = key.to_string();
        assert_eq!(text.len(), ENCODED_LEN);
        assert_eq!(text.parse::<RangeKey>().unwrap(), key);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let key = RangeKey::from_parts(at, [7; 16]);
        assert_eq!(key.timestamp(), 300_000_000);
        assert_eq!(key.created_at(), Some(at));
        assert_eq!(key.payload(), &[7; 16]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "abc".parse::<RangeKey>(),
            Err(KeyError::Length {
                expected: 27,
                actual: 3
            })
        );
        assert_eq!(
            format!("{}-", "0".repeat(26)).parse::<RangeKey>(),
            Err(KeyError::Character('-'))
        );
        assert_eq!("z".repeat(27).parse::<RangeKey>(), Err(KeyError::Overflow));
    }

    proptest! {
        #[test]
        fn prop_text_order_follows_time(
            t1 in 0i64..4_000_000_000,
            t2 in 0i64..4_000_000_000,
            p1 in any::<[u8; 16]>(),
            p2 in any::<[u8; 16]>(),
        ) {
            prop_assume!(t1 < t2);
            let a = RangeKey::from_parts(DateTime::from_timestamp(EPOCH + t1, 0).unwrap(), p1);
            let b = RangeKey::from_parts(DateTime::from_timestamp(EPOCH + t2, 0).unwrap(), p2);
            prop_assert!(a.to_string() < b.to_string());
        }

        #[test]
        fn prop_parse_display_roundtrip(bytes in any::<[u8; 20]>()) {
            let key = RangeKey(bytes);
            prop_assert_eq!(key.to_string().parse::<RangeKey>().unwrap(), key);
        }
    }
}
