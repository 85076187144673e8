//! CPF (national identification number) validation
//!
//! A CPF is 11 digits where the last two are check digits computed with a
//! weighted sum modulo 11 over the preceding digits.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CPF_LEN: usize = 11;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpfError {
    #[error("CPF must contain exactly 11 digits that are not all identical")]
    InvalidFormat,
    #[error("CPF check digits do not match")]
    InvalidChecksum,
}

/// A checksum-valid CPF, stored as its 11 normalized digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cpf([u8; CPF_LEN]);

impl Cpf {
    /// Strip every non-digit character and validate what remains.
    pub fn parse(raw: &str) -> Result<Self, CpfError> {
        let digits: Vec<u8> = raw
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as u8)
            .collect();

        if digits.len() != CPF_LEN || digits.iter().all(|d| *d == digits[0]) {
            return Err(CpfError::InvalidFormat);
        }

        if check_digit(&digits[..9]) != digits[9] || check_digit(&digits[..10]) != digits[10] {
            return Err(CpfError::InvalidChecksum);
        }

        let mut buf = [0u8; CPF_LEN];
        buf.copy_from_slice(&digits);
        Ok(Self(buf))
    }

    /// The bare 11 digits, e.g. `52998224725`
    pub fn digits(&self) -> String {
        self.0.iter().map(|d| char::from(b'0' + d)).collect()
    }
}

/// Check digit over `partial`: weights run from `len + 1` down to 2.
fn check_digit(partial: &[u8]) -> u8 {
    let top = partial.len() as u32 + 1;
    let sum: u32 = partial
        .iter()
        .enumerate()
        .map(|(i, d)| (top - i as u32) * u32::from(*d))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

/// Validate `raw`, with or without the `XXX.XXX.XXX-XX` mask
pub fn validate(raw: &str) -> Result<Cpf, CpfError> {
    Cpf::parse(raw)
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.digits();
        write!(f, "{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

impl FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Cpf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cpf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_formatted_and_bare_input() {
        let formatted = Cpf::parse("529.982.247-25").unwrap();
        let bare = Cpf::parse("52998224725").unwrap();
        assert_eq!(formatted, bare);
        assert_eq!(formatted.digits(), "52998224725");
        assert_eq!(formatted.to_string(), "529.982.247-25");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(Cpf::parse("529.982.247-2"), Err(CpfError::InvalidFormat));
        assert_eq!(Cpf::parse("529982247250"), Err(CpfError::InvalidFormat));
        assert_eq!(Cpf::parse(""), Err(CpfError::InvalidFormat));
    }

    #[test]
    fn test_rejects_repeated_digits() {
        for d in 0..=9 {
            let raw = d.to_string().repeat(11);
            assert_eq!(Cpf::parse(&raw), Err(CpfError::InvalidFormat), "{raw}");
        }
    }

    #[test]
    fn test_rejects_bad_check_digits() {
        assert_eq!(Cpf::parse("529.982.247-35"), Err(CpfError::InvalidChecksum));
        assert_eq!(Cpf::parse("529.982.247-24"), Err(CpfError::InvalidChecksum));
    }

    #[test]
    fn test_check_digit_remainder_below_two_is_zero() {
        // 100.000.001-?: first sum = 10 + 2 = 12, 12 % 11 = 1 -> 0
        assert_eq!(check_digit(&[1, 0, 0, 0, 0, 0, 0, 0, 1]), 0);
    }

    #[test]
    fn test_serde_uses_formatted_form() {
        let cpf = Cpf::parse("52998224725").unwrap();
        let json = serde_json::to_string(&cpf).unwrap();
        assert_eq!(json, "\"529.982.247-25\"");
        let back: Cpf = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cpf);
        assert!(serde_json::from_str::<Cpf>("\"111.111.111-11\"").is_err());
    }
}
