//! Property-based tests for CPF validation
//!
//! Valid CPFs are generated from nine random digits plus their computed check
//! digits, so every property runs against identifiers the validator must accept.

use contract_signup::{Cpf, CpfError};
use proptest::prelude::*;

fn check_digit(partial: &[u8]) -> u8 {
    let weight_start = partial.len() as u32 + 1;
    let sum: u32 = partial
        .iter()
        .enumerate()
        .map(|(i, d)| (weight_start - i as u32) * u32::from(*d))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

fn valid_cpf_digits() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..10, 9)
        .prop_filter("all identical digits are rejected", |base| {
            base.iter().any(|d| *d != base[0])
        })
        .prop_map(|mut digits| {
            let first = check_digit(&digits);
            digits.push(first);
            let second = check_digit(&digits);
            digits.push(second);
            digits
        })
}

fn render(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn masked(raw: &str) -> String {
    format!("{}.{}.{}-{}", &raw[0..3], &raw[3..6], &raw[6..9], &raw[9..11])
}

proptest! {
    #[test]
    fn test_repeated_digits_never_validate(d in 0u8..10) {
        let raw = render(&[d; 11]);
        prop_assert_eq!(Cpf::parse(&raw), Err(CpfError::InvalidFormat));
        prop_assert_eq!(Cpf::parse(&masked(&raw)), Err(CpfError::InvalidFormat));
    }

    #[test]
    fn test_generated_cpfs_validate_with_and_without_mask(digits in valid_cpf_digits()) {
        let raw = render(&digits);
        let plain = Cpf::parse(&raw).unwrap();
        let formatted = Cpf::parse(&masked(&raw)).unwrap();

        prop_assert_eq!(plain, formatted);
        prop_assert_eq!(plain.digits(), raw.clone());
        prop_assert_eq!(plain.to_string(), masked(&raw));
    }

    #[test]
    fn test_changing_a_check_digit_fails(
        digits in valid_cpf_digits(),
        position in 9usize..11,
        delta in 1u8..10,
    ) {
        let mut mutated = digits.clone();
        mutated[position] = (mutated[position] + delta) % 10;

        prop_assert!(Cpf::parse(&render(&mutated)).is_err());
    }

    #[test]
    fn test_wrong_length_is_a_format_error(len in 0usize..20) {
        prop_assume!(len != 11);
        let raw = "1".repeat(len.saturating_sub(1)) + if len > 0 { "2" } else { "" };
        prop_assert_eq!(Cpf::parse(&raw), Err(CpfError::InvalidFormat));
    }
}

#[test]
fn test_known_valid_cpf() {
    let cpf = Cpf::parse("529.982.247-25").unwrap();
    assert_eq!(cpf.digits(), "52998224725");
    assert!(Cpf::parse("529.982.247-35").is_err());
    assert!(Cpf::parse("529.982.247-24").is_err());
}
