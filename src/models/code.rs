use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CODE_LEN: usize = 6;
const CODE_SPACE: u32 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("code must be exactly 6 digits")]
    WrongLength,

    #[error("code must contain only digits 0-9")]
    NonDigit,
}

/// A six-digit handover secret. Stored and compared as text so that leading
/// zeros survive ("017744" never equals "17744").
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandoverCode(String);

impl HandoverCode {
    pub fn parse(raw: &str) -> Result<Self, CodeError> {
        if raw.len() != CODE_LEN {
            return Err(CodeError::WrongLength);
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::NonDigit);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("{:06}", rng.gen_range(0..CODE_SPACE)))
    }

    pub fn generate_pair<R: Rng + ?Sized>(rng: &mut R) -> (Self, Self) {
        let courier = Self::generate(rng);
        loop {
            let customer = Self::generate(rng);
            if customer != courier {
                return (courier, customer);
            }
        }
    }

    pub fn matches(&self, entered: &str) -> bool {
        self.0 == entered
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Secrets stay out of debug output and therefore out of logs.
impl fmt::Debug for HandoverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandoverCode(******)")
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{CodeError, HandoverCode};

    #[test]
    fn parse_keeps_leading_zeros() {
        let code = HandoverCode::parse("017744").unwrap();
        assert_eq!(code.as_str(), "017744");
        assert!(code.matches("017744"));
        assert!(!code.matches("17744"));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(HandoverCode::parse("12345"), Err(CodeError::WrongLength));
        assert_eq!(HandoverCode::parse("1234567"), Err(CodeError::WrongLength));
        assert_eq!(HandoverCode::parse("12a456"), Err(CodeError::NonDigit));
        assert_eq!(HandoverCode::parse("１２３４"), Err(CodeError::WrongLength));
    }

    #[test]
    fn generated_codes_are_six_digits_and_pairs_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let (courier, customer) = HandoverCode::generate_pair(&mut rng);
            assert!(HandoverCode::parse(courier.as_str()).is_ok());
            assert!(HandoverCode::parse(customer.as_str()).is_ok());
            assert_ne!(courier, customer);
        }
    }

    #[test]
    fn debug_output_is_redacted() {
        let code = HandoverCode::parse("482913").unwrap();
        assert!(!format!("{code:?}").contains("482913"));
    }
}
