//! # Withdrawal Codes
//!
//! Pure rules for the human-readable code printed on every withdrawal.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Material "Cobre"  ──►  tag "COB"                                      │
//! │                                                                         │
//! │   3rd withdrawal of the tag  ──►  sequence 3                            │
//! │                                                                         │
//! │   code = "COB-0003"                                                     │
//! │           ─┬─ ─┬──                                                      │
//! │            │   └── sequence, zero-padded to 4 digits (widens past 9999) │
//! │            └────── first 3 alphanumerics of the name, uppercased        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence itself is allocated by the database layer (it needs a
//! counter); this module only derives tags and formats/parses codes.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::{CODE_SEQUENCE_WIDTH, CODE_TAG_LEN, CODE_TAG_PAD};

/// Derives the three-letter tag for a material name.
///
/// ## Rules
/// - Whitespace and punctuation are skipped (`"Cu wire"` → `"CUW"`)
/// - Letters are uppercased (`"Cobre"` → `"COB"`)
/// - Names with fewer than three usable characters are padded with `X`
///   (`"Fe"` → `"FEX"`)
///
/// ## Example
/// ```rust
/// use veta_core::code::material_tag;
///
/// assert_eq!(material_tag("Cobre"), "COB");
/// assert_eq!(material_tag("Fe"), "FEX");
/// ```
pub fn material_tag(material_name: &str) -> String {
    let mut tag: String = material_name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .take(CODE_TAG_LEN)
        .collect();

    while tag.chars().count() < CODE_TAG_LEN {
        tag.push(CODE_TAG_PAD);
    }

    tag
}

/// A parsed withdrawal code (`TAG-NNNN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WithdrawalCode {
    tag: String,
    sequence: u32,
}

impl WithdrawalCode {
    /// Builds the code for the `sequence`-th withdrawal of a material.
    pub fn new(material_name: &str, sequence: u32) -> Self {
        WithdrawalCode {
            tag: material_tag(material_name),
            sequence,
        }
    }

    /// Builds a code from an already derived tag.
    pub fn from_tag(tag: impl Into<String>, sequence: u32) -> Self {
        WithdrawalCode {
            tag: tag.into(),
            sequence,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for WithdrawalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:0width$}",
            self.tag,
            self.sequence,
            width = CODE_SEQUENCE_WIDTH
        )
    }
}

impl FromStr for WithdrawalCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "expected TAG-NNNN".to_string(),
        };

        let (tag, sequence) = s.split_once('-').ok_or_else(invalid)?;

        if tag.chars().count() != CODE_TAG_LEN || !tag.chars().all(|c| c.is_alphanumeric()) {
            return Err(invalid());
        }
        if sequence.len() < CODE_SEQUENCE_WIDTH || !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let sequence = sequence.parse::<u32>().map_err(|_| invalid())?;

        Ok(WithdrawalCode::from_tag(tag, sequence))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_tag() {
        assert_eq!(material_tag("Cobre"), "COB");
        assert_eq!(material_tag("cobalto"), "COB");
        assert_eq!(material_tag("  Zinc  "), "ZIN");
        assert_eq!(material_tag("Cu wire"), "CUW");
        assert_eq!(material_tag("Ácido"), "ÁCI");
    }

    #[test]
    fn test_short_names_are_padded() {
        assert_eq!(material_tag("Fe"), "FEX");
        assert_eq!(material_tag("Y"), "YXX");
        assert_eq!(material_tag(""), "XXX");
        assert_eq!(material_tag("--"), "XXX");
    }

    #[test]
    fn test_code_format() {
        assert_eq!(WithdrawalCode::new("Cobre", 1).to_string(), "COB-0001");
        assert_eq!(WithdrawalCode::new("Cobre", 42).to_string(), "COB-0042");
        assert_eq!(WithdrawalCode::new("Cobre", 9999).to_string(), "COB-9999");
        assert_eq!(WithdrawalCode::new("Cobre", 10000).to_string(), "COB-10000");
    }

    #[test]
    fn test_code_parse() {
        let code: WithdrawalCode = "COB-0007".parse().unwrap();
        assert_eq!(code.tag(), "COB");
        assert_eq!(code.sequence(), 7);

        assert!("COB0007".parse::<WithdrawalCode>().is_err());
        assert!("CO-0007".parse::<WithdrawalCode>().is_err());
        assert!("COB-07".parse::<WithdrawalCode>().is_err());
        assert!("COB-00x7".parse::<WithdrawalCode>().is_err());
    }

    #[test]
    fn test_sequences_sort_within_tag() {
        let mut codes: Vec<WithdrawalCode> = ["COB-0010", "COB-0002", "COB-0001"]
            .iter()
            .map(|c| c.parse().unwrap())
            .collect();
        codes.sort_by_key(|c| c.sequence());

        let printed: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        assert_eq!(printed, vec!["COB-0001", "COB-0002", "COB-0010"]);
    }
}
