//! # Barcode Check-Digit Validation
//!
//! Verifies the trailing check digit of EAN-8, UPC-A and EAN-13 codes.
//!
//! ## Check-Digit Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EAN-13:  4  0  0  6  3  8  1  3  3  3  9  3 │ 1                        │
//! │  weight:  1  3  1  3  1  3  1  3  1  3  1  3 │ (check)                  │
//! │                                                                         │
//! │  UPC-A:   0  1  2  3  4  5  6  7  8  9  0 │ 5                           │
//! │  weight:  3  1  3  1  3  1  3  1  3  1  3 │ (check)                     │
//! │                                                                         │
//! │  EAN-8:   9  6  3  8  5  0  7 │ 4                                       │
//! │  weight:  3  1  3  1  3  1  3 │ (check)                                 │
//! │                                                                         │
//! │  check == (10 - (Σ digit × weight) mod 10) mod 10                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All three layouts are the same GS1 rule read from the right: the data
//! digit next to the check digit weighs 3, then weights alternate 1, 3, ...
//! toward the left. [`check_digit`] implements it that way.
//!
//! Validation only runs in strict mode. Outside strict mode any non-empty
//! string (QR payloads, Code 128, ...) is accepted verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

// =============================================================================
// Symbology
// =============================================================================

/// Retail symbologies with a decimal check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    /// 8 digits (7 data + check).
    Ean8,
    /// 12 digits (11 data + check).
    UpcA,
    /// 13 digits (12 data + check).
    Ean13,
}

impl Symbology {
    /// Identifies the symbology from the total code length.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            8 => Some(Symbology::Ean8),
            12 => Some(Symbology::UpcA),
            13 => Some(Symbology::Ean13),
            _ => None,
        }
    }

    /// Total number of digits, check digit included.
    pub const fn digit_count(&self) -> usize {
        match self {
            Symbology::Ean8 => 8,
            Symbology::UpcA => 12,
            Symbology::Ean13 => 13,
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::Ean8 => write!(f, "EAN-8"),
            Symbology::UpcA => write!(f, "UPC-A"),
            Symbology::Ean13 => write!(f, "EAN-13"),
        }
    }
}

// =============================================================================
// Validation Result
// =============================================================================

/// Outcome of [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeCheck {
    /// Check digit matches.
    Valid(Symbology),
    /// The code contains a non-digit character (or is empty).
    WrongFormat,
    /// Length is not 8, 12 or 13.
    WrongLength(usize),
    /// Check digit does not match.
    ChecksumFailed(Symbology),
}

impl BarcodeCheck {
    /// Converts the outcome into the strict-mode validation error.
    pub fn into_result(self) -> Result<Symbology, ValidationError> {
        match self {
            BarcodeCheck::Valid(symbology) => Ok(symbology),
            BarcodeCheck::WrongFormat => Err(ValidationError::NotNumeric),
            BarcodeCheck::WrongLength(len) => Err(ValidationError::UnsupportedLength { len }),
            BarcodeCheck::ChecksumFailed(symbology) => {
                Err(ValidationError::ChecksumFailed { symbology })
            }
        }
    }
}

impl fmt::Display for BarcodeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarcodeCheck::Valid(symbology) => write!(f, "valid {}", symbology),
            BarcodeCheck::WrongFormat => write!(f, "wrong format (non-digit characters)"),
            BarcodeCheck::WrongLength(len) => write!(f, "wrong length ({} digits)", len),
            BarcodeCheck::ChecksumFailed(symbology) => {
                write!(f, "checksum failed ({})", symbology)
            }
        }
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Validates a retail barcode.
///
/// ## Order of Checks
/// 1. Every character must be an ASCII digit → otherwise `WrongFormat`
/// 2. Length must be 8, 12 or 13 → otherwise `WrongLength`
/// 3. Trailing digit must equal the computed check digit → otherwise
///    `ChecksumFailed`
///
/// ## Example
/// ```rust
/// use shelf_core::barcode::{validate, BarcodeCheck, Symbology};
///
/// assert_eq!(validate("012345678905"), BarcodeCheck::Valid(Symbology::UpcA));
/// assert_eq!(validate("96385074"), BarcodeCheck::Valid(Symbology::Ean8));
/// assert_eq!(validate("123456"), BarcodeCheck::WrongLength(6));
/// ```
pub fn validate(code: &str) -> BarcodeCheck {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return BarcodeCheck::WrongFormat;
    }

    let Some(symbology) = Symbology::from_len(code.len()) else {
        return BarcodeCheck::WrongLength(code.len());
    };

    let digits: Vec<u8> = code.bytes().map(|b| b - b'0').collect();
    let (data, check) = digits.split_at(digits.len() - 1);

    if check_digit(data) == check[0] {
        BarcodeCheck::Valid(symbology)
    } else {
        BarcodeCheck::ChecksumFailed(symbology)
    }
}

/// Computes the GS1 check digit for the given data digits (values 0-9).
///
/// Weights are anchored at the right end: the last data digit weighs 3.
pub fn check_digit(data: &[u8]) -> u8 {
    let sum: u32 = data
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();

    ((10 - (sum % 10)) % 10) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================
