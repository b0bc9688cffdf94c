//! # Validation Module
//!
//! Input validation for count entries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command line (clap)                                          │
//! │  └── Type/shape of arguments                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── barcode required, quantity >= 0                                   │
//! │  └── strict mode: EAN/UPC checksum                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger                                                       │
//! │  └── positions in range                                                │
//! │                                                                         │
//! │  Rejected input is never clamped or corrected                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::barcode;
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a barcode and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - In strict mode, must be a valid EAN-8, UPC-A or EAN-13
/// - Outside strict mode anything else is accepted verbatim
///
/// ## Example
/// ```rust
/// use shelf_core::validation::validate_barcode;
///
/// assert_eq!(validate_barcode(" QR:shelf-7 ", false).unwrap(), "QR:shelf-7");
/// assert!(validate_barcode("", false).is_err());
/// assert!(validate_barcode("4006381333932", true).is_err());
/// ```
pub fn validate_barcode(code: &str, strict: bool) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("barcode"));
    }

    if strict {
        barcode::validate(code).into_result()?;
    }

    Ok(code.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be non-negative (zero is a valid count: "shelf is empty")
pub fn validate_quantity(qty: i64) -> ValidationResult<u64> {
    u64::try_from(qty).map_err(|_| ValidationError::invalid_quantity(qty))
}

/// Parses a quantity typed by the operator.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must be a whole number (no sign other than `-`, no decimals)
/// - Must be non-negative
///
/// ## Example
/// ```rust
/// use shelf_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
/// assert!(parse_quantity("-1").is_err());
/// assert!(parse_quantity("").is_err());
/// assert!(parse_quantity("1.5").is_err());
/// ```
pub fn parse_quantity(raw: &str) -> ValidationResult<u64> {
    let trimmed = raw.trim();
    let qty: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::invalid_quantity(trimmed))?;
    validate_quantity(qty)
}

// =============================================================================
// Unit Tests
// =============================================================================
