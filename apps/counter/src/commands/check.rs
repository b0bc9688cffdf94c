//! `check`: runs the EAN/UPC checksum on one code.

use std::io::Write;

use shelf_core::barcode::{check_digit, validate};
use shelf_core::BarcodeCheck;

use crate::error::{AppError, AppResult};

/// Prints the symbology of a valid code; any other outcome is a
/// validation error naming the failure.
pub fn check(code: &str, out: &mut dyn Write) -> AppResult<()> {
    let code = code.trim();

    match validate(code) {
        BarcodeCheck::Valid(symbology) => {
            writeln!(out, "{}: valid {}", code, symbology)?;
            Ok(())
        }
        BarcodeCheck::ChecksumFailed(symbology) => {
            let digits: Vec<u8> = code.bytes().map(|b| b - b'0').collect();
            let expected = check_digit(&digits[..digits.len() - 1]);
            Err(AppError::validation(format!(
                "{}: checksum failed for {} (expected check digit {})",
                code, symbology, expected
            )))
        }
        failure => Err(AppError::validation(format!("{}: {}", code, failure))),
    }
}
