//! # shelf-core: Pure Logic for Shelf Counter
//!
//! This crate is the **heart** of Shelf Counter. It contains the barcode
//! validation path and the inventory ledger as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shelf Counter Architecture                         │
//! │                                                                         │
//! │  ┌───────────────────┐                  ┌───────────────────┐          │
//! │  │  shelf-scan       │  decoded codes   │  apps/counter     │          │
//! │  │  Scanner Engine   │ ───────────────► │  commands         │          │
//! │  └─────────┬─────────┘                  └─────────┬─────────┘          │
//! │            │ Debouncer                            │ append/update/...  │
//! │  ┌─────────▼──────────────────────────────────────▼────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │ barcode  │  │ debounce │  │  ledger  │  │  export  │       │   │
//! │  │   │ EAN/UPC  │  │ 1500 ms  │  │ entries  │  │ csv/xlsx │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shelf-db (write-through persistence)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Data model (CountEntry, Preferences, ExportRow, ...)
//! - [`barcode`] - EAN-8 / UPC-A / EAN-13 check-digit validation
//! - [`debounce`] - Duplicate-scan suppression
//! - [`ledger`] - Ordered, in-memory list of count entries
//! - [`export`] - CSV and xlsx encodings of export rows
//! - [`validation`] - Input validation (quantity, required fields)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shelf_core::barcode::{validate, BarcodeCheck, Symbology};
//!
//! assert_eq!(validate("4006381333931"), BarcodeCheck::Valid(Symbology::Ean13));
//! assert_eq!(validate("12a456"), BarcodeCheck::WrongFormat);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod debounce;
pub mod error;
pub mod export;
pub mod ledger;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use barcode::{BarcodeCheck, Symbology};
pub use debounce::Debouncer;
pub use error::{CoreError, CoreResult, ValidationError};
pub use export::ExportFormat;
pub use ledger::Ledger;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Window during which a repeated read of the same code is suppressed.
pub const DEBOUNCE_WINDOW_MS: i64 = 1500;

/// Storage key of the persisted ledger record.
///
/// ## Versioning
/// Keys carry a version suffix. Bumping the suffix starts from an empty
/// record; there is no migration between versions.
pub const LEDGER_STORAGE_KEY: &str = "shelf_counter_rows_v2";

/// Storage key of the persisted preferences record.
pub const PREFS_STORAGE_KEY: &str = "shelf_counter_prefs_v2";
