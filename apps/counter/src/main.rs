//! # Shelf Counter Entry Point
//!
//! ```bash
//! shelf-counter add 4006381333931 --qty 12 --loc "Aisle 3"
//! shelf-counter scan --device front
//! shelf-counter export --format xlsx
//! shelf-counter send
//! ```
//!
//! The actual setup is in lib.rs so integration tests can drive commands.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    shelf_counter::run().await
}
