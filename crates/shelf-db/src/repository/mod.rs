//! # Repository Module
//!
//! SQL lives here and nowhere else. Services above this layer talk to the
//! [`StateStore`](crate::store::StateStore) trait.
//!
//! ## Available Repositories
//!
//! - [`StateRepository`](state::StateRepository) - Key/value JSON records

pub mod state;
