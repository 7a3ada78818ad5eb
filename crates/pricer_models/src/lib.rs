//! # Pricer Models
//!
//! Inputs to the Heston Monte Carlo engine and closed-form references.
//!
//! This crate provides:
//! - Heston model parameters with builder validation
//! - Discrete correlation distributions and categorical sampling
//! - Variance floor policies for the Euler scheme
//! - Black-Scholes formulas for the constant-variance limit
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for the public records

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod models;
