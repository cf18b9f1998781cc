//! Shared utilities and common types for the locker rental backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Symmetric encryption of opaque OAuth state tokens
//! - Session JWT issuing/validation and LINE ID token decoding

pub mod crypto;
pub mod jwt;
