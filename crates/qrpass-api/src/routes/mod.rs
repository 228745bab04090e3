//! # API Route Modules
//!
//! - `reserve` — provider reservation tokens (unauthenticated).
//! - `qr` — QR pass generation and scan verification.
//! - `history` — scan history for the authenticated provider.

pub mod history;
pub mod qr;
pub mod reserve;
