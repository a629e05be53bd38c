//! Authorization policy.

pub mod rules;
