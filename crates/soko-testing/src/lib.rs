//! Test utilities for Soko services.
//!
//! Provides caller identity headers, the fixture loader and an in-process mock
//! of the mobile-money provider. Use from tests only.

pub mod fixture;
pub mod identity;
pub mod provider;
