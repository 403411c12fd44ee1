//! Domain helpers shared across Soko services.
//!
//! Pure types and functions only, no framework dependencies. Import from
//! `usecase/`, `domain/` and `infra/` wire codecs alike.

pub mod money;
pub mod pagination;
pub mod phone;
