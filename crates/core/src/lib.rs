//! Core business logic for tribune.
//!
//! The live coverage engine lives in [`services::live_coverage`]; the other
//! services back the newsroom's articles, election dashboards, site alerts,
//! team applications and staff accounts.

pub mod services;
pub mod slug;

pub use services::*;
