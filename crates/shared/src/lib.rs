//! Types shared between the playground client and the mock API.

pub mod domain;
pub mod error;
pub mod protocol;
