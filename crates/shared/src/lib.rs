//! Catalog wire types and the error taxonomy shared by the client and the gallery app.

pub mod domain;
pub mod error;

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod domain_tests;
