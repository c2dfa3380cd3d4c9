//! Infrastructure layer: storage adapters for accounts, tokens and feed items.

pub mod store;

#[cfg(test)]
mod integration_tests;
