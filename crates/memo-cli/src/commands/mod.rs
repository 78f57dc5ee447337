//! Command implementations.

pub mod bundle;

pub use bundle::execute;
