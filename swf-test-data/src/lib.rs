//! test data shared between the fontswf crates.

pub mod container;
pub mod fonts;
