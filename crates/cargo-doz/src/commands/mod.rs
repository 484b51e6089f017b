//! CLI commands

mod bump;

pub use bump::{bump, BumpArgs};

#[cfg(test)]
pub use bump::BumpKind;
