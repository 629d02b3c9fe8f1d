//! Terminal output
//!
//! Commands report through [`Output`], which forwards events to a single UI
//! thread so progress lines and messages never interleave.

pub mod actor;
pub mod output;
pub mod table;
pub mod theme;

pub use output::Output;
