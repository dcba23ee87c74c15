//! Infrastructure layer for file I/O.
//!
//! Native JSON workbooks and CSV exchange both live here; the engine itself
//! never touches the filesystem.

pub mod persistence;

pub use persistence::*;
