//! Instance loaders.
//!
//! Currently only the OR-Library capacitated warehouse location format
//! (`cap41` .. `cap134`) is supported.

mod orlib;

pub use orlib::{parse_orlib, read_orlib};
