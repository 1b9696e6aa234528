//! DVI Test Generators
//!
//! This module provides utilities for generating test DVI files programmatically.

pub mod invalid_dvis;
pub mod minimal_dvis;
pub mod test_dvi_builder;

pub use test_dvi_builder::{BuiltDvi, Marker, TestDviBuilder, TestFontDef};
