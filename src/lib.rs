//! Live commit graph viewer: shared output helpers for the `gitviz` binaries.

pub mod render;
