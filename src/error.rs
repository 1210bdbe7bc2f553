//! # Error Types
//!
//! This module defines the typed error surface of the terrain core.
//!
//! Errors are deliberately chunk-local: a failure while generating or meshing
//! one chunk must never corrupt or block sibling chunks, so everything here
//! is returned up to the world manager, which logs the failure and skips the
//! affected chunk.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors produced while generating or meshing a single chunk.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// Growing a mesh-side buffer failed because the allocator refused the
    /// reservation. Generation of the affected chunk is aborted; the caller
    /// may retry or skip the chunk.
    #[error("out of memory growing the {what} buffer")]
    OutOfMemory {
        /// Which buffer was being grown (`"vertex"`, `"index"` or `"raster"`).
        what: &'static str,
        /// The failed reservation reported by the allocator.
        #[source]
        source: TryReserveError,
    },
}
