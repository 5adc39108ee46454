//! # Composition Engine
//!
//! The composition engine coordinates image sequencing, audio mixing and
//! encoding to produce one finished video per request.

pub mod engine;
pub mod request;
pub mod scratch;

// Re-exports for convenience
pub use engine::{CompositionEngine, FinalArtifact};
pub use request::{AudioSource, CompositionRequest};
pub use scratch::{OutputGuard, ScratchSpace};
