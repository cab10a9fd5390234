//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use strongid_codegen::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Generators
//!
//! - [`ContextWiringGenerator`]: converters plus persistence-context wiring
//! - [`ValueConverterGenerator`]: converters under the root namespace
//! - [`run_generator`]: runs a generator under fault containment
//!
//! ## Pass Inputs
//!
//! - [`GeneratorContext`]: symbol facade, build properties and cancellation
//! - [`GeneratorConfig`]: marker, context bases, policies
//! - [`BuildProperties`]: global build options such as the root namespace
//!
//! ## Outputs
//!
//! - [`ArtifactSink`], [`MemorySink`], [`DirectorySink`]
//! - [`PassOutcome`]: how a contained pass ended
//!
//! ## Error Handling
//!
//! - [`CodegenError`] and [`CodegenResult`]
//!
//! The symbol facade itself lives in `strongid_symbols` and is imported
//! from there.

// Generators
pub use crate::generator::{ContextWiringGenerator, SourceGenerator, ValueConverterGenerator, run_generator};

// Pass inputs
pub use crate::config::{BuildProperties, GeneratorConfig, StatementOrder, ViolationPolicy};
pub use crate::context::{CancellationFlag, GeneratorContext};

// Outputs
pub use crate::emit::SourceArtifact;
pub use crate::fault::PassOutcome;
pub use crate::sink::{ArtifactSink, DirectorySink, MemorySink};

// Error handling
pub use crate::error::{CodegenError, CodegenResult};
