//! # strongid_codegen
//!
//! Finds strongly-typed identifier types in a compilation and generates the
//! persistence glue they need: one value converter per identifier and, for
//! each persistence context, an override that registers those converters.
//!
//! ## Pipeline
//!
//! - **Discovery**: identifier types are concrete, non-generic classes
//!   implementing `IStronglyTypedId<T>`, found in the compilation's own
//!   syntax units and in referenced assemblies sharing its name prefix.
//! - **Emission**: converters and context wiring are rendered as C# source.
//! - **Fault containment**: a failing pass emits one diagnostic artifact and
//!   nothing else.
//!
//! ## Quick Start
//!
//! ```rust
//! use strongid_codegen::prelude::*;
//! use strongid_symbols::{InMemoryCompilation, SyntaxUnit, TypeRef, TypeSymbol};
//!
//! let user_id = TypeSymbol::builder()
//!     .namespace("Acme.Domain")
//!     .name("UserId")
//!     .interfaces(vec![TypeRef::new("", "IStronglyTypedId").with_argument(TypeRef::new("System", "Int32"))])
//!     .build();
//! let compilation = InMemoryCompilation::new("Acme.Web")
//!     .with_unit(SyntaxUnit::new("UserId.cs", "IStronglyTypedId<int>").declare(user_id));
//! let properties = BuildProperties::new().with_root_namespace("Acme.Web");
//! let context = GeneratorContext::new(&compilation, &properties);
//!
//! let mut sink = MemorySink::new();
//! let generator = ValueConverterGenerator::new(GeneratorConfig::default());
//! run_generator(&generator, &context, &mut sink)?;
//! assert_eq!(sink.hint_names(), vec!["UserIdValueConverter.g.cs"]);
//! # Ok::<(), CodegenError>(())
//! ```

pub mod config;
pub mod context;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod fault;
pub mod generator;
pub mod matcher;
pub mod prelude;
pub mod sink;

pub use config::{BuildProperties, GeneratorConfig};
pub use context::{CancellationFlag, GeneratorContext};
pub use error::{CodegenError, CodegenResult};
pub use fault::PassOutcome;
pub use generator::{ContextWiringGenerator, SourceGenerator, ValueConverterGenerator, run_generator};
