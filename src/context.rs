//! Everything a generator pass gets from its host.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use strongid_symbols::SymbolQuery;

use crate::config::BuildProperties;
use crate::error::{CodegenError, CodegenResult};

/// Host-controlled cancellation signal, checked between syntax units and
/// between referenced modules.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> CodegenResult<()> {
        if self.is_cancelled() {
            Err(CodegenError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The execution context of one generation pass.
pub struct GeneratorContext<'a> {
    pub symbols: &'a dyn SymbolQuery,
    pub properties: &'a BuildProperties,
    pub cancellation: CancellationFlag,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(symbols: &'a dyn SymbolQuery, properties: &'a BuildProperties) -> Self {
        Self {
            symbols,
            properties,
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }
}
