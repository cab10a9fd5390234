//! Generator entry points.
//!
//! Two generators share discovery and differ in what they emit:
//!
//! * [`ContextWiringGenerator`] wires every identifier into each persistence
//!   context it finds, and emits the converters those registrations point at
//!   (next to each identifier).
//! * [`ValueConverterGenerator`] emits one converter per identifier under the
//!   project's root namespace and needs no context at all.
//!
//! Both do nothing when the build does not define a root namespace. Run
//! them through [`run_generator`] so failures become a diagnostic artifact.

use log::{debug, warn};
use strongid_symbols::SyntaxUnitId;

use crate::config::{GeneratorConfig, ViolationPolicy};
use crate::context::GeneratorContext;
use crate::discovery::{DiscoveryEngine, IdentifierSet};
use crate::emit::{
    IdentifierNamespaceStrategy, RootNamespaceStrategy, WiringArtifact, classify_context, emit_wiring,
    synthesize_converter,
};
use crate::error::{CodegenError, CodegenResult};
use crate::fault::{self, PassOutcome};
use crate::matcher::MarkerMatcher;
use crate::sink::{ArtifactSink, StagedArtifacts};

pub const WIRING_DIAGNOSTIC_HINT: &str = "AppDbContextBaseSourceGeneratorError.g.cs";
pub const CONVERTER_DIAGNOSTIC_HINT: &str = "ValueConverterSourceGeneratorError.g.cs";

/// A generation pass over one compilation.
pub trait SourceGenerator {
    fn name(&self) -> &'static str;

    /// Hint name of the artifact emitted when the pass fails.
    fn diagnostic_hint(&self) -> &'static str;

    fn execute(&self, context: &GeneratorContext<'_>, staged: &mut StagedArtifacts) -> CodegenResult<()>;
}

/// Runs `generator` under fault containment, committing to `sink`.
pub fn run_generator(
    generator: &dyn SourceGenerator,
    context: &GeneratorContext<'_>,
    sink: &mut dyn ArtifactSink,
) -> CodegenResult<PassOutcome> {
    debug!("Generator: starting {}", generator.name());
    let outcome = fault::contain(generator.diagnostic_hint(), sink, |staged| {
        generator.execute(context, staged)
    })?;
    debug!("Generator: {} finished with {}", generator.name(), outcome_label(&outcome));
    Ok(outcome)
}

fn outcome_label(outcome: &PassOutcome) -> String {
    match outcome {
        PassOutcome::Completed { artifacts } => format!("{artifacts} artifacts"),
        PassOutcome::Cancelled { artifacts } => format!("cancellation after {artifacts} artifacts"),
        PassOutcome::Failed(_) => "a contained failure".to_string(),
    }
}

fn discover(context: &GeneratorContext<'_>, config: &GeneratorConfig) -> CodegenResult<IdentifierSet> {
    let matcher = MarkerMatcher::from_config(config);
    DiscoveryEngine::new(context, &matcher, &config.marker_token).discover()
}

#[derive(Debug, Clone, Default)]
pub struct ContextWiringGenerator {
    config: GeneratorConfig,
}

impl ContextWiringGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn mentions_context_base(&self, context: &GeneratorContext<'_>, unit: SyntaxUnitId) -> bool {
        match context.symbols.unit_text(unit) {
            Some(text) => self.config.context_bases.iter().any(|base| {
                let name: &str = base.as_ref();
                text.contains(name)
            }),
            None => true,
        }
    }

    /// Scans syntax units for contexts. Wiring of every fully scanned unit
    /// lands in `wired`; discovery runs the first time a context is found.
    fn scan(
        &self,
        context: &GeneratorContext<'_>,
        ids: &mut Option<IdentifierSet>,
        wired: &mut Vec<WiringArtifact>,
    ) -> CodegenResult<()> {
        for unit in context.symbols.syntax_units() {
            context.cancellation.check()?;
            if !self.mentions_context_base(context, unit) {
                continue;
            }

            let mut unit_wiring = Vec::new();
            for declaration in context.symbols.type_declarations(unit)? {
                let Some(symbol) = context.symbols.declared_symbol(declaration)? else {
                    continue;
                };
                let type_name = symbol.qualified_name();

                let context_type = match classify_context(symbol, &self.config) {
                    Ok(context_type) => context_type,
                    Err(violation) => match self.config.violation_policy {
                        ViolationPolicy::SkipDeclaration => {
                            debug!("Wiring: skipping {type_name} in {unit}: {violation}");
                            continue;
                        }
                        ViolationPolicy::AbortUnit => {
                            warn!("Wiring: abandoning {unit} at {type_name}: {violation}");
                            unit_wiring.clear();
                            break;
                        }
                        ViolationPolicy::AbortPass => {
                            warn!("Wiring: ending pass at {type_name} in {unit}: {violation}");
                            return Ok(());
                        }
                    },
                };

                if ids.is_none() {
                    *ids = Some(discover(context, &self.config)?);
                }
                let ordered = ids
                    .as_ref()
                    .map(|known| known.ordered(self.config.statement_order))
                    .unwrap_or_default();
                unit_wiring.push(emit_wiring(&context_type, &ordered, &IdentifierNamespaceStrategy));
            }
            wired.extend(unit_wiring);
        }
        Ok(())
    }

    /// Stages converters, then wiring. Converters are staged once per pass
    /// and only when at least one context was wired.
    fn stage(
        &self,
        ids: Option<IdentifierSet>,
        wired: Vec<WiringArtifact>,
        staged: &mut StagedArtifacts,
    ) -> CodegenResult<()> {
        if wired.is_empty() {
            return Ok(());
        }

        let matcher = MarkerMatcher::from_config(&self.config);
        if let Some(ids) = ids {
            for id in ids.ordered(self.config.statement_order) {
                let converter = synthesize_converter(
                    id,
                    &matcher,
                    &self.config.value_member,
                    &IdentifierNamespaceStrategy,
                )?;
                staged.stage(converter.to_source())?;
            }
        }
        for wiring in wired {
            staged.stage(wiring.to_source())?;
        }
        Ok(())
    }
}

impl SourceGenerator for ContextWiringGenerator {
    fn name(&self) -> &'static str {
        "context-wiring"
    }

    fn diagnostic_hint(&self) -> &'static str {
        WIRING_DIAGNOSTIC_HINT
    }

    fn execute(&self, context: &GeneratorContext<'_>, staged: &mut StagedArtifacts) -> CodegenResult<()> {
        if context.properties.root_namespace().is_none() {
            debug!("Wiring: no root namespace, nothing to generate");
            return Ok(());
        }

        let mut ids = None;
        let mut wired = Vec::new();
        match self.scan(context, &mut ids, &mut wired) {
            Ok(()) => self.stage(ids, wired, staged),
            Err(CodegenError::Cancelled) => {
                self.stage(ids, wired, staged)?;
                Err(CodegenError::Cancelled)
            }
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueConverterGenerator {
    config: GeneratorConfig,
}

impl ValueConverterGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl SourceGenerator for ValueConverterGenerator {
    fn name(&self) -> &'static str {
        "value-converter"
    }

    fn diagnostic_hint(&self) -> &'static str {
        CONVERTER_DIAGNOSTIC_HINT
    }

    fn execute(&self, context: &GeneratorContext<'_>, staged: &mut StagedArtifacts) -> CodegenResult<()> {
        let Some(root) = context.properties.root_namespace() else {
            debug!("Converters: no root namespace, nothing to generate");
            return Ok(());
        };

        let ids = discover(context, &self.config)?;
        let matcher = MarkerMatcher::from_config(&self.config);
        let strategy = RootNamespaceStrategy::new(root).disambiguating(ids.iter().map(|id| id.symbol()));
        for id in ids.ordered(self.config.statement_order) {
            let converter = synthesize_converter(id, &matcher, &self.config.value_member, &strategy)?;
            staged.stage(converter.to_source())?;
        }
        debug!("Converters: staged {} converters under {root}", ids.len());
        Ok(())
    }
}
