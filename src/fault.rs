//! Fault containment around generator passes.
//!
//! [`contain`] is the only place failures are caught. The pass stages its
//! artifacts; if it returns an error or panics, the staged set is dropped and
//! one diagnostic artifact describing the failure goes to the sink instead.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error, warn};

use crate::emit::{AUTO_GENERATED_HEADER, SourceArtifact};
use crate::error::{CodegenError, CodegenResult};
use crate::sink::{ArtifactSink, StagedArtifacts};

/// Separates the outer failure from its cause in a diagnostic.
pub const INNER_FAILURE_BANNER: &str = "======InnerException========";

const NO_STACK: &str = "(no stack captured)";

/// Heads the outer stack. The stack is taken where the failure is caught,
/// after unwinding, so it shows the path into the pass and not the frame
/// that failed.
pub const CONTAINMENT_STACK_LABEL: &str = "Stack at containment boundary:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerFailure {
    pub message: String,
    pub stack: String,
}

/// A contained failure, ready to be rendered as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub message: String,
    /// Backtrace captured by [`contain`], not at the failure site
    pub stack: String,
    pub inner: Option<InnerFailure>,
}

impl FailureReport {
    pub fn from_error(err: anyhow::Error) -> Self {
        let stack = match err.backtrace().status() {
            BacktraceStatus::Captured => err.backtrace().to_string(),
            _ => Backtrace::force_capture().to_string(),
        };
        let inner = err.chain().nth(1).map(|cause| InnerFailure {
            message: cause.to_string(),
            stack: NO_STACK.to_string(),
        });

        Self {
            message: err.to_string(),
            stack,
            inner,
        }
    }

    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            format!("generator panicked: {message}")
        } else if let Some(message) = payload.downcast_ref::<String>() {
            format!("generator panicked: {message}")
        } else {
            "generator panicked".to_string()
        };

        Self {
            message,
            stack: Backtrace::force_capture().to_string(),
            inner: None,
        }
    }

    /// The report as a C# comment block.
    pub fn render(&self) -> String {
        let mut body = String::new();
        body.push_str(&self.message);
        body.push('\n');
        if !self.stack.trim().is_empty() {
            body.push_str(CONTAINMENT_STACK_LABEL);
            body.push('\n');
        }
        body.push_str(non_empty(&self.stack));
        if let Some(inner) = &self.inner {
            body.push('\n');
            body.push_str(INNER_FAILURE_BANNER);
            body.push('\n');
            body.push_str(&inner.message);
            body.push('\n');
            body.push_str(non_empty(&inner.stack));
        }

        format!(
            "{AUTO_GENERATED_HEADER}\n/*\n{}\n*/\n",
            body.trim_end().replace("*/", "* /")
        )
    }

    pub fn to_source(&self, hint_name: &str) -> SourceArtifact {
        SourceArtifact::new(hint_name, self.render())
    }
}

fn non_empty(stack: &str) -> &str {
    if stack.trim().is_empty() { NO_STACK } else { stack }
}

/// How a contained pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed { artifacts: usize },
    /// Stopped by the host; artifacts staged before the stop were committed
    Cancelled { artifacts: usize },
    Failed(FailureReport),
}

impl PassOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PassOutcome::Failed(_))
    }
}

/// Runs `pass` under fault containment.
///
/// Sink errors while committing are returned to the caller: they happen
/// after the pass and belong to the host.
pub fn contain<F>(diagnostic_hint: &str, sink: &mut dyn ArtifactSink, pass: F) -> CodegenResult<PassOutcome>
where
    F: FnOnce(&mut StagedArtifacts) -> CodegenResult<()>,
{
    let mut staged = StagedArtifacts::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| pass(&mut staged)));

    let report = match result {
        Ok(Ok(())) => {
            let artifacts = staged.commit(sink)?;
            return Ok(PassOutcome::Completed { artifacts });
        }
        Ok(Err(CodegenError::Cancelled)) => {
            warn!("Fault: pass cancelled, committing {} staged artifacts", staged.len());
            let artifacts = staged.commit(sink)?;
            return Ok(PassOutcome::Cancelled { artifacts });
        }
        Ok(Err(err)) => FailureReport::from_error(anyhow::Error::from(err)),
        Err(payload) => FailureReport::from_panic(payload),
    };

    error!("Fault: {} ({} staged artifacts discarded)", report.message, staged.len());
    drop(staged);
    sink.add_source(report.to_source(diagnostic_hint))?;
    debug!("Fault: emitted {diagnostic_hint}");
    Ok(PassOutcome::Failed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use assert_matches::assert_matches;
    use std::io;

    const HINT: &str = "TestGeneratorError.g.cs";

    #[test]
    fn test_success_commits_staged() {
        let mut sink = MemorySink::new();
        let outcome = contain(HINT, &mut sink, |staged| {
            staged.stage(SourceArtifact::new("A.g.cs", "a"))?;
            staged.stage(SourceArtifact::new("B.g.cs", "b"))
        })
        .unwrap();

        assert_eq!(outcome, PassOutcome::Completed { artifacts: 2 });
        assert_eq!(sink.hint_names(), vec!["A.g.cs", "B.g.cs"]);
    }

    #[test]
    fn test_error_discards_staged_and_emits_one_diagnostic() {
        let mut sink = MemorySink::new();
        let outcome = contain(HINT, &mut sink, |staged| {
            staged.stage(SourceArtifact::new("A.g.cs", "a"))?;
            Err(CodegenError::Configuration("boom".to_string()))
        })
        .unwrap();

        assert!(outcome.is_failed());
        assert_eq!(sink.hint_names(), vec![HINT]);
        let text = &sink.get(HINT).unwrap().text;
        assert!(text.starts_with("// <auto-generated/>\n/*\n"));
        assert!(text.contains("Configuration error: boom"));
        assert!(!text.contains(INNER_FAILURE_BANNER));
    }

    #[test]
    fn test_inner_failure_gets_banner() {
        let mut sink = MemorySink::new();
        let outcome = contain(HINT, &mut sink, |_| {
            Err(CodegenError::Io(io::Error::new(io::ErrorKind::NotFound, "disk gone")))
        })
        .unwrap();

        let PassOutcome::Failed(report) = outcome else {
            panic!("expected a failed pass");
        };
        assert_eq!(report.inner.as_ref().unwrap().message, "disk gone");

        let text = &sink.get(HINT).unwrap().text;
        let banner = text.find(INNER_FAILURE_BANNER).unwrap();
        assert!(text.find("IO Error: disk gone").unwrap() < banner);
        assert!(text[banner..].contains("disk gone"));
    }

    #[test]
    fn test_panic_is_contained() {
        let mut sink = MemorySink::new();
        let outcome = contain(HINT, &mut sink, |staged| {
            staged.stage(SourceArtifact::new("A.g.cs", "a"))?;
            panic!("index out of range");
        })
        .unwrap();

        assert_matches!(outcome, PassOutcome::Failed(report) if report.message.contains("index out of range"));
        assert_eq!(sink.len(), 1);
        assert!(sink.get("A.g.cs").is_none());
    }

    #[test]
    fn test_cancellation_commits_staged() {
        let mut sink = MemorySink::new();
        let outcome = contain(HINT, &mut sink, |staged| {
            staged.stage(SourceArtifact::new("A.g.cs", "a"))?;
            Err(CodegenError::Cancelled)
        })
        .unwrap();

        assert_eq!(outcome, PassOutcome::Cancelled { artifacts: 1 });
        assert_eq!(sink.hint_names(), vec!["A.g.cs"]);
    }

    #[test]
    fn test_render_escapes_comment_terminator() {
        let report = FailureReport {
            message: "bad */ input".to_string(),
            stack: String::new(),
            inner: None,
        };
        let text = report.render();
        assert_eq!(text.matches("*/").count(), 1);
        assert!(text.contains("(no stack captured)"));
        assert!(!text.contains(CONTAINMENT_STACK_LABEL));
    }

    #[test]
    fn test_render_labels_boundary_stack() {
        let report = FailureReport {
            message: "boom".to_string(),
            stack: "0: strongid_codegen::fault::contain".to_string(),
            inner: None,
        };
        assert_eq!(
            report.render(),
            "// <auto-generated/>\n/*\nboom\nStack at containment boundary:\n0: strongid_codegen::fault::contain\n*/\n"
        );
    }
}
