//! Dispatcher: routes each input kind through its technique chain.

use crate::ansi::AnsiStripper;
use crate::build::BuildAggregator;
use crate::git::GitCompactor;
use crate::lint::LintAggregator;
use crate::search::SearchGrouper;
use crate::smart_truncate::SmartTruncator;
use crate::source_filter::SourceFilter;
use crate::technique::Technique;
use crate::test_output::TestAggregator;
use crate::truncate::OutputTruncator;
use oc_core::{InputKind, MetricsRecord, MetricsSink, Session, TechniqueKind};
use std::sync::Arc;

/// Result of one dispatcher call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    /// Techniques that replaced the text, in application order.
    pub applied: Vec<TechniqueKind>,
    pub original_chars: usize,
    pub compacted_chars: usize,
}

impl Outcome {
    fn unchanged(text: &str) -> Self {
        let chars = text.chars().count();
        Self { text: text.to_string(), applied: Vec::new(), original_chars: chars, compacted_chars: chars }
    }

    pub fn saved_chars(&self) -> usize {
        self.original_chars.saturating_sub(self.compacted_chars)
    }

    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Compaction engine. Stateless apart from the optional metrics sink, which
/// the caller owns.
#[derive(Clone, Default)]
pub struct Engine {
    sink: Option<Arc<dyn MetricsSink>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("has_sink", &self.sink.is_some()).finish()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// ANSI strip → build → test → git → linter → length truncation.
    pub fn process_command_output(&self, session: &Session, text: &str, command: Option<&str>) -> Outcome {
        let config = session.config();
        let chain: [Box<dyn Technique>; 6] = [
            Box::new(AnsiStripper),
            Box::new(BuildAggregator),
            Box::new(TestAggregator),
            Box::new(GitCompactor::new(config.git.clone())),
            Box::new(LintAggregator),
            Box::new(OutputTruncator::new(config.truncation.max_chars)),
        ];
        let label = command.unwrap_or("command");
        self.dispatch(session, InputKind::CommandOutput, label, &chain, text, command)
    }

    /// Source filter at the configured level, then smart truncation to the
    /// line budget.
    pub fn process_file(&self, session: &Session, text: &str, path: &str) -> Outcome {
        let source = &session.config().source;
        let chain: [Box<dyn Technique>; 2] = [
            Box::new(SourceFilter::new(path, source.level)),
            Box::new(SmartTruncator::for_path(source.max_lines, path)),
        ];
        self.dispatch(session, InputKind::FileRead, path, &chain, text, None)
    }

    pub fn process_search(&self, session: &Session, text: &str, command: Option<&str>) -> Outcome {
        let chain: [Box<dyn Technique>; 1] = [Box::new(SearchGrouper::new(session.config().search.clone()))];
        let label = command.unwrap_or("search");
        self.dispatch(session, InputKind::SearchResult, label, &chain, text, command)
    }

    fn dispatch(
        &self,
        session: &Session,
        input: InputKind,
        label: &str,
        chain: &[Box<dyn Technique>],
        text: &str,
        command: Option<&str>,
    ) -> Outcome {
        let mut outcome = Outcome::unchanged(text);
        if !session.is_enabled() {
            return outcome;
        }

        for technique in chain {
            let kind = technique.kind();
            if !session.allows(kind) {
                continue;
            }
            match technique.apply(&outcome.text, command) {
                Some(compacted) if compacted != outcome.text => {
                    tracing::debug!(
                        technique = %kind,
                        before = outcome.text.len(),
                        after = compacted.len(),
                        "technique applied"
                    );
                    outcome.text = compacted;
                    outcome.applied.push(kind);
                }
                _ => tracing::trace!(technique = %kind, "not applicable"),
            }
        }
        outcome.compacted_chars = outcome.text.chars().count();

        if let Some(sink) = &self.sink {
            sink.append(MetricsRecord::new(
                input,
                label,
                outcome.applied.clone(),
                outcome.original_chars,
                outcome.compacted_chars,
            ));
        }
        outcome
    }
}
