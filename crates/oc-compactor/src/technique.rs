use oc_core::TechniqueKind;

/// A self-contained compaction transform.
pub trait Technique: Send + Sync {
    fn kind(&self) -> TechniqueKind;

    /// Compact `text`, or `None` when the technique does not apply and the
    /// input should be left alone.
    fn apply(&self, text: &str, command: Option<&str>) -> Option<String>;
}
