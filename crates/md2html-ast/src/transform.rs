//! Tree transform stages and the per-conversion context they share.
//!
//! A [`Pipeline`] runs an ordered list of [`Stage`]s over a parsed
//! [`Document`] before it is rendered. Stages never fail: a problem with a
//! single node is recorded as a warning on the [`ConversionContext`] and the
//! node is left as it was.

use std::path::{Path, PathBuf};

use crate::document::Document;

/// State for one conversion.
///
/// Built by the caller for every conversion and dropped afterwards. Nothing
/// in here is global, so independent conversions can run concurrently as
/// long as each owns its own context.
#[derive(Clone, Debug, Default)]
pub struct ConversionContext {
    base_dir: PathBuf,
    title: Option<String>,
    embed_images: bool,
    diagrams: bool,
    warnings: Vec<String>,
}

impl ConversionContext {
    /// Create a context resolving local resources against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Supply the title externally. Title extraction is skipped when set.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.offer_title(title);
        self
    }

    /// Inline local images as `data:` URIs.
    #[must_use]
    pub fn with_embed_images(mut self, enabled: bool) -> Self {
        self.embed_images = enabled;
        self
    }

    /// Turn `mermaid` fenced blocks into diagram blocks.
    #[must_use]
    pub fn with_diagrams(mut self, enabled: bool) -> Self {
        self.diagrams = enabled;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }

    /// Set the title unless one is already present.
    ///
    /// Returns `true` if the title was accepted.
    pub fn offer_title(&mut self, title: impl Into<String>) -> bool {
        if self.title.is_some() {
            return false;
        }
        self.title = Some(title.into());
        true
    }

    pub fn embed_images(&self) -> bool {
        self.embed_images
    }

    pub fn diagrams(&self) -> bool {
        self.diagrams
    }

    /// Record a non-fatal problem.
    ///
    /// Callers report collected warnings themselves, so the log event is
    /// only emitted at debug level.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(warning = %message, "Conversion warning");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }
}

/// One tree transformation run before rendering.
pub trait Stage {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Position in the pipeline. Lower values run first.
    fn priority(&self) -> u32;

    /// Whether the stage should run for this conversion.
    fn applies(&self, _ctx: &ConversionContext) -> bool {
        true
    }

    /// Apply the transformation.
    fn transform(&self, doc: &mut Document, ctx: &mut ConversionContext);
}

/// Ordered list of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage + Send + Sync>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage.
    ///
    /// Stages are kept sorted by priority; stages with equal priority keep
    /// their registration order.
    #[must_use]
    pub fn with_stage<S: Stage + Send + Sync + 'static>(mut self, stage: S) -> Self {
        self.add(stage);
        self
    }

    /// Register a stage. See [`with_stage`](Self::with_stage).
    pub fn add<S: Stage + Send + Sync + 'static>(&mut self, stage: S) {
        let priority = stage.priority();
        let index = self
            .stages
            .partition_point(|existing| existing.priority() <= priority);
        self.stages.insert(index, Box::new(stage));
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Run every applicable stage in order.
    pub fn run(&self, doc: &mut Document, ctx: &mut ConversionContext) {
        for stage in &self.stages {
            if stage.applies(ctx) {
                tracing::debug!(stage = stage.name(), "Running stage");
                stage.transform(doc, ctx);
            } else {
                tracing::debug!(stage = stage.name(), "Skipping stage");
            }
        }
    }
}
