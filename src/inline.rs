//! `@import` inlining.
//!
//! A directive is a line of the form `@import "path"` or `@import 'path'`,
//! optionally indented. Each one is replaced by the referenced file's
//! content, and directives inside that content are expanded in turn.
//!
//! Expansion runs over an explicit stack of frames, one per file being
//! expanded, all writing into a single output buffer. A frame only ever
//! scans its own source from its cursor onwards, so emitted text is never
//! rescanned.

use crate::{
    errors::{Error, Result},
    path,
    reader::{AllowList, FileSource, SafeReader, TokioFs},
};
use regex::Regex;
use serde::Serialize;
use std::{
    fmt,
    sync::{Arc, Mutex, OnceLock},
};
use tracing::{debug, info};

pub const DEFAULT_MAX_DEPTH: usize = 32;

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^[ \t]*@import[ \t]+(?:"([^"']+)"|'([^"']+)')"#)
            .expect("directive pattern compiles")
    })
}

/// A directive located in a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    start: usize,
    end: usize,
    reference: String,
}

fn find_directive(text: &str, from: usize) -> Option<Directive> {
    let caps = directive_regex().captures_at(text, from)?;
    let whole = caps.get(0)?;
    let reference = caps.get(1).or_else(|| caps.get(2))?;
    Some(Directive {
        start: whole.start(),
        end: whole.end(),
        reference: reference.as_str().to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportWarning {
    /// Path literal as written in the directive.
    pub reference: String,
    /// Where that literal resolved to.
    pub resolved: String,
    pub code: &'static str,
    pub message: String,
}

impl ImportWarning {
    fn new(reference: &str, err: &Error) -> Self {
        Self {
            reference: reference.to_string(),
            resolved: err.path().to_string(),
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning: Could not import {}: {}", self.reference, self.message)
    }
}

/// Receives the non-fatal failures of an inlining pass as they happen.
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: &ImportWarning);
}

impl<T: WarningSink + ?Sized> WarningSink for Arc<T> {
    fn warn(&self, warning: &ImportWarning) {
        (**self).warn(warning)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, w: &ImportWarning) {
        tracing::warn!(
            reference = %w.reference,
            resolved = %w.resolved,
            code = w.code,
            "{}",
            w.message
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl WarningSink for StderrSink {
    fn warn(&self, w: &ImportWarning) {
        eprintln!("{w}");
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<ImportWarning>>,
}

impl CollectingSink {
    pub fn take(&self) -> Vec<ImportWarning> {
        match self.seen.lock() {
            Ok(mut seen) => std::mem::take(&mut *seen),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, w: &ImportWarning) {
        match self.seen.lock() {
            Ok(mut seen) => seen.push(w.clone()),
            Err(poisoned) => poisoned.into_inner().push(w.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedDocument {
    pub content: String,
    /// Resolved paths of every successful import, in directive order.
    pub imported_files: Vec<String>,
    pub warnings: Vec<ImportWarning>,
}

struct Frame {
    file: String,
    dir: String,
    source: String,
    cursor: usize,
}

pub struct Inliner<F = TokioFs> {
    reader: SafeReader<F>,
    sink: Box<dyn WarningSink>,
    max_depth: usize,
}

impl Inliner<TokioFs> {
    pub fn new() -> Self {
        Self::with_reader(SafeReader::new())
    }
}

impl Default for Inliner<TokioFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSource> Inliner<F> {
    pub fn with_reader(reader: SafeReader<F>) -> Self {
        Self {
            reader,
            sink: Box::new(TracingSink),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn sink(mut self, sink: impl WarningSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Deepest nesting of imports below the root file.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Inline every import reachable from `file_path`.
    ///
    /// `file_path` is joined onto `base_dir`; an absolute `file_path` wins.
    /// Failing to read the root file fails the call. A failing import only
    /// produces a warning and leaves its directive in place.
    pub async fn inline(
        &self,
        file_path: &str,
        base_dir: &str,
        allow: &AllowList,
    ) -> Result<ProcessedDocument> {
        // file_path is anchored at base_dir here; earlier releases normalized
        // file_path alone and ignored base_dir entirely
        let root = path::normalize_join(&[base_dir, file_path]);
        let source = self.reader.read(&root, allow).await?;
        debug!(path = %root, "inlining imports");

        let mut out = String::with_capacity(source.len());
        let mut imported_files = Vec::new();
        let mut warnings = Vec::new();
        let mut stack = vec![Frame {
            dir: path::dirname(&root),
            file: root,
            source,
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(directive) = find_directive(&frame.source, frame.cursor) else {
                out.push_str(&frame.source[frame.cursor..]);
                stack.pop();
                if !stack.is_empty() {
                    out.push('\n');
                }
                continue;
            };
            out.push_str(&frame.source[frame.cursor..directive.start]);
            frame.cursor = directive.end;
            let resolved =
                path::normalize_join(&[frame.dir.as_str(), directive.reference.as_str()]);

            match self.open(&stack, &resolved, allow).await {
                Ok(content) => {
                    imported_files.push(resolved.clone());
                    out.push_str("\n/* Imported from: ");
                    out.push_str(&directive.reference);
                    out.push_str(" */\n");
                    stack.push(Frame {
                        dir: path::dirname(&resolved),
                        file: resolved,
                        source: content,
                        cursor: 0,
                    });
                }
                Err(err) => {
                    let warning = ImportWarning::new(&directive.reference, &err);
                    self.sink.warn(&warning);
                    warnings.push(warning);
                    // leave the directive verbatim; the current frame is still on top
                    if let Some(frame) = stack.last() {
                        out.push_str(&frame.source[directive.start..directive.end]);
                    }
                }
            }
        }

        info!(imports = imported_files.len(), warnings = warnings.len(), "imports inlined");
        Ok(ProcessedDocument {
            content: out,
            imported_files,
            warnings,
        })
    }

    async fn open(&self, stack: &[Frame], resolved: &str, allow: &AllowList) -> Result<String> {
        if stack.iter().any(|f| f.file == resolved) {
            return Err(Error::ImportCycle {
                path: resolved.to_string(),
            });
        }
        // the root frame sits at depth zero
        if stack.len() > self.max_depth {
            return Err(Error::DepthExceeded {
                path: resolved.to_string(),
                limit: self.max_depth,
            });
        }
        self.reader.read(resolved, allow).await
    }
}

/// Inline imports reading from disk, with warnings routed to `tracing`.
pub async fn inline_imports<S: AsRef<str>>(
    file_path: &str,
    base_dir: &str,
    allowed: &[S],
) -> Result<ProcessedDocument> {
    Inliner::new()
        .inline(file_path, base_dir, &AllowList::new(allowed))
        .await
}
