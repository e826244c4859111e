//! Source locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A span in a source file.
pub struct Span {
    /// The source file. For expansion results this is the name of the scratch unit they were
    /// parsed from.
    pub source_file: PathBuf,
    /// If we are expanding from a macro invocation, the invocation.
    /// If there are multiple levels, we keep only the top one.
    pub macro_invocation: Option<Arc<Span>>,
    /// The starting line.
    pub start_line: u32,
    /// The starting column.
    pub start_column: u32,
    /// The ending line.
    pub end_line: u32,
    /// The ending column.
    pub end_column: u32,
}
impl Span {
    /// Requires proc-macro2's `span-locations`; spans created outside a parse come out as 0:0-0:0.
    pub fn new(
        macro_invocation: Option<Arc<Span>>,
        source_file: PathBuf,
        span: proc_macro2::Span,
    ) -> Self {
        // collapse a level of macro invocations. by induction, this will keep them at max 1 level deep.
        let macro_invocation = if let Some(inv) = macro_invocation {
            if let Some(inv) = &inv.macro_invocation {
                debug_assert!(
                    inv.macro_invocation.is_none(),
                    "too many levels of span information..."
                );
                Some(inv.clone())
            } else {
                Some(inv)
            }
        } else {
            None
        };

        Span {
            source_file,
            macro_invocation,
            start_line: span.start().line as u32,
            start_column: span.start().column as u32,
            end_line: span.end().line as u32,
            end_column: span.end().column as u32,
        }
    }

    pub fn fake() -> Span {
        Span {
            source_file: "fake_file.rs".into(),
            macro_invocation: None,
            start_line: 0,
            start_column: 0,
            end_line: 0,
            end_column: 0,
        }
    }
}
impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        if let Some(span) = &self.macro_invocation {
            write!(
                f,
                "macro invocation at {}[{}:{}-{}:{}]",
                span.source_file.display(),
                span.start_line,
                span.start_column,
                span.end_line,
                span.end_column
            )
        } else {
            write!(
                f,
                "{}[{}:{}-{}:{}]",
                self.source_file.display(),
                self.start_line,
                self.start_column,
                self.end_line,
                self.end_column
            )
        }
    }
}
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        fmt::Debug::fmt(self, f)
    }
}
