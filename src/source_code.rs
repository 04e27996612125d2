//! A named source text for error reporting. See [`Source`].

use std::{path::Path, sync::Arc};

/// The text of a jobs file together with its name, so diagnostics can show
/// `[.jobs_done.yaml:3:1]` above the annotated snippet.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    code: Arc<str>,
}

impl Source {
    pub fn new(name: impl Into<String>, code: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Read a file, naming the source after the path as given
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let code = fs_err::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), code))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for Source {
    fn as_ref(&self) -> &str {
        self.code.as_ref()
    }
}

impl miette::SourceCode for Source {
    fn read_span<'a>(
        &'a self,
        span: &miette::SourceSpan,
        context_lines_before: usize,
        context_lines_after: usize,
    ) -> Result<Box<dyn miette::SpanContents<'a> + 'a>, miette::MietteError> {
        let inner_contents =
            self.as_ref()
                .read_span(span, context_lines_before, context_lines_after)?;
        let contents = miette::MietteSpanContents::new_named(
            self.name.clone(),
            inner_contents.data(),
            *inner_contents.span(),
            inner_contents.line(),
            inner_contents.column(),
            inner_contents.line_count(),
        );
        Ok(Box::new(contents))
    }
}
