//! Dataset documents as handed over by the data collector.

use crate::error::ExtractError;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

/// One source document and its identifier.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub id: String,
    body: Body,
}

#[derive(Clone, Debug)]
enum Body {
    Text(String),
    Value(Value),
}

impl Dataset {
    /// Wraps raw document text. Parsing is deferred to [`Dataset::document`].
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: Body::Text(text.into()),
        }
    }

    /// Wraps an already structured document.
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            body: Body::Value(value),
        }
    }

    /// Reads a single document file; the identifier is the file stem.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_text(id, text))
    }

    /// Loads every `.json` and `.js` document in `dir`, sorted by file name.
    ///
    /// Unreadable files are logged and left out.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Self>, ExtractError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ExtractError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("json") | Some("js")
                    )
            })
            .collect();
        paths.sort();

        let mut datasets = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::from_file(&path) {
                Ok(ds) => datasets.push(ds),
                Err(err) => warn!(path = %path.display(), %err, "skipping unreadable dataset"),
            }
        }
        debug!(dir = %dir.display(), count = datasets.len(), "loaded datasets");
        Ok(datasets)
    }

    /// Parses the document into a labeled tree.
    pub fn document(&self) -> Result<Map<String, Value>, ExtractError> {
        let value = match &self.body {
            Body::Text(text) => serde_json::from_str(strip_module_wrapper(text))?,
            Body::Value(value) => value.clone(),
        };
        match value {
            Value::Object(obj) => Ok(obj),
            _ => Err(ExtractError::NotAnObject),
        }
    }
}

/// Strips a `const NAME = ...;` style wrapper around a JSON literal.
///
/// Data modules written for the browser gallery declare their payload as a
/// JavaScript constant, usually under a block of `//` header comments.
/// Comments around the literal are dropped; plain JSON passes through.
pub fn strip_module_wrapper(text: &str) -> &str {
    let body = skip_trailing_trivia(skip_leading_trivia(text));
    let decl = body.strip_prefix("export ").unwrap_or(body).trim_start();
    let declared = ["const ", "let ", "var "]
        .iter()
        .any(|kw| decl.starts_with(kw));
    if !declared {
        return body;
    }
    match decl.find('=') {
        Some(eq) => decl[eq + 1..].trim(),
        None => body,
    }
}

fn skip_leading_trivia(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("//") {
            s = rest.split_once('\n').map_or("", |(_, after)| after);
        } else if let Some(rest) = s.strip_prefix("/*") {
            s = rest.split_once("*/").map_or("", |(_, after)| after);
        } else {
            return s;
        }
    }
}

fn skip_trailing_trivia(mut s: &str) -> &str {
    loop {
        s = s.trim_end();
        let line_start = s.rfind('\n').map_or(0, |i| i + 1);
        let last_line = &s[line_start..];
        if last_line.trim_start().starts_with("//") {
            s = &s[..line_start];
        } else if let Some(semi) = last_line.rfind(';')
            && last_line[semi + 1..].trim_start().starts_with("//")
        {
            s = &s[..line_start + semi];
        } else if s.ends_with("*/")
            && let Some(open) = s.rfind("/*")
        {
            s = &s[..open];
        } else if let Some(rest) = s.strip_suffix(';') {
            s = rest;
        } else {
            return s;
        }
    }
}
