// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generated page artifacts.

use serde::{Deserialize, Serialize};

pub const HTML_FILENAME: &str = "index.html";
pub const CSS_FILENAME: &str = "styles.css";
pub const JS_FILENAME: &str = "script.js";

/// The three source files of a generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTriple {
    pub html: String,
    pub css: String,
    pub js: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("response is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' must be a string")]
    NotAString(&'static str),
}

impl ArtifactTriple {
    /// Strictly read `html`, `css` and `js` from a JSON object.
    ///
    /// Every key must be present and string-valued; the first offending key
    /// is named in the error. Extra keys are ignored.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ArtifactError> {
        let obj = value.as_object().ok_or(ArtifactError::NotAnObject)?;
        let field = |name: &'static str| -> Result<String, ArtifactError> {
            match obj.get(name) {
                None => Err(ArtifactError::MissingField(name)),
                Some(serde_json::Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(ArtifactError::NotAString(name)),
            }
        };
        Ok(Self { html: field("html")?, css: field("css")?, js: field("js")? })
    }

    /// HTML with stylesheet and script references spliced in when absent.
    ///
    /// A `<link rel="stylesheet">` goes before `</head>` if the page has no
    /// `<link` tag and the CSS is non-empty; a `<script src>` goes before
    /// `</body>` if the page has no `<script` tag and the JS is non-empty.
    pub fn linked_html(&self) -> String {
        let mut html = self.html.clone();
        if !html.contains("<link") && !self.css.is_empty() {
            html = html.replace(
                "</head>",
                &format!("  <link rel=\"stylesheet\" href=\"{CSS_FILENAME}\">\n</head>"),
            );
        }
        if !html.contains("<script") && !self.js.is_empty() {
            html = html.replace(
                "</body>",
                &format!("  <script src=\"{JS_FILENAME}\"></script>\n</body>"),
            );
        }
        html
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
