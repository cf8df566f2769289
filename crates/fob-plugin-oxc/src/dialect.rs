//! Source dialect detection from module ids.

use std::fmt;
use std::path::Path;

use oxc_span::SourceType;
use serde::Serialize;

/// Source dialect of a module, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain JavaScript (`.js`, `.mjs`, `.cjs`, or anything unrecognized)
    #[default]
    Js,
    /// TypeScript (`.ts`, `.mts`, `.cts`)
    Ts,
    /// JavaScript with JSX (`.jsx`)
    Jsx,
    /// TypeScript with JSX (`.tsx`)
    Tsx,
}

impl Dialect {
    /// Detect the dialect of a module id.
    ///
    /// Query strings and hash fragments (`App.tsx?v=3`) are ignored. Ids with
    /// a missing or unrecognized extension are treated as plain JavaScript.
    ///
    /// # Example
    ///
    /// ```
    /// use fob_plugin_oxc::Dialect;
    ///
    /// assert_eq!(Dialect::detect("/src/App.tsx"), Dialect::Tsx);
    /// assert_eq!(Dialect::detect("/src/styles.css"), Dialect::Js);
    /// ```
    pub fn detect(id: &str) -> Self {
        Self::from_extension(extension_of(id).unwrap_or_default())
    }

    /// Map a bare extension (without the leading dot) to a dialect.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "ts" | "mts" | "cts" => Dialect::Ts,
            "tsx" => Dialect::Tsx,
            "jsx" => Dialect::Jsx,
            _ => Dialect::Js,
        }
    }

    /// Whether the dialect may contain JSX markup.
    pub fn has_markup(self) -> bool {
        matches!(self, Dialect::Jsx | Dialect::Tsx)
    }

    /// Whether the dialect carries type annotations to strip.
    pub fn is_typescript(self) -> bool {
        matches!(self, Dialect::Ts | Dialect::Tsx)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Js => "js",
            Dialect::Ts => "ts",
            Dialect::Jsx => "jsx",
            Dialect::Tsx => "tsx",
        }
    }

    /// Parser source type for this dialect (ES module by default).
    pub fn source_type(self) -> SourceType {
        match self {
            Dialect::Js => SourceType::mjs(),
            Dialect::Ts => SourceType::ts(),
            Dialect::Jsx => SourceType::jsx(),
            Dialect::Tsx => SourceType::tsx(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module id with any `?query` or `#hash` suffix removed.
pub(crate) fn strip_query(id: &str) -> &str {
    match id.find(['?', '#']) {
        Some(idx) => &id[..idx],
        None => id,
    }
}

/// Extension of a module id, ignoring query strings.
pub(crate) fn extension_of(id: &str) -> Option<&str> {
    Path::new(strip_query(id))
        .extension()
        .and_then(|ext| ext.to_str())
}
