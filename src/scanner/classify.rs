//! Path-based file classification.
//!
//! Each file is tested against an ordered table of predicates over its
//! lowercased name, extension and path segments. The first predicate that
//! matches decides the category.

use crate::models::FileCategory;

/// Lowercased views of a project-relative path.
pub struct PathParts {
    /// File name, e.g. `page.tsx`.
    pub name: String,
    /// Extension including the dot, or empty for dotfiles and bare names.
    pub ext: String,
    /// Every `/`-separated segment, including the file name.
    pub segments: Vec<String>,
}

impl PathParts {
    pub fn new(relative_path: &str) -> Self {
        let lower = relative_path.replace('\\', "/").to_lowercase();
        let segments: Vec<String> = lower
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let name = segments.last().cloned().unwrap_or_default();
        let ext = match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx..].to_string(),
            _ => String::new(),
        };
        Self {
            name,
            ext,
            segments,
        }
    }

    fn has_segment(&self, wanted: &[&str]) -> bool {
        self.segments.iter().any(|s| wanted.contains(&s.as_str()))
    }
}

/// Well-known tool config file names.
const CONFIG_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "jest.config.ts",
    "jest.config.js",
    "vitest.config.ts",
    "vite.config.ts",
    "next.config.js",
    "next.config.mjs",
    "tailwind.config.js",
    "tailwind.config.ts",
    "postcss.config.js",
    "webpack.config.js",
    "eslint.config.js",
    "prettier.config.js",
];

const ENTRY_FILES: &[&str] = &[
    "index.ts", "index.js", "main.ts", "main.js", "app.ts", "app.js", "server.ts", "server.js",
];

const APP_ROUTE_FILES: &[&str] = &["page.tsx", "page.jsx", "route.ts", "route.js"];

type Predicate = fn(&PathParts) -> bool;

/// Classification rules in precedence order.
const RULES: &[(FileCategory, Predicate)] = &[
    (FileCategory::Test, is_test),
    (FileCategory::Config, is_config),
    (FileCategory::Route, is_route),
    (FileCategory::Entry, is_entry),
    (FileCategory::Component, is_component),
    (FileCategory::Style, is_style),
    (FileCategory::Migration, is_migration),
    (FileCategory::Type, is_type),
    (FileCategory::Utility, is_utility),
];

fn is_test(p: &PathParts) -> bool {
    p.name.contains(".test.")
        || p.name.contains(".spec.")
        || p.name.starts_with("test")
        || p.has_segment(&["__tests__", "tests", "test"])
}

fn is_config(p: &PathParts) -> bool {
    p.name.starts_with('.')
        || CONFIG_FILES.contains(&p.name.as_str())
        || p.name.ends_with(".config.ts")
        || p.name.ends_with(".config.js")
        || p.name.ends_with(".config.mjs")
}

fn is_route(p: &PathParts) -> bool {
    p.has_segment(&["routes", "api", "pages"])
        || (p.has_segment(&["app"]) && APP_ROUTE_FILES.contains(&p.name.as_str()))
}

fn is_entry(p: &PathParts) -> bool {
    ENTRY_FILES.contains(&p.name.as_str())
}

fn is_component(p: &PathParts) -> bool {
    p.has_segment(&["components", "ui"]) || matches!(p.ext.as_str(), ".tsx" | ".jsx")
}

fn is_style(p: &PathParts) -> bool {
    matches!(p.ext.as_str(), ".css" | ".scss" | ".less" | ".sass")
}

fn is_migration(p: &PathParts) -> bool {
    p.has_segment(&["migrations", "migrate"])
}

fn is_type(p: &PathParts) -> bool {
    p.name.ends_with(".d.ts") || p.has_segment(&["types"]) || p.name == "types.ts"
}

fn is_utility(p: &PathParts) -> bool {
    p.has_segment(&["utils", "lib", "helpers", "shared"])
}

/// Classify a project-relative path.
pub fn classify(relative_path: &str) -> FileCategory {
    let parts = PathParts::new(relative_path);
    RULES
        .iter()
        .find(|(_, applies)| applies(&parts))
        .map(|(category, _)| *category)
        .unwrap_or(FileCategory::Other)
}
