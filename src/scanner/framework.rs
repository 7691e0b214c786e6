//! Manifest reading and framework detection.
//!
//! Looks for marker manifests (package.json, Cargo.toml) in the project
//! root, collects their declared dependency names, and matches them against
//! an ordered framework table. A missing or unparsable manifest contributes
//! nothing; it is never an error.

use std::path::Path;

use indexmap::IndexSet;
use tracing::debug;

/// Known frameworks in detection order: the first row with any matching
/// package name wins.
const FRAMEWORKS: &[(&[&str], &str)] = &[
    (&["next"], "Next.js"),
    (&["nuxt"], "Nuxt"),
    (&["@angular/core"], "Angular"),
    (&["svelte", "@sveltejs/kit"], "SvelteKit"),
    (&["remix", "@remix-run/node"], "Remix"),
    (&["astro"], "Astro"),
    (&["express"], "Express"),
    (&["fastify"], "Fastify"),
    (&["hono"], "Hono"),
    (&["react"], "React"),
    (&["vue"], "Vue"),
    (&["@modelcontextprotocol/sdk"], "MCP Server"),
    (&["axum"], "Axum"),
    (&["actix-web"], "Actix Web"),
    (&["rocket"], "Rocket"),
];

/// Dependency names declared by the project's manifests, in declaration order.
pub async fn read_dependencies(root: &Path) -> Vec<String> {
    let mut deps = IndexSet::new();

    if let Ok(content) = tokio::fs::read_to_string(root.join("package.json")).await {
        match node_dependencies(&content) {
            Some(names) => deps.extend(names),
            None => debug!("package.json is not valid JSON, ignoring"),
        }
    }

    if let Ok(content) = tokio::fs::read_to_string(root.join("Cargo.toml")).await {
        match cargo_dependencies(&content) {
            Some(names) => deps.extend(names),
            None => debug!("Cargo.toml is not valid TOML, ignoring"),
        }
    }

    deps.into_iter().collect()
}

/// Keys of `dependencies` and `devDependencies` in a package.json.
fn node_dependencies(content: &str) -> Option<Vec<String>> {
    let json: serde_json::Value = serde_json::from_str(content).ok()?;
    let names = ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| json.get(section).and_then(|v| v.as_object()))
        .flat_map(|deps| deps.keys().cloned())
        .collect();
    Some(names)
}

/// Keys of `[dependencies]` and `[dev-dependencies]` in a Cargo.toml.
fn cargo_dependencies(content: &str) -> Option<Vec<String>> {
    let manifest: toml::Value = content.parse().ok()?;
    let names = ["dependencies", "dev-dependencies"]
        .iter()
        .filter_map(|section| manifest.get(section).and_then(|v| v.as_table()))
        .flat_map(|deps| deps.keys().cloned())
        .collect();
    Some(names)
}

/// Match dependency names against the framework table.
pub fn detect_framework(deps: &[String]) -> Option<String> {
    FRAMEWORKS
        .iter()
        .find(|(packages, _)| packages.iter().any(|p| deps.iter().any(|d| d == p)))
        .map(|(_, name)| (*name).to_string())
}
