//! Plan-quality checks over the free-text description of a change.
//!
//! Each check compares the request against the plan, or scans the plan for
//! marker vocabulary. Checks never depend on each other's results.

use std::collections::HashSet;

use crate::models::{CheckCategory, CheckResult};
use crate::text::{
    markdown_section, mentioned, mentions_any, significant_tokens, token_set, tokenize, truncate_chars,
};

/// Everything a check may look at.
pub struct PlanInput<'a> {
    pub request: &'a str,
    pub plan: &'a str,
    pub has_tests: bool,
    pub framework: Option<&'a str>,
    pub system_patterns: Option<&'a str>,
    pub active_context: Option<&'a str>,
}

/// Lowercased and tokenized views shared by all checks.
struct Prepared<'a> {
    input: &'a PlanInput<'a>,
    request_lower: String,
    plan_lower: String,
    request_tokens: HashSet<String>,
    plan_tokens: Vec<String>,
}

struct CheckDef {
    id: &'static str,
    category: CheckCategory,
    description: &'static str,
    run: fn(&Prepared) -> (bool, String),
}

const CHECKS: &[CheckDef] = &[
    CheckDef {
        id: "scope-alignment",
        category: CheckCategory::Scope,
        description: "Plan stays within the original request",
        run: scope_alignment,
    },
    CheckDef {
        id: "no-unrequested-files",
        category: CheckCategory::Scope,
        description: "No unrequested files or endpoints",
        run: no_unrequested_files,
    },
    CheckDef {
        id: "no-unrequested-refactoring",
        category: CheckCategory::Scope,
        description: "No unrequested refactoring",
        run: no_unrequested_refactoring,
    },
    CheckDef {
        id: "simplest-approach",
        category: CheckCategory::Complexity,
        description: "Uses the simplest approach possible",
        run: simplest_approach,
    },
    CheckDef {
        id: "no-unnecessary-abstractions",
        category: CheckCategory::Complexity,
        description: "No unnecessary abstractions, factories, or wrappers",
        run: no_unnecessary_abstractions,
    },
    CheckDef {
        id: "no-unnecessary-dependencies",
        category: CheckCategory::Complexity,
        description: "No unnecessary new dependencies",
        run: no_unnecessary_dependencies,
    },
    CheckDef {
        id: "no-duplication",
        category: CheckCategory::Duplication,
        description: "No duplicating existing utilities or patterns",
        run: no_duplication,
    },
    CheckDef {
        id: "preserves-existing-functionality",
        category: CheckCategory::Safety,
        description: "Preserves existing functionality",
        run: preserves_existing_functionality,
    },
    CheckDef {
        id: "mentions-tests",
        category: CheckCategory::Safety,
        description: "Considers testing when modifying code with existing tests",
        run: mentions_tests,
    },
    CheckDef {
        id: "follows-conventions",
        category: CheckCategory::Architecture,
        description: "Follows documented and framework conventions",
        run: follows_conventions,
    },
    CheckDef {
        id: "active-scope-alignment",
        category: CheckCategory::Architecture,
        description: "Aligns with current project priorities",
        run: active_scope_alignment,
    },
];

/// Anti-pattern words of this many characters or fewer are not keywords.
const ANTI_PATTERN_MIN_KEYWORD_LEN: usize = 4;

const SCOPE_EXPANSION_WORDS: &[&str] = &[
    "refactor",
    "restructure",
    "reorganize",
    "migrate",
    "upgrade",
    "rewrite",
    "optimize",
    "redesign",
];

const NEW_FILE_PHRASES: &[&str] = &[
    "create new",
    "add new file",
    "new component",
    "new module",
    "new service",
];

const REFACTOR_PHRASES: &[&str] = &["refactor", "clean up", "reorganize", "rename", "restructure"];

const OVER_ENGINEERING: &[&str] = &[
    "factory",
    "abstract",
    "decorator",
    "observer pattern",
    "strategy pattern",
    "dependency injection",
    "service locator",
    "event bus",
    "pub/sub",
    "message queue",
    "microservice",
];

const ABSTRACTION_PHRASES: &[&str] = &[
    "base class",
    "abstract class",
    "generic wrapper",
    "utility class",
    "helper class",
    "manager class",
    "handler class",
    "provider pattern",
    "higher-order",
];

const DEPENDENCY_PHRASES: &[&str] = &["install", "npm add", "cargo add", "new dependency", "new package"];

const DUPLICATION_PHRASES: &[&str] = &[
    "similar to existing",
    "copy of",
    "duplicate",
    "re-implement",
    "reimplement",
    "write our own",
    "custom implementation of",
];

const DESTRUCTIVE_PHRASES: &[&str] = &[
    "remove existing",
    "delete existing",
    "replace all",
    "completely rewrite",
    "start from scratch",
    "breaking change",
    "remove backward",
    "drop support",
];

const TEST_WORDS: &[&str] = &["test", "spec", "verify"];

/// Framework-specific vocabulary used when no anti-patterns are documented.
const FRAMEWORK_ANTI_PATTERNS: &[(&str, &[&str])] = &[
    ("Next.js", &["express server", "custom server", "webpack config"]),
    ("React", &["direct dom manipulation", "document.getelementby"]),
    ("Angular", &["jquery", "direct dom"]),
    ("Vue", &["react component", "jsx"]),
];

/// Run every check against a plan.
pub fn run_checks(input: &PlanInput) -> Vec<CheckResult> {
    let prepared = Prepared {
        input,
        request_lower: input.request.to_lowercase(),
        plan_lower: input.plan.to_lowercase(),
        request_tokens: token_set(input.request),
        plan_tokens: tokenize(input.plan),
    };

    CHECKS
        .iter()
        .map(|check| {
            let (passed, message) = (check.run)(&prepared);
            CheckResult {
                id: check.id.to_string(),
                category: check.category,
                description: check.description.to_string(),
                passed,
                message,
            }
        })
        .collect()
}

fn pass(message: &str) -> (bool, String) {
    (true, message.to_string())
}

fn fail(message: String) -> (bool, String) {
    (false, message)
}

fn scope_alignment(p: &Prepared) -> (bool, String) {
    let unrequested: Vec<&str> = SCOPE_EXPANSION_WORDS
        .iter()
        .copied()
        .filter(|kw| p.plan_tokens.iter().any(|t| t == kw) && !p.request_tokens.contains(*kw))
        .collect();

    if unrequested.is_empty() {
        pass("Changes appear aligned with request scope")
    } else {
        fail(format!(
            "Proposed changes introduce unrequested scope: {}",
            unrequested.join(", ")
        ))
    }
}

fn no_unrequested_files(p: &Prepared) -> (bool, String) {
    let creates = mentions_any(&p.plan_lower, NEW_FILE_PHRASES);
    if creates && !mentions_any(&p.request_lower, &["create", "add", "new"]) {
        fail("Plan creates new files not explicitly requested".to_string())
    } else {
        pass("No unrequested file creation detected")
    }
}

fn no_unrequested_refactoring(p: &Prepared) -> (bool, String) {
    let proposed = mentions_any(&p.plan_lower, REFACTOR_PHRASES);
    let requested = mentions_any(&p.request_lower, REFACTOR_PHRASES);
    if proposed && !requested {
        fail("Plan includes refactoring that was not requested".to_string())
    } else {
        pass("No unrequested refactoring detected")
    }
}

fn simplest_approach(p: &Prepared) -> (bool, String) {
    let found = mentioned(&p.plan_lower, OVER_ENGINEERING);
    if found.is_empty() {
        pass("No over-engineering patterns detected")
    } else {
        fail(format!(
            "Potentially over-engineered patterns detected: {}. Are these really necessary?",
            found.join(", ")
        ))
    }
}

fn no_unnecessary_abstractions(p: &Prepared) -> (bool, String) {
    let found = mentioned(&p.plan_lower, ABSTRACTION_PHRASES);
    if found.is_empty() {
        pass("No unnecessary abstractions detected")
    } else {
        fail(format!(
            "Abstraction patterns detected: {}. Consider if direct implementation would suffice.",
            found.join(", ")
        ))
    }
}

fn no_unnecessary_dependencies(p: &Prepared) -> (bool, String) {
    if mentions_any(&p.plan_lower, DEPENDENCY_PHRASES) {
        fail(
            "Plan adds new dependencies. Verify these are essential and can't be done with existing packages or built-in APIs."
                .to_string(),
        )
    } else {
        pass("No new dependencies introduced")
    }
}

fn no_duplication(p: &Prepared) -> (bool, String) {
    let found = mentioned(&p.plan_lower, DUPLICATION_PHRASES);
    if found.is_empty() {
        pass("No duplication concerns detected")
    } else {
        fail(format!(
            "Potential duplication detected: {}. Check if existing code can be reused.",
            found.join(", ")
        ))
    }
}

fn preserves_existing_functionality(p: &Prepared) -> (bool, String) {
    let found = mentioned(&p.plan_lower, DESTRUCTIVE_PHRASES);
    if found.is_empty() {
        pass("No destructive changes detected")
    } else {
        fail(format!(
            "Potentially destructive changes: {}. Ensure existing behavior is preserved.",
            found.join(", ")
        ))
    }
}

fn mentions_tests(p: &Prepared) -> (bool, String) {
    if !p.input.has_tests {
        return pass("No existing test suite to consider");
    }
    if mentions_any(&p.plan_lower, TEST_WORDS) {
        pass("Plan acknowledges testing")
    } else {
        fail("Project has tests but the plan doesn't mention updating or running them".to_string())
    }
}

fn follows_conventions(p: &Prepared) -> (bool, String) {
    if let Some(section) = p.input.system_patterns.and_then(|doc| markdown_section(doc, "Anti-patterns")) {
        for line in anti_pattern_lines(section) {
            let keywords: HashSet<String> =
                significant_tokens(line, ANTI_PATTERN_MIN_KEYWORD_LEN).into_iter().collect();
            let matches = keywords
                .iter()
                .filter(|kw| p.plan_tokens.contains(*kw))
                .count();
            if matches >= 2 {
                return fail(format!(
                    "Proposed changes may conflict with documented anti-pattern: \"{}\"",
                    truncate_chars(line, 100)
                ));
            }
        }
        return pass("Changes appear consistent with documented system patterns");
    }

    let Some(framework) = p.input.framework else {
        return pass("No specific framework conventions to check");
    };
    let vocabulary = FRAMEWORK_ANTI_PATTERNS
        .iter()
        .find(|(name, _)| *name == framework)
        .map(|(_, words)| *words)
        .unwrap_or_default();

    let found = mentioned(&p.plan_lower, vocabulary);
    if found.is_empty() {
        pass(&format!("Changes appear consistent with {framework} conventions"))
    } else {
        fail(format!(
            "Potential convention violation for {framework}: {}",
            found.join(", ")
        ))
    }
}

/// Listed anti-patterns: bullet markers stripped, short lines and
/// `[placeholder]` lines skipped.
fn anti_pattern_lines(section: &str) -> impl Iterator<Item = &str> {
    section
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line)
                .trim()
        })
        .filter(|line| line.chars().count() > 5)
        .filter(|line| !(line.starts_with('[') && line.ends_with(']')))
}

fn active_scope_alignment(p: &Prepared) -> (bool, String) {
    let Some(active) = p.input.active_context else {
        return pass("No active context available to check against");
    };
    let documented = markdown_section(active, "Current scope").is_some()
        || markdown_section(active, "Current priorities").is_some();
    if documented {
        pass("Active context available. Verify the proposed changes align with the documented priorities")
    } else {
        pass("Active context exists but has no scope/priority sections to check")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(request: &'a str, plan: &'a str) -> PlanInput<'a> {
        PlanInput {
            request,
            plan,
            has_tests: false,
            framework: None,
            system_patterns: None,
            active_context: None,
        }
    }

    fn result<'a>(results: &'a [CheckResult], id: &str) -> &'a CheckResult {
        results.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn eleven_checks_with_unique_ids() {
        let results = run_checks(&input("add a login page", "add the page component"));
        assert_eq!(results.len(), 11);
        let ids: HashSet<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn clean_plan_passes_everything() {
        let results = run_checks(&input(
            "add a login page",
            "Add a login form to the existing page and wire up the submit handler",
        ));
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
    }

    #[test]
    fn scope_expansion_words_must_be_requested() {
        let results = run_checks(&input("fix the header", "fix the header and refactor the nav"));
        let check = result(&results, "scope-alignment");
        assert!(!check.passed);
        assert_eq!(check.message, "Proposed changes introduce unrequested scope: refactor");
        assert!(!result(&results, "no-unrequested-refactoring").passed);

        let results = run_checks(&input("refactor the nav", "refactor the nav"));
        assert!(result(&results, "scope-alignment").passed);
        assert!(result(&results, "no-unrequested-refactoring").passed);
    }

    #[test]
    fn new_files_need_creation_vocabulary() {
        let results = run_checks(&input("fix the header", "create new component for the header"));
        assert!(!result(&results, "no-unrequested-files").passed);

        let results = run_checks(&input("add a header", "create new component for the header"));
        assert!(result(&results, "no-unrequested-files").passed);
    }

    #[test]
    fn vocabulary_checks() {
        let results = run_checks(&input(
            "add search",
            "Use a factory with an event bus, a generic wrapper, install lodash, \
             reimplement the debounce helper and remove existing filters",
        ));
        let simplest = result(&results, "simplest-approach");
        assert!(!simplest.passed);
        assert!(simplest.message.contains("factory, event bus"));
        assert!(!result(&results, "no-unnecessary-abstractions").passed);
        assert!(!result(&results, "no-unnecessary-dependencies").passed);
        assert!(!result(&results, "no-duplication").passed);
        assert!(!result(&results, "preserves-existing-functionality").passed);
    }

    #[test]
    fn tests_required_only_when_suite_exists() {
        let mut plan = input("fix bug", "change the date parser");
        assert!(result(&run_checks(&plan), "mentions-tests").passed);

        plan.has_tests = true;
        assert!(!result(&run_checks(&plan), "mentions-tests").passed);

        plan.plan = "change the date parser and update its unit tests";
        assert!(result(&run_checks(&plan), "mentions-tests").passed);
    }

    #[test]
    fn documented_anti_patterns() {
        let patterns = "# System Patterns\n\n## Anti-patterns\n\n- Global mutable singletons for state\n- [Things explicitly avoided in this codebase and why]\n\n## Other\n";
        let mut plan = input("add cart", "keep cart state in a global mutable store");
        plan.system_patterns = Some(patterns);

        let check = result(&run_checks(&plan), "follows-conventions").clone();
        assert!(!check.passed);
        assert!(check.message.contains("Global mutable singletons for state"));

        plan.plan = "pass the cart through props";
        assert!(result(&run_checks(&plan), "follows-conventions").passed);

        // The template placeholder is not an anti-pattern.
        plan.plan = "things explicitly avoided";
        assert!(result(&run_checks(&plan), "follows-conventions").passed);
    }

    #[test]
    fn anti_pattern_keywords_match_whole_tokens() {
        let patterns = "## Anti-patterns\n\n- Never bypass the shared validation layer\n";
        let mut plan = input("add signup", "add signup validation inside the shared form");
        plan.system_patterns = Some(patterns);
        // "shared" and "validation" are the fourth and fifth keywords.
        assert!(!result(&run_checks(&plan), "follows-conventions").passed);

        let patterns = "## Anti-patterns\n\n- Global store, shared state\n";
        plan.system_patterns = Some(patterns);
        plan.plan = "restore the globalized shared layout";
        assert!(result(&run_checks(&plan), "follows-conventions").passed);

        plan.plan = "move the store into shared state";
        assert!(!result(&run_checks(&plan), "follows-conventions").passed);
    }

    #[test]
    fn framework_fallback_when_nothing_documented() {
        let mut plan = input("add api", "spin up a custom server for the api");
        plan.framework = Some("Next.js");
        let check = result(&run_checks(&plan), "follows-conventions").clone();
        assert!(!check.passed);
        assert_eq!(check.message, "Potential convention violation for Next.js: custom server");

        plan.framework = Some("Axum");
        assert!(result(&run_checks(&plan), "follows-conventions").passed);

        // A patterns document without an anti-patterns section falls back too.
        plan.framework = Some("Next.js");
        plan.system_patterns = Some("# System Patterns\n\n## Code conventions\n\nkebab-case\n");
        assert!(!result(&run_checks(&plan), "follows-conventions").passed);
    }

    #[test]
    fn active_scope_is_informational() {
        let mut plan = input("x", "y");
        for ctx in [None, Some("# Active"), Some("## Current scope\n\nlogin\n")] {
            plan.active_context = ctx;
            assert!(result(&run_checks(&plan), "active-scope-alignment").passed);
        }
    }
}
