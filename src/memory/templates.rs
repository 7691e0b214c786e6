//! Seed content for a freshly initialized memory bank.

use super::CoreDocument;

/// Optional details filled into the templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    pub project_name: Option<String>,
    pub tech_stack: Option<String>,
    pub description: Option<String>,
}

/// Today's date (UTC) as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Render the initial content of a core document.
pub fn render(document: CoreDocument, options: &TemplateOptions) -> String {
    let date = today();
    match document {
        CoreDocument::ProjectBrief => {
            let title = match options.project_name.as_deref() {
                Some(name) if !name.is_empty() => format!("# Project Brief: {name}"),
                _ => "# Project Brief".to_string(),
            };
            let description = non_empty(
                &options.description,
                "[Describe the project: what it does, who it's for, and why it exists.]",
            );
            format!(
                "{title}\n\n**Created**: {date}\n\n\
                 ## What this project is\n\n{description}\n\n\
                 ## Primary user & audience\n\n\
                 [Who is the primary user? What problem does this solve for them?]\n\n\
                 ## Core product loop\n\n\
                 [What is the main workflow or \"happy path\" through the product?]\n\n\
                 1. [Step 1]\n2. [Step 2]\n3. [Step 3]\n\n\
                 ## Out of scope\n\n\
                 [What is this project explicitly NOT doing?]\n"
            )
        }
        CoreDocument::ActiveContext => format!(
            "# Active Context\n\n**Last updated**: {date}\n\n\
             ## Current scope\n\n\
             [What pages/features/areas are actively being worked on?]\n\n\
             ## Current priorities\n\n\
             1. [Priority 1]\n2. [Priority 2]\n3. [Priority 3]\n\n\
             ## Recent Changes\n\n\
             [Log of recent changes, appended automatically after compliant reviews]\n"
        ),
        CoreDocument::TechContext => {
            let stack = non_empty(
                &options.tech_stack,
                "[List your tech stack: framework, language, database, etc.]",
            );
            format!(
                "# Tech Context\n\n## Stack\n\n{stack}\n\n\
                 ## Dependencies\n\n[Key dependencies and their purposes]\n\n\
                 ## Architecture notes\n\n[High-level architecture decisions, deployment setup, etc.]\n\n\
                 ## Design system\n\n[UI framework, component library, styling approach]\n"
            )
        }
        CoreDocument::SystemPatterns => "# System Patterns\n\n\
             ## Code conventions\n\n\
             [Naming conventions, file organization patterns, import ordering, etc.]\n\n\
             ## Architecture patterns\n\n\
             [State management, data fetching, error handling, routing patterns, etc.]\n\n\
             ## Anti-patterns\n\n\
             [Things explicitly avoided in this codebase and why]\n"
            .to_string(),
        CoreDocument::Routes => format!(
            "# Route Contract\n\n**Last updated**: {date}\n\n\
             ## Routes\n\n\
             | Route | Method | Auth | Description | Status |\n\
             |-------|--------|------|-------------|--------|\n\
             | | | | | |\n\n\
             ## Route rules\n\n\
             - All new routes must be added to this table before implementation\n\
             - Route changes are flagged when the original request did not ask for them\n\
             - Deprecated routes should be marked with status \"deprecated\"\n"
        ),
        CoreDocument::Progress => "# Progress Log\n\n\
             [Cumulative log of completed work, appended automatically after compliant reviews]\n\n\
             ## Completed\n\n\
             | Date | Summary | Files Changed | Compliance Score |\n\
             |------|---------|---------------|-----------------|\n"
            .to_string(),
    }
}

fn non_empty<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or(fallback)
}

/// Workflow rules written into the agent instructions file.
pub fn agent_rules() -> String {
    format!(
        "{marker}\n## Vibe Check: Workflow Rules\n\n\
         - At project start, call `memory_bank_init` to set up project context\n\
         - Before any implementation, call `pre_check` to get a change contract\n\
         - After coding, call `diff_review` to verify compliance\n\
         - Use `memory_bank_read` to review project context before making changes\n\
         - Use `memory_bank_update` to keep context current as the project evolves\n",
        marker = crate::constants::AGENT_RULES_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::routes::parse_routes_table;
    use crate::text::markdown_section;

    #[test]
    fn today_is_iso_date() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[4], b'-');
        assert_eq!(date.as_bytes()[7], b'-');
    }

    #[test]
    fn project_brief_uses_options() {
        let options = TemplateOptions {
            project_name: Some("Acme".into()),
            description: Some("A storefront.".into()),
            ..TemplateOptions::default()
        };
        let brief = render(CoreDocument::ProjectBrief, &options);
        assert!(brief.starts_with("# Project Brief: Acme\n"));
        assert!(brief.contains("A storefront."));
    }

    #[test]
    fn blank_options_use_placeholders() {
        let options = TemplateOptions {
            tech_stack: Some("   ".into()),
            ..TemplateOptions::default()
        };
        let tech = render(CoreDocument::TechContext, &options);
        assert!(tech.contains("[List your tech stack"));
    }

    #[test]
    fn active_context_carries_timestamp() {
        let ctx = render(CoreDocument::ActiveContext, &TemplateOptions::default());
        assert!(ctx.contains(&format!("**Last updated**: {}", today())));
    }

    #[test]
    fn routes_template_parses_empty() {
        let routes = render(CoreDocument::Routes, &TemplateOptions::default());
        assert!(parse_routes_table(&routes).is_empty());
    }

    #[test]
    fn system_patterns_has_anti_patterns_section() {
        let patterns = render(CoreDocument::SystemPatterns, &TemplateOptions::default());
        assert!(markdown_section(&patterns, "Anti-patterns").is_some());
    }

    #[test]
    fn agent_rules_start_with_marker() {
        assert!(agent_rules().starts_with("<!-- vibe-check-rules -->"));
    }
}
