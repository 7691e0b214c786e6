//! Terminal renderer: a verdict line, findings, then file lists.

use colored::{ColoredString, Colorize};

use crate::models::{ComplianceReport, PreCheckReport, Severity};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

const RULE: &str = "───────────────────────────────────";

/// Scores at or above this are shown green.
const GOOD_SCORE: u32 = 70;

fn severity_icon(severity: Severity) -> (ColoredString, ColoredString) {
    match severity {
        Severity::Critical => ("✖".red().bold(), "critical".red().bold()),
        Severity::Warning => ("⚠".yellow().bold(), "warning".yellow().bold()),
    }
}

fn verdict(ok: bool, yes: &str, no: &str) -> ColoredString {
    if ok {
        format!("✔ {yes}").green().bold()
    } else {
        format!("✖ {no}").red().bold()
    }
}

fn score(score: u32, threshold: u32) -> ColoredString {
    let text = format!("{score}/100");
    if score >= threshold {
        text.green().bold()
    } else if score >= threshold / 2 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

fn push_list(output: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!(" {} ({})\n", heading.bold(), items.len()));
    for item in items {
        output.push_str(&format!("   {item}\n"));
    }
    output.push('\n');
}

impl OutputRenderer for TerminalRenderer {
    fn render_pre_check(&self, report: &PreCheckReport) -> String {
        let contract = &report.contract;
        let mut output = String::new();

        output.push_str(&format!(
            " {}  score {}  complexity {}\n\n",
            verdict(report.passed, "Plan passed", "Plan needs revision"),
            score(report.score, GOOD_SCORE),
            contract.complexity_rating.to_string().bold()
        ));

        for flag in &contract.red_flags {
            let (icon, label) = severity_icon(flag.severity);
            output.push_str(&format!(" {} {} {}\n", icon, label, flag.kind.to_string().bold()));
            output.push_str(&format!("   {}\n", flag.message));
        }
        if !contract.red_flags.is_empty() {
            output.push('\n');
        }

        let failed: Vec<_> = report.checks.iter().filter(|c| !c.passed).collect();
        for check in &failed {
            output.push_str(&format!(
                " {} {} [{}]\n   {}\n",
                "✖".red().bold(),
                check.id.bold(),
                check.category,
                check.message
            ));
        }
        if !failed.is_empty() {
            output.push('\n');
        }

        push_list(&mut output, "Approved files", &contract.approved_files);
        push_list(&mut output, "Allowed new files", &contract.allowed_new_files);
        push_list(&mut output, "Forbidden files", &contract.forbidden_files);

        if report.memory_bank.exists && !report.memory_bank.known_routes.is_empty() {
            push_list(&mut output, "Known routes", &report.memory_bank.known_routes);
        }

        output.push_str(&format!("{}\n", RULE.dimmed()));
        if !report.checks.is_empty() {
            let passed = report.checks.len() - failed.len();
            output.push_str(&format!(
                " {} of {} checks passed, {} red {}\n",
                passed.to_string().bold(),
                report.checks.len(),
                contract.red_flags.len().to_string().bold(),
                if contract.red_flags.len() == 1 { "flag" } else { "flags" },
            ));
        }
        output.push_str(&format!(" {} {}\n", "→".cyan(), report.recommendation));

        output
    }

    fn render_review(&self, report: &ComplianceReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            " {}  score {}\n\n",
            verdict(report.compliant, "Compliant", "Not compliant"),
            score(report.score, GOOD_SCORE)
        ));

        for violation in &report.violations {
            let (icon, label) = severity_icon(violation.severity);
            let location = if violation.file.is_empty() {
                String::new()
            } else {
                format!(" in {}", violation.file.bold())
            };
            output.push_str(&format!(
                " {} {} {}{}\n",
                icon,
                label,
                violation.kind.to_string().bold(),
                location
            ));
            output.push_str(&format!("   {}\n", violation.message));
        }
        if !report.violations.is_empty() {
            output.push('\n');
        }

        push_list(&mut output, "In scope", &report.in_scope_changes);
        push_list(&mut output, "Missing changes", &report.missing_changes);

        for action in &report.recommended_actions {
            output.push_str(&format!(" {} {}\n", "→".cyan(), action));
        }
        if !report.recommended_actions.is_empty() {
            output.push('\n');
        }

        output.push_str(&format!("{}\n", RULE.dimmed()));
        output.push_str(&format!(" {}\n", report.summary));
        if report.memory_bank_updated {
            output.push_str(&format!(" {}\n", "Memory bank updated.".dimmed()));
        }

        output
    }
}
