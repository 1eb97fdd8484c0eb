use crate::assertion::model::TestResult;
use crate::run::model::RunSummary;
use colored::Colorize;

const RULE_WIDTH: usize = 80;

/// Progress output while a run is in flight. Silent when the summary is
/// emitted as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Reporter { quiet }
    }

    pub fn banner(&self, title: &str, target: &str, user_email: &str) {
        if self.quiet {
            return;
        }
        println!("{}", title.blue().bold());
        println!("  Testing against: {}", target.white().bold());
        println!("  Test user: {}", user_email.dimmed());
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", format!("=== {} ===", title).cyan());
        }
    }

    pub fn result(&self, result: &TestResult) {
        if self.quiet {
            return;
        }
        if result.passed {
            println!("{} {}", "✓ PASS:".green(), result.test_name);
        } else {
            println!("{} {}", "✗ FAIL:".red(), result.test_name);
        }
        if !result.message.is_empty() {
            println!("   {}", result.message.dimmed());
        }
    }

    pub fn cleanup(&self, id: &str, deleted: bool) {
        if self.quiet {
            return;
        }
        if deleted {
            println!("  {} Deleted link: {}", "✓".green(), id);
        } else {
            println!("  {} Failed to delete link: {}", "✗".red(), id);
        }
    }
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut lines = vec![
        String::new(),
        "=".repeat(RULE_WIDTH),
        "TEST SUMMARY".bold().to_string(),
        "=".repeat(RULE_WIDTH),
        format!("{} {}", "Passed:".green(), summary.passed_count),
        format!("{} {}", "Failed:".red(), summary.failed_count),
        format!("Success Rate: {:.1}%", summary.success_rate()),
    ];
    if !summary.cleanup.failed.is_empty() {
        lines.push(format!(
            "{} {} link(s) could not be deleted",
            "Cleanup:".yellow(),
            summary.cleanup.failed.len()
        ));
    }
    if !summary.messages.is_empty() {
        lines.push(String::new());
        lines.push("FAILED TESTS:".red().bold().to_string());
        for message in &summary.messages {
            lines.push(format!("   • {}", message));
        }
    }
    lines.push(String::new());
    lines.push("=".repeat(RULE_WIDTH));
    if summary.is_success() {
        lines.push("ALL TESTS PASSED! Backend is working correctly.".green().bold().to_string());
    } else {
        lines.push("Some tests failed. Please review the errors above.".yellow().to_string());
    }
    lines.join("\n")
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", render_summary(summary));
}
