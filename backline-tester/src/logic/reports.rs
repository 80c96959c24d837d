use anyhow::Result;
use backline_game::numbers::percentage;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use super::simulation::{CampaignAggregate, CampaignRecord};

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    campaigns: Option<&CampaignAggregate>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(
        out,
        "Success rate: {:.1}%",
        percentage(passed_tests, total_tests)
    )?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.average_duration),
        results.iter().max_by_key(|r| r.average_duration),
    ) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }

    if let Some(aggregate) = campaigns {
        writeln!(out)?;
        writeln!(out, "{}", "🎸 Campaign Balance".bright_magenta().bold())?;
        writeln!(out, "{}", "===================".magenta())?;
        writeln!(out, "Runs: {}", aggregate.runs)?;
        writeln!(out, "Mean revenue: ${:.0}", aggregate.mean_revenue)?;
        writeln!(out, "Mean attendance: {:.0}", aggregate.mean_attendance)?;
        writeln!(out, "Mean reputation: {:+.1}", aggregate.mean_reputation)?;
        writeln!(
            out,
            "Show success rate: {:.1}%",
            aggregate.success_rate * 100.0
        )?;
        writeln!(out, "Drama rate: {:.1}%", aggregate.drama_rate * 100.0)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(out, "# Backline Logic Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(
        out,
        "- **Success rate**: {:.1}%\n",
        percentage(passed_tests, total_tests)
    )?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {} (seed {})\n", status, result.scenario_name, result.seed)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_csv_report<W: Write + ?Sized>(out: &mut W, records: &[CampaignRecord]) -> Result<()> {
    writeln!(
        out,
        "seed,rounds,total_attendance,total_revenue,reputation,fans,successes,dramas,final_tier,relationships,mean_affinity"
    )?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{:.2}",
            r.seed,
            r.rounds,
            r.total_attendance,
            r.total_revenue,
            r.reputation,
            r.fans,
            r.successes,
            r.dramas,
            r.final_tier,
            r.relationships,
            r.mean_affinity
        )?;
    }
    Ok(())
}
