//! `converge status` - report which hosts already match the deploy

use crate::Context;
use crate::cli::StatusArgs;
use crate::progress::HostProgress;
use crate::ui;
use anyhow::Result;
use declarative::{HostReport, PlanSummary, group_by_type};

/// Exit code when some host needs changes
pub const EXIT_CHANGES: i32 = 2;
/// Exit code when some operation could not be planned
pub const EXIT_FAILED: i32 = 1;

/// Print per-host compliance and return the process exit code
pub fn run(ctx: &Context, args: &StatusArgs) -> Result<i32> {
    let deploy = super::load(&args.deploy)?;
    let jobs = deploy.jobs(None);

    let mut progress = HostProgress::new(ctx.quiet);
    let reports = deploy.plan_hosts(jobs, &mut progress)?;

    if !ctx.quiet {
        ui::info(&format!(
            "{} against {}",
            deploy.path.display(),
            ui::count(reports.len(), "host")
        ));
    }
    for report in &reports {
        print_host(ctx, report);
    }

    Ok(exit_code(&PlanSummary::from_reports(&reports)))
}

fn print_host(ctx: &Context, report: &HostReport) {
    let failed = report.steps.iter().filter(|s| s.is_failed()).count();
    let changed = report.steps.iter().filter(|s| s.is_change()).count();

    if failed > 0 {
        ui::error(&format!(
            "{}: {} failed",
            report.host,
            ui::count(failed, "operation")
        ));
    } else if changed > 0 {
        ui::warn(&format!(
            "{}: {} out of date",
            report.host,
            ui::count(changed, "operation")
        ));
    } else {
        ui::success(&format!("{}: up to date", report.host));
    }

    if ctx.verbose > 0 {
        for (kind, steps) in group_by_type(report) {
            for step in steps.into_iter().filter(|s| s.is_change() || s.is_failed()) {
                ui::dim(&format!("{kind}: {}", step.description));
            }
        }
    }
}

/// Failures take precedence over pending changes
pub fn exit_code(summary: &PlanSummary) -> i32 {
    if !summary.is_success() {
        EXIT_FAILED
    } else if summary.has_changes() {
        EXIT_CHANGES
    } else {
        0
    }
}
