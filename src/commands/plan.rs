//! `converge plan` - print the commands each host needs

use crate::Context;
use crate::cli::PlanArgs;
use crate::progress::HostProgress;
use crate::ui;
use anyhow::Result;
use chrono::{DateTime, Utc};
use declarative::{HostReport, PlanSummary};
use serde::Serialize;

/// JSON form of a plan
#[derive(Debug, Serialize)]
pub struct PlanReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub deploy: String,
    pub summary: PlanSummary,
    pub hosts: &'a [HostReport],
}

pub fn run(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let deploy = super::load(&args.deploy)?;
    let jobs = deploy.jobs(args.jobs);

    let mut progress = HostProgress::new(ctx.quiet || args.json);
    let reports = deploy.plan_hosts(jobs, &mut progress)?;
    let summary = PlanSummary::from_reports(&reports);

    if args.json {
        let report = PlanReport {
            generated_at: Utc::now(),
            deploy: deploy.path.display().to_string(),
            summary,
            hosts: &reports,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for report in &reports {
        print_host(ctx, report);
    }
    print_summary(&summary);
    Ok(())
}

fn print_host(ctx: &Context, report: &HostReport) {
    ui::header(&report.host);

    for step in &report.steps {
        if let Some(error) = &step.error {
            ui::error(&format!("{}: {error}", step.description));
            continue;
        }
        for command in &step.outcome.commands {
            ui::command(command);
        }
        if !ctx.quiet {
            for observation in &step.outcome.observations {
                ui::dim(&observation.to_string());
            }
        }
    }

    if !report.has_changes() && !report.has_failures() {
        ui::dim("nothing to do");
    }
}

fn print_summary(summary: &PlanSummary) {
    ui::section("Summary");
    ui::kv("hosts", &format!("{} ({} changed)", summary.hosts, summary.hosts_changed));
    ui::kv(
        "operations",
        &format!("{} changed, {} unchanged", summary.changed, summary.unchanged),
    );
    ui::kv("commands", &summary.commands.to_string());
    if !summary.is_success() {
        ui::warn(&format!("{} could not be planned", ui::count(summary.failed, "operation")));
    }
}
