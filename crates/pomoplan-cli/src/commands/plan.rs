use chrono::Utc;
use clap::Subcommand;
use pomoplan_core::timer::{format_clock_face, format_total};
use pomoplan_core::{Config, Plan};

use super::resolve_choice;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Print the interval plan for a total duration
    Show {
        /// Pomodoro format: short, long or custom (defaults to config)
        #[arg(long)]
        format: Option<String>,
        /// Total minutes (see `plan options`)
        #[arg(long)]
        total: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the total durations offered for a format
    Options {
        /// Pomodoro format: short, long or custom (defaults to config)
        #[arg(long)]
        format: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        PlanAction::Show {
            format,
            total,
            json,
        } => {
            let (format, total) = resolve_choice(&config, format.as_deref(), total)?;
            let plan = Plan::generate(format, total, Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            println!("{format}, {}", format_total(total));
            for interval in &plan.intervals {
                let kind = if interval.is_break { "break" } else { "work" };
                println!(
                    "  {}  {:<5}  {}",
                    format_clock_face(interval.scheduled_start),
                    kind,
                    interval.label
                );
            }
            println!("Focus time: {}", format_total(plan.work_duration_min() as u32));
        }
        PlanAction::Options { format, json } => {
            let format = config.resolve_format(format.as_deref())?;
            let options = format.total_minute_options();
            if json {
                let list: Vec<_> = options
                    .iter()
                    .map(|m| serde_json::json!({ "minutes": m, "label": format_total(*m) }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
                return Ok(());
            }
            println!("{format}:");
            for minutes in options {
                println!("  {minutes:>4}  {}", format_total(minutes));
            }
        }
    }
    Ok(())
}
