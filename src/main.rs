use anyhow::{Context, Result};
use clap::Parser;

use croupier::config::{CliArgs, Config};
use croupier::report::{self, CsvReport, LineupSummary};
use croupier::Experiment;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = Config::load(&args)?;
    config.validate()?;

    println!("croupier v{}", env!("CARGO_PKG_VERSION"));
    println!("Trials per lineup: {}", config.trials);
    println!("Seed: {}", config.seed);
    println!("Payout order: {}", config.payout_order);

    let mut summaries = Vec::new();
    for spec in config.selected_lineups(args.lineup.as_deref())? {
        let experiment = Experiment::new(spec, &config)?;
        println!();
        println!(
            "Lineup '{}': {}",
            experiment.name,
            spec.policies.join(", ")
        );

        let outcomes = if args.verbose {
            experiment.run_traced()
        } else {
            experiment.run()
        };

        let mut csv = CsvReport::create(&config.out_dir, &experiment.name, &experiment.slot_policies())
            .with_context(|| format!("lineup '{}'", experiment.name))?;
        for outcome in &outcomes {
            csv.write_row(outcome)?;
        }
        csv.flush()?;

        let summary =
            LineupSummary::from_outcomes(&experiment.name, &experiment.slot_policies(), &outcomes);
        report::print_summary(&summary);
        summaries.push(summary);
    }

    if let Some(path) = &args.summary {
        report::write_summary_json(path, &summaries)?;
        println!();
        println!("Summary saved to: {}", path.display());
    }

    Ok(())
}
