use anyhow::Context;
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use workflow::config::ScenarioConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the range-Doppler radar core")]
struct Args {
    /// Run one offline burst and print the range-Doppler summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a scenario config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 128)]
    range_bins: usize,
    #[arg(long, default_value_t = 128)]
    pulse_count: usize,
    #[arg(long, default_value_t = 50)]
    target_range: usize,
    #[arg(long, default_value_t = 32)]
    target_doppler: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = if let Some(path) = args.workflow {
        ScenarioConfig::load(path)?
    } else {
        ScenarioConfig::from_args(
            args.range_bins,
            args.pulse_count,
            args.target_range,
            args.target_doppler,
        )
    };

    let runner = Runner::new(scenario);

    if args.offline {
        let summary = runner.execute()?;

        println!(
            "Offline run -> {} output samples, doppler counters {}/{}, peak |{:.4}| at range {} doppler {}",
            summary.output_samples,
            summary.doppler_input_count,
            summary.doppler_output_count,
            summary.peak_magnitude,
            summary.peak_range_bin,
            summary.peak_doppler_bin
        );

        let report =
            serde_json::to_string(&summary).context("serializing run summary")?;
        let report_path = PathBuf::from("tools/data/offline_summary.jsonl");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        writeln!(file, "{}", report)?;
    }

    Ok(())
}
