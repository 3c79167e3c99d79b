use anyhow::{anyhow, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

mod config;

#[derive(Debug, Parser)]
#[command(
    name = "flowtag",
    version,
    about = "Tag flow-log records against a (port, protocol) lookup table"
)]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./flowtag.yaml if present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Lookup table CSV with dstport, protocol and tag columns
    #[arg(long)]
    lookup: Option<PathBuf>,
    /// Flow log to classify (whitespace-delimited records)
    #[arg(long)]
    flow_log: Option<PathBuf>,
    /// Output CSV for per-tag counts
    #[arg(long)]
    tag_report: Option<PathBuf>,
    /// Output CSV for per-(port, protocol) counts
    #[arg(long)]
    port_protocol_report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref()).unwrap_or_default();

    let lookup_path = cli
        .lookup
        .or(cfg.lookup)
        .ok_or_else(|| anyhow!("provide --lookup <file> or set lookup in the config"))?;
    let flow_log_path = cli
        .flow_log
        .or(cfg.flow_log)
        .ok_or_else(|| anyhow!("provide --flow-log <file> or set flow_log in the config"))?;
    let tag_report_path = cli
        .tag_report
        .or(cfg.tag_report)
        .unwrap_or_else(|| PathBuf::from("tag_counts.csv"));
    let pair_report_path = cli
        .port_protocol_report
        .or(cfg.port_protocol_report)
        .unwrap_or_else(|| PathBuf::from("port_protocol_counts.csv"));

    let lookup_file = File::open(&lookup_path)
        .map_err(|e| anyhow!("failed to open {}: {}", lookup_path.display(), e))?;
    let table = lookup_table::load_lookup_table(lookup_file, |row| {
        eprintln!("{}: skipping row at line {}: {}", lookup_path.display(), row.line, row.reason);
    })?;

    let flow_file = File::open(&flow_log_path)
        .map_err(|e| anyhow!("failed to open {}: {}", flow_log_path.display(), e))?;
    let tallies = flow_log::scan_flow_log(flow_file, &table)?;

    // Both inputs parsed cleanly; only now do the output files get created.
    flow_report::write_tag_report(
        BufWriter::new(File::create(&tag_report_path)?),
        &tallies.tag_counts,
        tallies.untagged,
    )?;
    flow_report::write_port_protocol_report(
        BufWriter::new(File::create(&pair_report_path)?),
        &tallies.port_protocol_counts,
    )?;

    println!(
        "{} tags, {} untagged, {} port/protocol pairs -> {} and {}",
        tallies.tag_counts.len(),
        tallies.untagged,
        tallies.port_protocol_counts.len(),
        tag_report_path.display(),
        pair_report_path.display()
    );
    Ok(())
}
