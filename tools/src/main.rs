//! upi-datagen: headless synthetic UPI dataset generator.
//!
//! Usage:
//!   upi-datagen --nrows 1000000 --out data/upi_transactions.csv
//!   upi-datagen --nrows 1000 --users 50 --fraud_ratio 0.01 --seed 42
//!
//! With --anchor (unix seconds) the history window is pinned, making
//! the output byte-for-byte reproducible across machines and days.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Timelike, Utc};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use upigen_core::{config::GeneratorConfig, generator::Generator, writer::OutputWriter};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let nrows = parse_arg(&args, "--nrows", GeneratorConfig::DEFAULT_NROWS)?;
    let users = parse_arg(&args, "--users", GeneratorConfig::DEFAULT_USERS)?;
    let fraud_ratio = parse_arg(&args, "--fraud_ratio", GeneratorConfig::DEFAULT_FRAUD_RATIO)?;
    let seed = parse_arg(&args, "--seed", GeneratorConfig::DEFAULT_SEED)?;
    let out = args
        .windows(2)
        .find(|w| w[0] == "--out")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "data/upi_transactions.csv".to_string());
    let baselines_out = args
        .windows(2)
        .find(|w| w[0] == "--baselines")
        .map(|w| w[1].clone());

    let window_end = match args.windows(2).find(|w| w[0] == "--anchor") {
        Some(w) => {
            let secs: i64 = w[1].parse().context("--anchor must be unix seconds")?;
            DateTime::from_timestamp(secs, 0)
                .context("--anchor out of range")?
                .naive_utc()
        }
        None => {
            let now = Utc::now().naive_utc();
            now.with_nanosecond(0).unwrap_or(now)
        }
    };

    println!("upi-datagen — synthetic UPI transactions");
    println!("  seed:        {seed}");
    println!("  nrows:       {nrows}");
    println!("  users:       {users}");
    println!("  fraud_ratio: {fraud_ratio}");
    println!("  out:         {out}");
    println!();

    let mut config = GeneratorConfig::new(window_end);
    config.nrows = nrows;
    config.users = users;
    config.fraud_ratio = fraud_ratio;
    config.seed = seed;

    let generator = Generator::new(config)?;
    let mut writer = OutputWriter::create(&out)?;

    let started = std::time::Instant::now();
    let (summary, baselines) = generator.run(&mut writer)?;
    writer.finish()?;

    if let Some(path) = baselines_out {
        write_baselines(&path, &baselines)?;
        println!("baseline snapshot written to {path}");
    }

    println!("=== GENERATION SUMMARY ===");
    println!("  out:        {out}");
    println!("  rows:       {}", summary.total());
    println!("  non-fraud:  {}", summary.nonfraud);
    println!("  fraud:      {}", summary.total_fraud());
    for pattern in &summary.fraud_counts {
        println!("    {:<18} {}", pattern.name, pattern.count);
    }
    println!("  elapsed:    {:.1}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn write_baselines(path: &str, baselines: &upigen_core::baseline::BaselineSnapshot) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    baselines.write_json(BufWriter::new(file))?;
    Ok(())
}

/// Parse `flag`'s value, or fall back to `default` when the flag is
/// absent. A flag that is present but unparsable is a fatal error:
/// a typo must never silently become a full default-size run.
fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> Result<T> {
    match args.windows(2).find(|w| w[0] == flag) {
        Some(w) => match w[1].parse() {
            Ok(value) => Ok(value),
            Err(_) => bail!("invalid value for {flag}: {:?}", w[1]),
        },
        None => Ok(default),
    }
}
