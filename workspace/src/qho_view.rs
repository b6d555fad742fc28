use std::{
    io::{ self, BufRead, Write },
    path::PathBuf,
    thread,
    time::{ Duration, Instant },
};
use anyhow::Context;
use clap::Parser;
use qhowave::{
    config::Config,
    render::Mailbox,
    scheduler::{ Controls, UpdateScheduler },
    wavefunction::Sample,
};
use tracing_subscriber::EnvFilter;

// headless front end: animate an eigenstate, reading controls from stdin
//
// stdin commands, one per line:
//   n <quantum number>
//   t <time>
//   speed <multiplier>

#[derive(Parser)]
#[command(
    name = "qho_view",
    about = "Animate a quantum harmonic oscillator eigenstate",
)]
struct Cli {
    /// TOML configuration file; defaults are used if omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Initial quantum number.
    #[arg(short, long, default_value_t = 0)]
    n: usize,

    /// Stop after displaying this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Stop after this many seconds.
    #[arg(long, value_name = "SECS")]
    duration: Option<f64>,

    /// Write every displayed sample to stdout as a JSON line.
    #[arg(long)]
    json: bool,

    /// Don't run the clock; time only moves with `t` commands.
    #[arg(long)]
    paused: bool,

    /// Don't read commands from stdin.
    #[arg(long)]
    no_input: bool,
}

fn read_commands(controls: Controls) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break; };
        let mut words = line.split_whitespace();
        let res = match (words.next(), words.next()) {
            (Some("n"), Some(v)) => v.parse::<usize>()
                .map_err(anyhow::Error::from)
                .and_then(|n| Ok(controls.select_quantum_number(n)?)),
            (Some("t"), Some(v)) => v.parse::<f64>()
                .map_err(anyhow::Error::from)
                .and_then(|t| Ok(controls.set_time(t)?)),
            (Some("speed"), Some(v)) => v.parse::<f64>()
                .map_err(anyhow::Error::from)
                .and_then(|s| Ok(controls.set_speed(s)?)),
            (None, _) => Ok(()),
            _ => Err(anyhow::anyhow!("unrecognized command {line:?}")),
        };
        if let Err(err) = res {
            tracing::warn!("{err:#}");
        }
    }
}

fn show(sample: &Sample, json: bool, out: &mut impl Write)
    -> anyhow::Result<()>
{
    if json {
        serde_json::to_writer(&mut *out, sample)?;
        writeln!(out)?;
    } else {
        let (x0, p0) = sample.peak().unwrap_or((f64::NAN, f64::NAN));
        tracing::info!(
            norm = sample.norm(),
            peak_x = x0,
            peak_p = p0,
            re0 = sample.real[sample.len() / 2],
            "{}",
            sample.label().replace('\n', ", "),
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("invalid configuration {}", path.display()))?,
        None => Config::default(),
    };
    if cli.paused { config.clock.enabled = false; }

    let mailbox = Mailbox::new();
    let sched = UpdateScheduler::new(config, mailbox.clone())
        .context("invalid configuration")?;
    let controls = sched.controls();
    controls.select_quantum_number(cli.n)?;
    let handle = sched.spawn().context("failed to start pipeline")?;

    if !cli.no_input {
        let controls = controls.clone();
        thread::spawn(move || read_commands(controls));
    }

    let start = Instant::now();
    let deadline = cli.duration.map(Duration::try_from_secs_f64)
        .transpose()
        .context("invalid duration")?;
    let mut shown: u64 = 0;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        if cli.frames.is_some_and(|f| shown >= f) { break; }
        if deadline.is_some_and(|d| start.elapsed() >= d) { break; }
        if let Some(sample) = mailbox.wait(Duration::from_millis(100)) {
            show(&sample, cli.json, &mut out)?;
            shown += 1;
        }
    }

    handle.shutdown();
    tracing::info!(frames = shown, "done");
    Ok(())
}
