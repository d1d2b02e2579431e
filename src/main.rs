use anyhow::Result;
use clap::Parser;
use dmlatency::{
    cli::Cli,
    config::MonitorConfig,
    latency::Evaluator,
    monitor::Monitor,
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Build the effective configuration: defaults, then --config, then flags
fn load_config(args: &Cli) -> Result<MonitorConfig> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    tracing::debug!("Effective configuration: {:?}", config);

    let evaluator = Evaluator::new(config.environment());
    let mut monitor = Monitor::new(evaluator, config.effective_targets(), args.format);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    monitor.run(config.round_limit(), config.interval(), &mut out)?;

    Ok(())
}
