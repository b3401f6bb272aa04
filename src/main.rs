use hearth::config::Config;
use hearth::server;

fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level())
        .init();

    cfg.validate()?;

    tracing::info!(port = cfg.port, workers = cfg.workers, "Starting server");
    server::listener::run(&cfg)
}
