mod command;
mod model;
mod util;

fn main() -> anyhow::Result<()> {
    init_tracing();
    command::run()
}

/// Logs go to stderr so that JSON written to stdout stays parseable.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
