use anyhow::Result;
use env_logger::Env;

#[tokio::main]
async fn main() -> Result<()> {
    let config = mpdcast::args::parse();
    init_logging(config.verbose);
    mpdcast::run(config).await
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}
