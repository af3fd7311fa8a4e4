use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::error;
use std::process;
use xkcd_downloader::configuration::Settings;
use xkcd_downloader::run::run;

#[derive(clap::Parser)]
struct Args {
    #[clap(short, long, default_value = "xkcd.json")]
    config_file: String,
}

#[tokio::main]
async fn main() {
    // Init logging
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(Target::Stdout);
    builder.init();

    // Parse Args
    let args = Args::parse();

    // Parse Settings
    let settings = Settings::new(&args.config_file);
    if let Err(e) = settings {
        error!("Configuration error: {}", e);
        process::exit(1);
    }
    let s = settings.unwrap();

    // Run
    match run(s).await {
        Ok(report) => {
            if !report.failed.is_empty() {
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Application error: {}", e);
            process::exit(1);
        }
    }
}
