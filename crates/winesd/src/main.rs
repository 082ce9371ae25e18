use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod ui;

use cli::App;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let app = App::parse();
    init_logging(app.verbose);

    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

/// Join the cause chain, skipping a cause its direct wrapper already quotes.
fn describe(e: &anyhow::Error) -> String {
    let mut parts = Vec::new();
    let mut above: Option<String> = None;
    for cause in e.chain() {
        let text = cause.to_string();
        if !above.as_deref().is_some_and(|outer| outer.contains(&text)) {
            parts.push(text.clone());
        }
        above = Some(text);
    }
    parts.join(": ")
}
