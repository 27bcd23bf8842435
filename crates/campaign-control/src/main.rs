//! Command-line entry point for the campaign control backends.
//!
//! ```text
//! campaign-control dial <phone-number>
//! campaign-control pitch <product-name> <product-url>
//! campaign-control check
//! ```
//!
//! The config file path comes from `CAMPAIGN_CONFIG_PATH`, defaulting to
//! `campaign.toml`.

use campaign_control::{load_config, telemetry, Config, DialerClient, PitchClient};
use std::process::ExitCode;

fn resolve_config_path() -> (String, &'static str) {
    match std::env::var("CAMPAIGN_CONFIG_PATH") {
        Ok(path) if !path.trim().is_empty() => (path, "env-var"),
        _ => ("campaign.toml".to_string(), "default"),
    }
}

fn usage() -> ExitCode {
    eprintln!("usage: campaign-control <dial NUMBER | pitch NAME URL | check>");
    ExitCode::from(2)
}

/// Reports whether demo calls can run with the loaded credentials.
fn check(config: &Config) -> ExitCode {
    let missing = config.vapi.missing_credentials();
    if missing.is_empty() {
        println!("voice credentials configured");
        ExitCode::SUCCESS
    } else {
        println!("missing voice credentials: {}", missing.join(", "));
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let (path, source) = resolve_config_path();
    let config = match load_config(Some(&path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init_tracing(&config.logging) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(source, path = %path, "resolved configuration path");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["dial", number] => DialerClient::new(&config.services.dialer_url)
            .start_call(number)
            .await
            .map(|outcome| outcome.message()),
        ["pitch", name, url] => {
            PitchClient::new(&config.services.pitch_url)
                .generate_prompt(name, url)
                .await
        }
        ["check"] => return check(&config),
        _ => return usage(),
    };

    match outcome {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
