//! Token Validator CLI
//!
//! Validates `address network` pairs and prints the results as JSON.
//!
//! Usage:
//!   token_validator <address> <network> [<address> <network> ...] [--check-lists]
//!
//! One pair runs a single validation, several pairs run as a paced batch.
//! Logs go to stderr so stdout stays machine-readable.

use token_validator::{TokenValidator, ValidateOptions, ValidationRequest, ValidatorConfig};

use eyre::{eyre, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let check_token_lists = match args.iter().position(|a| a == "--check-lists") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };

    if args.is_empty() || args.len() % 2 != 0 {
        eprintln!("Usage: token_validator <address> <network> [<address> <network> ...] [--check-lists]");
        eprintln!("Networks: base, ethereum, base-testnet, solana, solana-devnet");
        return Err(eyre!("expected address/network pairs"));
    }

    let requests: Vec<ValidationRequest> = args
        .chunks(2)
        .map(|pair| ValidationRequest::new(pair[0].clone(), pair[1].clone()))
        .collect();

    let validator = TokenValidator::new(ValidatorConfig::from_env())?;
    let options = ValidateOptions { check_token_lists };

    let output = if let [request] = requests.as_slice() {
        let result = validator.validate_request(request, options).await;
        serde_json::to_string_pretty(&result)?
    } else {
        let results = token_validator::BatchCoordinator::new(&validator)
            .with_options(options)
            .run(&requests)
            .await;
        serde_json::to_string_pretty(&results)?
    };
    println!("{}", output);

    Ok(())
}
