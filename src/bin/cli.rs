use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde_json::Value;

use rollcall_auth::{TokenService, device_fingerprint, new_session_id};
use rollcall_config::TokenConfig;

#[derive(Parser)]
#[command(name = "rollcall-cli")]
#[command(about = "Rollcall CLI - Token administration for Rollcall", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a long token for an account
    IssueLongToken {
        /// User id carried in the token
        user_id: String,

        /// Stable account key carried in the token
        user_key: String,
    },
    /// Issue a short token bound to a new session and a device
    IssueShortToken {
        user_id: String,

        user_key: String,

        /// Device metadata as a JSON object
        #[arg(short = 'd', long, default_value = "{}")]
        device: String,
    },
    /// Verify a token and print its claims
    Verify {
        token: String,

        /// Verify against the long token secret instead of the short one
        #[arg(short = 'l', long)]
        long: bool,
    },
}

fn main() {
    dotenv().ok();

    let tokens = TokenService::new(TokenConfig::from_env());
    let cli = Cli::parse();

    match cli.command {
        Commands::IssueLongToken { user_id, user_key } => {
            match tokens.issue_long_token(&user_id, &user_key) {
                Ok(token) => println!("{}", token),
                Err(e) => fail("issuing long token", e.error),
            }
        }
        Commands::IssueShortToken {
            user_id,
            user_key,
            device,
        } => handle_issue_short_token(&tokens, &user_id, &user_key, &device),
        Commands::Verify { token, long } => handle_verify(&tokens, &token, long),
    }
}

fn handle_issue_short_token(tokens: &TokenService, user_id: &str, user_key: &str, device: &str) {
    let device: Value = match serde_json::from_str(device) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => fail("parsing device", "device must be a JSON object"),
        Err(e) => fail("parsing device", e),
    };

    let session_id = new_session_id();
    let device_id = device_fingerprint(&device);

    match tokens.issue_short_token(user_id, user_key, &session_id, &device_id) {
        Ok(token) => {
            println!("{}", token);
            eprintln!("   Session: {}", session_id);
            eprintln!("   Device: {}", device_id);
        }
        Err(e) => fail("issuing short token", e.error),
    }
}

fn handle_verify(tokens: &TokenService, token: &str, long: bool) {
    let claims = if long {
        tokens.verify_long(token)
    } else {
        tokens.verify_short(token)
    };

    let Some(claims) = claims else {
        fail("verifying token", "invalid or expired token");
    };

    match serde_json::to_string_pretty(&claims) {
        Ok(json) => println!("{}", json),
        Err(e) => fail("printing claims", e),
    }
}

fn fail(action: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("❌ Error {}: {}", action, e);
    std::process::exit(1);
}
