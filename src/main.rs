use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, error, info};

use ox_profile::views::{self, App, Registration, ViewError, ViewOutcome};
use ox_profile::{load_config_from_path, ProfileConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "ox_profile.yaml")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session
    Login { username: String, password: String },
    /// Create an account and log straight in
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    Logout,
    /// Show the saved profile of the logged-in user
    Dashboard,
    /// List every saved record
    Records,
    /// Edit a record: --set field=value, repeatable
    Edit {
        id: i64,
        #[arg(short, long = "set", value_parser = parse_key_val, action = clap::ArgAction::Append)]
        set: Vec<(String, String)>,
    },
    Create {
        #[arg(short, long = "set", value_parser = parse_key_val, action = clap::ArgAction::Append)]
        set: Vec<(String, String)>,
    },
    Delete { id: i64 },
    PasswordUpdate {
        current_password: String,
        new_password: String,
        confirm_password: String,
    },
    PasswordReset {
        email: String,
        new_password: String,
        confirm_password: String,
    },
    /// Print the active profile schema
    Schema,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid FIELD=VALUE format: no `=` found in `{}`", s))?;
    Ok((s[..pos].trim().to_string(), s[pos + 1..].to_string()))
}

fn init_logging(config: &ProfileConfig) -> anyhow::Result<()> {
    match &config.log4rs_config {
        Some(path) => {
            log4rs::init_file(path, Default::default())
                .with_context(|| format!("Failed to initialize log4rs from {}", path))?;
            info!("log4rs initialized from {}", path);
        }
        None => env_logger::init(),
    }
    Ok(())
}

async fn run(app: &App, command: Command) -> Result<ViewOutcome, ViewError> {
    match command {
        Command::Login { username, password } => views::login(app, &username, &password).await,
        Command::Register {
            username,
            email,
            password,
            confirm_password,
            name,
        } => {
            let registration = Registration {
                username,
                name,
                email,
                password,
                confirm_password,
            };
            views::register(app, &registration).await
        }
        Command::Logout => views::logout(app),
        Command::Dashboard => views::dashboard(app).await,
        Command::Records => views::records(app).await,
        Command::Edit { id, set } => views::edit(app, id, &set).await,
        Command::Create { set } => views::create(app, &set).await,
        Command::Delete { id } => views::delete(app, id).await,
        Command::PasswordUpdate {
            current_password,
            new_password,
            confirm_password,
        } => views::password_update(app, &current_password, &new_password, &confirm_password).await,
        Command::PasswordReset {
            email,
            new_password,
            confirm_password,
        } => views::password_reset(app, &email, &new_password, &confirm_password).await,
        Command::Schema => views::schema(app).await,
    }
}

fn print_outcome(outcome: &ViewOutcome) {
    println!("{}", outcome.message);
    for row in &outcome.rows {
        println!("  {:<24} {}", row.label, row.value);
    }
    if let Some(route) = &outcome.navigate {
        println!("-> {}", route);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config_from_path(Path::new(&cli.config))
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    init_logging(&config)?;

    info!("Starting ox_profile...");
    debug!("CLI arguments: {:?}", cli);

    let app = App::new(config).context("Failed to open the session store")?;
    match run(&app, cli.command).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            if let ViewError::Form(form_error) = &e {
                for field_error in form_error.field_errors() {
                    eprintln!("  {}: {}", field_error.field, field_error.message);
                }
            }
            Err(anyhow::anyhow!(e.user_message()))
        }
    }
}
