use clap::Subcommand;
use serde_json::json;
use std::io::{BufRead, Write};

use crate::cli::{config, utils, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the session token")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and discard the session token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let dispatcher = config::build_dispatcher()?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };

            let body = json!({ "email": email, "password": password });
            let response = dispatcher.post("/auth/login", &body).await?;

            // Token arrives either at the top level or under a data wrapper
            let token = response
                .get("token")
                .or_else(|| response.get("data").and_then(|d| d.get("token")))
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("login response contained no token"))?;

            dispatcher.session().login(token)?;
            utils::output_success(&output_format, &format!("Logged in as {}", email), None)
        }
        AuthCommands::Logout => {
            dispatcher.session().logout()?;
            utils::output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            if dispatcher.session().is_authenticated() {
                utils::output_success(&output_format, "Authenticated (token present)", None)
            } else {
                utils::output_error(&output_format, "Not authenticated")
            }
        }
    }
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
