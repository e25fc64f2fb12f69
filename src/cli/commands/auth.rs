use clap::Subcommand;
use chrono::Utc;
use serde_json::{json, Value};

use crate::abilities::Action;
use crate::api::{CurrentUserResponse, LoginRequest, LoginResponse};
use crate::cli::config::{load_server_config, save_server_config, session_store, ServerConfig};
use crate::cli::utils::{output_error, output_json, output_success, ApiClient};
use crate::cli::OutputFormat;
use crate::client::ClientSession;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and cache the returned ability rules")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "FRANCHISE_PASSWORD", help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Revoke the session and clear cached rules")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status {
        #[arg(long, help = "Confirm the session with the server")]
        remote: bool,
    },

    #[command(about = "Check an action against the cached ability rules")]
    Can {
        #[arg(help = "create, read, update, delete or manage")]
        action: Action,
        #[arg(help = "Subject, e.g. Lead")]
        subject: String,
    },
}

pub async fn handle(cmd: AuthCommands, server_url: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = ClientSession::load(session_store()?);

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };

            let client = ApiClient::new(&server_url);
            let request = LoginRequest {
                email: Some(email),
                password: Some(password),
            };
            let response: LoginResponse = client.post("/auth/login", &request, None).await?;
            let user = response.user_data.clone();
            let rule_count = response.user_ability_rules.len();
            session.apply_login(response)?;

            save_server_config(&ServerConfig {
                url: server_url,
                last_login: Some(Utc::now()),
            })?;

            output_success(
                &output_format,
                &format!("Logged in as {} ({}), {} ability rules cached", user.email, user.role, rule_count),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            if let Some(token) = session.access_token()? {
                let client = ApiClient::new(&server_url);
                let revoked: anyhow::Result<Value> = client.post("/auth/logout", &json!({}), Some(&token)).await;
                if let Err(e) = revoked {
                    tracing::warn!("Server did not confirm logout: {}", e);
                }
            }
            session.logout()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status { remote } => {
            let Some(token) = session.access_token()? else {
                return output_error(&output_format, "Not logged in", Some("NOT_LOGGED_IN"));
            };

            if remote {
                let client = ApiClient::new(&server_url);
                let current: CurrentUserResponse = client.get("/auth/user", Some(&token)).await?;
                return match output_format {
                    OutputFormat::Json => output_json(&current),
                    OutputFormat::Text => {
                        println!("Server: {}", client.base_url());
                        print_user(&current.user_data.email, &current.user_data.role, current.user_ability_rules.len());
                        Ok(())
                    }
                };
            }

            let user = session.user()?;
            let rules = session.abilities().rules().clone();
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "logged_in": true,
                    "server": load_server_config()?.url,
                    "user": user,
                    "userAbilityRules": rules,
                })),
                OutputFormat::Text => {
                    match user {
                        Some(user) => print_user(&user.email, &user.role, rules.len()),
                        None => println!("Logged in (no cached user data)"),
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Can { action, subject } => {
            let allowed = session.abilities().can(action, &subject);
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "action": action,
                    "subject": subject,
                    "allowed": allowed,
                })),
                OutputFormat::Text => {
                    println!("{} {}: {}", action, subject, if allowed { "allowed" } else { "denied" });
                    Ok(())
                }
            }
        }
    }
}

fn print_user(email: &str, role: &str, rule_count: usize) {
    println!("Logged in as {} ({})", email, role);
    println!("Ability rules: {}", rule_count);
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
