use anyhow::Context;
use clap::Subcommand;
use serde::Deserialize;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Request a token for a subject from the admin API")]
    Issue {
        #[arg(help = "Subject (user id) the token is issued for")]
        subject: String,
        #[arg(long, help = "Grant admin privileges")]
        admin: bool,
        #[arg(long, env = "GATEWAY_ADMIN_URL", default_value = "http://127.0.0.1:8081", help = "Admin API base URL")]
        admin_url: String,
    },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { subject, admin, admin_url } => {
            let url = format!("{}/admin/token", admin_url.trim_end_matches('/'));
            let response = reqwest::Client::new()
                .post(&url)
                .json(&json!({ "subject": subject, "admin": admin }))
                .send()
                .await
                .with_context(|| format!("failed to reach admin API at {}", url))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("admin API returned {}: {}", status, body);
            }

            let body: TokenResponse = response.json().await.context("unexpected admin API response")?;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "subject": subject, "admin": admin, "token": body.token })),
                ),
                // Bare token so it can be captured by shell scripts
                OutputFormat::Text => {
                    println!("{}", body.token);
                    Ok(())
                }
            }
        }
    }
}
