pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "gatewayctl")]
#[command(about = "Operator CLI for the Lifelink gateway: module registry and tokens")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, conflicts_with = "json", help = "Output in human-readable text format (default)")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Access token management via the admin API")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Module registry management")]
    Module {
        #[command(subcommand)]
        cmd: commands::module::ModuleCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        match (cli.text, cli.json) {
            (false, true) => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Module { cmd } => commands::module::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_add() {
        let cli = Cli::try_parse_from([
            "gatewayctl",
            "--json",
            "module",
            "add",
            "billing",
            "http://billing.internal",
            "--trim-name",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Module {
                cmd: commands::module::ModuleCommands::Add { name, target, trim_name, description },
            } => {
                assert_eq!(name, "billing");
                assert_eq!(target, "http://billing.internal");
                assert!(trim_name);
                assert_eq!(description, "");
            }
            _ => panic!("expected module add"),
        }
    }

    #[test]
    fn text_flag_selects_text_and_conflicts_with_json() {
        let cli = Cli::try_parse_from(["gatewayctl", "--text", "module", "list"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));

        let cli = Cli::try_parse_from(["gatewayctl", "module", "list"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));

        assert!(Cli::try_parse_from(["gatewayctl", "--text", "--json", "module", "list"]).is_err());
    }

    #[test]
    fn parses_token_issue_defaults() {
        let cli = Cli::try_parse_from(["gatewayctl", "token", "issue", "user-1"]).unwrap();
        match cli.command {
            Commands::Token {
                cmd: commands::token::TokenCommands::Issue { subject, admin, admin_url },
            } => {
                assert_eq!(subject, "user-1");
                assert!(!admin);
                assert_eq!(admin_url, "http://127.0.0.1:8081");
            }
            _ => panic!("expected token issue"),
        }
    }
}
