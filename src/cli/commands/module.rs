use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::{
    utils::{output_modules, output_success},
    OutputFormat,
};
use crate::registry::{Module, ModuleStore};

#[derive(Subcommand)]
pub enum ModuleCommands {
    #[command(about = "Create the modules table if it does not exist")]
    Init,

    #[command(about = "Register a new module")]
    Add {
        #[arg(help = "Module name (first path segment after the route prefix)")]
        name: String,
        #[arg(help = "Backend base URL, e.g. http://billing.internal:8000")]
        target: String,
        #[arg(long, help = "Strip /<name> from the forwarded path")]
        trim_name: bool,
        #[arg(long, default_value = "", help = "Free-form description")]
        description: String,
    },

    #[command(about = "Show one module")]
    Show {
        #[arg(help = "Module name")]
        name: String,
    },

    #[command(about = "List registered modules")]
    List,

    #[command(about = "Remove a module")]
    Remove {
        #[arg(help = "Module name")]
        name: String,
    },
}

async fn store() -> anyhow::Result<ModuleStore> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    ModuleStore::connect(&url).await.context("failed to connect to module registry")
}

pub async fn handle(cmd: ModuleCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = store().await?;

    match cmd {
        ModuleCommands::Init => {
            store.init_schema().await?;
            output_success(&output_format, "Module registry initialised", None)
        }
        ModuleCommands::Add { name, target, trim_name, description } => {
            let module = Module {
                name,
                target_base_url: target,
                trim_name,
                description,
            };
            store.add(&module).await?;
            output_success(
                &output_format,
                &format!("Module '{}' registered", module.name),
                Some(json!({ "module": module })),
            )
        }
        ModuleCommands::Show { name } => {
            let module = store.get(&name).await?;
            output_modules(&output_format, &[module])
        }
        ModuleCommands::List => {
            let modules = store.list().await?;
            output_modules(&output_format, &modules)
        }
        ModuleCommands::Remove { name } => {
            store.remove(&name).await?;
            output_success(&output_format, &format!("Module '{}' removed", name), None)
        }
    }
}
