use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::registry::Module;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output registry entries as JSON or an aligned table
pub fn output_modules(output_format: &OutputFormat, modules: &[Module]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "modules": modules }))?);
        }
        OutputFormat::Text => {
            if modules.is_empty() {
                println!("No modules registered");
                return Ok(());
            }
            print!("{}", format_module_table(modules));
        }
    }
    Ok(())
}

fn format_module_table(modules: &[Module]) -> String {
    let width = modules.iter().map(|m| m.name.len()).max().unwrap_or(0).max(4);
    let mut out = format!("{:<width$}  {:<5}  {}\n", "NAME", "TRIM", "TARGET", width = width);
    for module in modules {
        out.push_str(&format!(
            "{:<width$}  {:<5}  {}",
            module.name,
            module.trim_name,
            module.target_base_url,
            width = width
        ));
        if !module.description.is_empty() {
            out.push_str(&format!("  ({})", module.description));
        }
        out.push('\n');
    }
    out
}
