//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use invmail_core::models::config::InvmailConfig;

use super::config_file;

/// Keys holding credentials, masked when shown.
const SECRET_KEYS: &[&str] = &["remote.api_key", "store.anon_key"];

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Include values taken from environment variables
        #[arg(long)]
        effective: bool,

        /// Print API keys instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "remote.deployment")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "store.table")
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_file(config_path);

    match args.command {
        ConfigCommand::Show {
            effective,
            show_secrets,
        } => show_config(&path, effective, show_secrets),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn read_config(path: &Path) -> anyhow::Result<InvmailConfig> {
    if path.exists() {
        Ok(InvmailConfig::from_file(path)?)
    } else {
        Ok(InvmailConfig::default())
    }
}

fn show_config(config_path: &Path, effective: bool, show_secrets: bool) -> anyhow::Result<()> {
    if !config_path.exists() {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let mut config = read_config(config_path)?;
    if effective {
        config = config.with_env();
    }

    let mut json = serde_json::to_value(&config)?;
    if !show_secrets {
        mask_secrets(&mut json);
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn init_config(args: InitArgs, config_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| config_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    InvmailConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );
    println!("   API keys are read from AZURE_OPENAI_API_KEY / OPENAI_API_KEY and SUPABASE_ANON_KEY.");

    Ok(())
}

fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(read_config(config_path)?)?;

    let value = lookup(&json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = read_config(config_path)?;

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;
    let (parent_key, field) = key.rsplit_once('.').unwrap_or(("", key));

    let parent = if parent_key.is_empty() {
        Some(&mut json)
    } else {
        lookup_mut(&mut json, parent_key)
    };
    let Some(Value::Object(section)) = parent else {
        anyhow::bail!("Configuration path not found: {}", key);
    };

    section.insert(field.to_string(), parsed_value.clone());

    let updated: InvmailConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    // Unknown fields are dropped on deserialize.
    if lookup(&serde_json::to_value(&updated)?, key).is_none() {
        anyhow::bail!("Unknown configuration key: {}", key);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    updated.save(config_path)?;

    let shown = if SECRET_KEYS.contains(&key) {
        "\"****\"".to_string()
    } else {
        serde_json::to_string(&parsed_value)?
    };
    println!("{} Set {} = {}", style("✓").green(), key, shown);

    Ok(())
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'invmail config init' to create a configuration file.");
    }

    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

fn lookup_mut<'a>(json: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    key.split('.')
        .try_fold(json, |current, part| current.get_mut(part))
}

fn mask_secrets(json: &mut Value) {
    for key in SECRET_KEYS {
        if let Some(value) = lookup_mut(json, key) {
            if value.is_string() {
                *value = Value::String("****".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let json = json!({"remote": {"deployment": "gpt-4o-mini"}});
        assert_eq!(lookup(&json, "remote.deployment"), Some(&json!("gpt-4o-mini")));
        assert_eq!(lookup(&json, "remote.missing"), None);
    }

    #[test]
    fn test_mask_secrets() {
        let mut json = json!({
            "remote": {"api_key": "sk-123", "endpoint": "https://x"},
            "store": {"url": "https://y"}
        });
        mask_secrets(&mut json);

        assert_eq!(json["remote"]["api_key"], "****");
        assert_eq!(json["remote"]["endpoint"], "https://x");
        assert!(json["store"].get("anon_key").is_none());
    }
}
