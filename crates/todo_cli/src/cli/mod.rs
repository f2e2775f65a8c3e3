use clap::{Parser, Subcommand};
use todo_core::config::{AuthMode, ConfigOverrides, canonical_key};

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal to-do list backed by a GraphQL API", long_about = None)]
pub struct Cli {
    /// Without a command, opens the interactive page
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remember the signed-in user
    ///
    /// Example: todo login --user-id 1f2e3d --token "$ID_TOKEN"
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the signed-in user
    ///
    /// Example: todo sign-out
    SignOut,
    /// Print the signed-in user id
    Whoami,
    /// List your tasks
    ///
    /// Example: todo list
    List,
    /// Add a new task
    ///
    /// Example: todo add "Buy milk" -d "2% low-fat"
    Add {
        name: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
    },
    /// Complete (remove) a task by id or list position
    ///
    /// Example: todo complete 2
    Complete {
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Endpoint,
    ApiKey,
    AuthMode,
    Theme,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let key = canonical_key(key_raw);
    if key.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match key.as_str() {
        "endpoint" | "aws_appsync_graphqlendpoint" => ConfigOverrideTarget::Endpoint,
        "api_key" | "apikey" | "aws_appsync_apikey" => ConfigOverrideTarget::ApiKey,
        "auth_type" | "auth_mode" | "aws_appsync_authenticationtype" => {
            ConfigOverrideTarget::AuthMode
        }
        "theme" => ConfigOverrideTarget::Theme,
        "timeout" | "request_timeout_secs" => ConfigOverrideTarget::Timeout,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` into one set; later flags win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Endpoint => overrides.endpoint = Some(parsed.value),
            ConfigOverrideTarget::ApiKey => overrides.api_key = Some(parsed.value),
            ConfigOverrideTarget::AuthMode => {
                let mode = AuthMode::parse(&parsed.value)
                    .ok_or_else(|| format!("unsupported auth type '{}'", parsed.value))?;
                overrides.auth_mode = Some(mode);
            }
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Timeout => {
                let secs = parsed
                    .value
                    .parse::<u64>()
                    .map_err(|_| "timeout must be a whole number of seconds".to_string())?;
                overrides.request_timeout_secs = Some(secs);
            }
        }
    }
    Ok(overrides)
}
