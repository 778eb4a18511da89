use anyhow::{format_err, Result};
use clap::Parser;
use configparser::ini::Ini;
use env_logger::Env;
use log::info;
use reward_ledger::{InMemoryStore, ResetMode, RewardConfig, RewardLedger};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

mod bot;
mod gateway;
mod server;
mod telegram;

use gateway::{Gateway, ResponseBody};
use telegram::TelegramNotifier;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, PartialEq)]
pub struct GatewayConfig {
    bot_token: String,
    mini_app_url: Url,
    listen_addr: String,
    telegram_api_url: Option<Url>,
    rewards: RewardConfig,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bot_token", &"<redacted>")
            .field("mini_app_url", &self.mini_app_url.as_str())
            .field("listen_addr", &self.listen_addr)
            .field("telegram_api_url", &self.telegram_api_url.as_ref().map(Url::as_str))
            .field("rewards", &self.rewards)
            .finish()
    }
}

fn load_cfg(client_config: &str) -> Result<GatewayConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| format_err!("failed to read {}: {}", client_config, e))?;
    parse_cfg(&config, &|key: &str| std::env::var(key).ok())
}

/// Reads `[Global]` and `[Rewards]`; `BOT_TOKEN`, `MINI_APP_URL` and `PORT`
/// from `env` take precedence over the file.
fn parse_cfg(config: &Ini, env: &dyn Fn(&str) -> Option<String>) -> Result<GatewayConfig> {
    let setting = |var: &str, key: &str| {
        env(var)
            .or_else(|| config.get("Global", key))
            .filter(|v| !v.trim().is_empty())
    };

    let bot_token =
        setting("BOT_TOKEN", "bot_token").ok_or_else(|| format_err!("bot_token must not be empty"))?;
    let mini_app_url = setting("MINI_APP_URL", "mini_app_url")
        .ok_or_else(|| format_err!("mini_app_url must not be empty"))?;
    let mini_app_url = Url::parse(mini_app_url.trim())
        .map_err(|e| format_err!("mini_app_url {} is invalid: {}", mini_app_url, e))?;

    let listen_addr = match env("PORT").filter(|p| !p.trim().is_empty()) {
        Some(port) => {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| format_err!("PORT {} is not a port number", port))?;
            format!("0.0.0.0:{}", port)
        }
        None => config
            .get("Global", "listen_addr")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
    };

    let telegram_api_url = match config.get("Global", "telegram_api_url") {
        Some(raw) if !raw.trim().is_empty() => Some(
            Url::parse(raw.trim())
                .map_err(|e| format_err!("telegram_api_url {} is invalid: {}", raw, e))?,
        ),
        _ => None,
    };

    Ok(GatewayConfig {
        bot_token,
        mini_app_url,
        listen_addr,
        telegram_api_url,
        rewards: parse_rewards(config)?,
    })
}

fn parse_rewards(config: &Ini) -> Result<RewardConfig> {
    let uint = |key: &str| {
        config
            .getuint("Rewards", key)
            .map_err(|e| format_err!("[Rewards] {}: {}", key, e))
    };
    let attempts = |key: &str| -> Result<Option<u32>> {
        match uint(key)? {
            Some(v) => Ok(Some(
                u32::try_from(v).map_err(|_| format_err!("[Rewards] {} is too large", key))?,
            )),
            None => Ok(None),
        }
    };

    let mut rewards = RewardConfig::default();
    if let Some(v) = uint("starting_points")? {
        rewards.starting_points = v;
    }
    if let Some(v) = uint("daily_bonus_points")? {
        rewards.daily_bonus_points = v;
    }
    if let Some(v) = attempts("max_spin_attempts")? {
        rewards.max_spin_attempts = v;
    }
    if let Some(v) = attempts("max_quiz_attempts")? {
        rewards.max_quiz_attempts = v;
    }
    if let Some(secs) = uint("reset_window_secs")? {
        rewards.reset_window_ms = secs
            .checked_mul(1000)
            .ok_or_else(|| format_err!("[Rewards] reset_window_secs is too large"))?;
    }
    if let Some(secs) = uint("payment_confirm_delay_secs")? {
        rewards.payment_confirm_delay = Duration::from_secs(secs);
    }
    if let Some(v) = config
        .getbool("Rewards", "trust_client_points")
        .map_err(|e| format_err!("[Rewards] trust_client_points: {}", e))?
    {
        rewards.trust_client_points = v;
    }
    if let Some(mode) = config.get("Rewards", "reset_mode") {
        rewards.reset_mode = mode.parse::<ResetMode>()?;
    }
    rewards.validate()?;
    Ok(rewards)
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[arg(long, default_value = "gateway_config.ini")]
    pub config: String,
    #[clap(subcommand)]
    pub command: GatewayCommands,
}

#[derive(Debug, Parser)]
pub enum GatewayCommands {
    /// Run the webhook and mini-app HTTP endpoint.
    Serve {
        #[arg(long)]
        listen: Option<String>,
    },
    /// Push one request body through the gateway and print the response.
    Dispatch {
        #[arg(long)]
        body: String,
        #[arg(long)]
        wait_jobs: bool,
    },
    /// Load the configuration and print it.
    CheckConfig {},
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    let config = load_cfg(&opts.config)?;
    if let GatewayCommands::CheckConfig {} = opts.command {
        println!("{:#?}", config);
        return Ok(());
    }

    let notifier = Arc::new(TelegramNotifier::new(
        &config.bot_token,
        config.telegram_api_url.as_ref(),
    ));
    let ledger = RewardLedger::builder(config.rewards.clone())
        .open(Arc::new(InMemoryStore::new()), notifier.clone())?;
    let gateway = Arc::new(Gateway::new(ledger, notifier, config.mini_app_url.clone()));

    match opts.command {
        GatewayCommands::Serve { listen } => {
            let listen_addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            server::serve(&listen_addr, Arc::clone(&gateway)).await?;
        }
        GatewayCommands::Dispatch { body, wait_jobs } => {
            let response = gateway.handle(body.as_bytes()).await;
            match &response.body {
                ResponseBody::Json(value) => {
                    println!("{} {}", response.status, serde_json::to_string_pretty(value)?)
                }
                ResponseBody::Text(text) => println!("{} {}", response.status, text),
            }
            if wait_jobs {
                gateway.ledger().jobs().wait_idle().await;
                for report in gateway.ledger().jobs().reports() {
                    info!("{:?}", report);
                }
            }
        }
        GatewayCommands::CheckConfig {} => {}
    }

    gateway.ledger().close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ini(text: &str) -> Ini {
        let mut config = Ini::new();
        config.read(text.to_string()).unwrap();
        config
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    const MINIMAL: &str = "[Global]\n\
        bot_token = 123:abc\n\
        mini_app_url = https://schoollibrary1.netlify.app/\n";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_cfg(&ini(MINIMAL), &no_env).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.mini_app_url.as_str(), "https://schoollibrary1.netlify.app/");
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.telegram_api_url, None);
        assert_eq!(config.rewards, RewardConfig::default());
    }

    #[test]
    fn test_rewards_section() {
        let text = format!(
            "{}[Rewards]\n\
             starting_points = 10\n\
             daily_bonus_points = 250\n\
             max_spin_attempts = 3\n\
             reset_window_secs = 60\n\
             payment_confirm_delay_secs = 2\n\
             trust_client_points = true\n\
             reset_mode = elapsed\n",
            MINIMAL
        );
        let rewards = parse_cfg(&ini(&text), &no_env).unwrap().rewards;
        assert_eq!(rewards.starting_points, 10);
        assert_eq!(rewards.daily_bonus_points, 250);
        assert_eq!(rewards.max_spin_attempts, 3);
        assert_eq!(rewards.max_quiz_attempts, 5);
        assert_eq!(rewards.reset_window_ms, 60_000);
        assert_eq!(rewards.payment_confirm_delay, Duration::from_secs(2));
        assert!(rewards.trust_client_points);
        assert_eq!(rewards.reset_mode, ResetMode::Elapsed);
    }

    #[test]
    fn test_environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("BOT_TOKEN", "999:env"),
            ("MINI_APP_URL", "https://example.org/app"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .collect();
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());
        let config = parse_cfg(&ini(MINIMAL), &lookup).unwrap();
        assert_eq!(config.bot_token, "999:env");
        assert_eq!(config.mini_app_url.as_str(), "https://example.org/app");
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_or_invalid_settings_fail() {
        let no_token = "[Global]\nmini_app_url = https://example.org/\n";
        assert!(parse_cfg(&ini(no_token), &no_env).is_err());

        let empty_url = "[Global]\nbot_token = 1:a\nmini_app_url =\n";
        assert!(parse_cfg(&ini(empty_url), &no_env).is_err());

        let bad_mode = format!("{}[Rewards]\nreset_mode = weekly\n", MINIMAL);
        assert!(parse_cfg(&ini(&bad_mode), &no_env).is_err());

        let zero_spins = format!("{}[Rewards]\nmax_spin_attempts = 0\n", MINIMAL);
        assert!(parse_cfg(&ini(&zero_spins), &no_env).is_err());

        let bad_port = |key: &str| (key == "PORT").then(|| "http".to_string());
        assert!(parse_cfg(&ini(MINIMAL), &bad_port).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = parse_cfg(&ini(MINIMAL), &no_env).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("123:abc"));
        assert!(printed.contains("<redacted>"));
    }
}
