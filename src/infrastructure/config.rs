use chrono_tz::Tz;
use serde::Deserialize;

pub const DEFAULT_PORTAL_BASE_URL: &str = "https://webportal.stromnetz-graz.at/api";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Settings as read from `config/meter-bot.*` and the environment
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub telegram_bot_token: String,
    pub telegram_chat_id: i64,
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
    pub sngraz_email: String,
    pub sngraz_pwd: String,
    pub timezone: String,
    #[serde(default = "default_portal_base_url")]
    pub portal_base_url: String,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    #[serde(default = "default_history_days")]
    pub history_days: i64,
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_portal_base_url() -> String {
    DEFAULT_PORTAL_BASE_URL.to_string()
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

fn default_history_days() -> i64 {
    30
}

fn default_chart_width() -> u32 {
    1000
}

fn default_chart_height() -> u32 {
    600
}

fn default_poll_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
    pub authorized_chat_id: i64,
    pub admin_chat_id: i64,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub history_days: i64,
}

/// Validated process-wide configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub portal: PortalConfig,
    pub timezone: Tz,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppConfig {
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        if settings.telegram_bot_token.trim().is_empty() {
            anyhow::bail!("TELEGRAM_BOT_TOKEN must not be empty");
        }
        if settings.sngraz_email.trim().is_empty() || settings.sngraz_pwd.is_empty() {
            anyhow::bail!("SNGRAZ_EMAIL and SNGRAZ_PWD must not be empty");
        }
        if settings.history_days <= 0 {
            anyhow::bail!("HISTORY_DAYS must be positive, got {}", settings.history_days);
        }
        if settings.chart_width == 0 || settings.chart_height == 0 {
            anyhow::bail!("chart dimensions must be non-zero");
        }

        let timezone: Tz = settings
            .timezone
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Unknown timezone {:?}: {}", settings.timezone, e))?;

        Ok(Self {
            telegram: TelegramConfig {
                bot_token: settings.telegram_bot_token,
                api_url: settings.telegram_api_url.trim_end_matches('/').to_string(),
                authorized_chat_id: settings.telegram_chat_id,
                admin_chat_id: settings.admin_chat_id.unwrap_or(settings.telegram_chat_id),
                poll_timeout_secs: settings.poll_timeout_secs,
            },
            portal: PortalConfig {
                base_url: settings.portal_base_url.trim_end_matches('/').to_string(),
                email: settings.sngraz_email,
                password: settings.sngraz_pwd,
                history_days: settings.history_days,
            },
            timezone,
            chart_width: settings.chart_width,
            chart_height: settings.chart_height,
        })
    }
}

/// Load settings from an optional config file, `.env` and the process
/// environment (environment wins)
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/meter-bot").required(false))
        .add_source(config::Environment::default())
        .build()?;

    AppConfig::from_settings(settings.try_deserialize()?)
}
