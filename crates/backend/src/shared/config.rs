use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub llm: LlmConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    /// Apps Script web app URL. Empty disables create/update/delete.
    #[serde(default)]
    pub script_url: String,
    pub sheet_id: String,
    pub active_sheet: String,
    /// Sheet with processed cases. Empty disables the history view.
    #[serde(default)]
    pub history_sheet: String,
    /// CORS relay prefixes, the target URL is appended URL-encoded
    #[serde(default)]
    pub relays: Vec<String>,
    pub script_timeout_secs: u64,
    pub csv_timeout_secs: u64,
}

impl SheetsConfig {
    pub fn writes_enabled(&self) -> bool {
        !self.script_url.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    pub api_base: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: i32,
    pub summary_sample: usize,
    pub question_sample: usize,
    /// Upper bound for one model call, retries of the client included
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_timeout_secs() -> u64 {
    30
}

impl LlmConfig {
    /// API key from the environment, None when unset or blank
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// JPEG logo for the report header. Empty disables the logo.
    #[serde(default)]
    pub logo_url: String,
    pub logo_timeout_secs: u64,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[sheets]
script_url = ""
sheet_id = "1tUIWLYEbjJjnsjIvnVLN_FtS4FzliKlNjCiCeUXnSpY"
active_sheet = "BD"
history_sheet = "HISTORICO"
relays = ["https://corsproxy.io/?url=", "https://api.allorigins.win/raw?url="]
script_timeout_secs = 8
csv_timeout_secs = 6

[llm]
api_base = "https://generativelanguage.googleapis.com/v1beta/openai/"
model = "gemini-2.5-flash"
api_key_env = "API_KEY"
temperature = 0.4
max_tokens = 800
summary_sample = 50
question_sample = 30
timeout_secs = 30

[report]
logo_url = "https://i.ibb.co/Y4xSyf0d/Tiendas-K24.jpg"
logo_timeout_secs = 5
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

pub fn default_config() -> anyhow::Result<Config> {
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if !config.sheets.writes_enabled() {
        tracing::warn!("sheets.script_url is empty: create/update/delete stay local only");
    }
    Ok(config)
}
