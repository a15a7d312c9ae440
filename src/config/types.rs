use serde::Deserialize;

/// Default browser-like user agent sent with every listing request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Main configuration structure for Brand-Watcher
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub watch: WatchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

/// What to watch and where to remember it
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Display name used in notification subjects (e.g. "TK Maxx GANT")
    #[serde(rename = "brand-name")]
    pub brand_name: String,

    /// First page of the brand listing
    #[serde(rename = "brand-url")]
    pub brand_url: String,

    /// Path to the JSON file holding previously seen product ids
    #[serde(rename = "state-path")]
    pub state_path: String,
}

/// HTTP fetching and pagination behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per page, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Backoff grows as `multiplier * 2^(attempt - 1)` seconds
    #[serde(rename = "backoff-multiplier-secs")]
    pub backoff_multiplier_secs: f64,

    /// Lower clamp for the backoff delay (milliseconds)
    #[serde(rename = "backoff-min-ms")]
    pub backoff_min_ms: u64,

    /// Upper clamp for the backoff delay (milliseconds)
    #[serde(rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,

    /// Hard stop for pagination
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-GB,en;q=0.8".to_string(),
            timeout_secs: 25,
            max_attempts: 3,
            backoff_multiplier_secs: 1.0,
            backoff_min_ms: 1_000,
            backoff_max_ms: 10_000,
            max_pages: crate::crawler::DEFAULT_MAX_PAGES,
        }
    }
}

/// Email delivery settings
///
/// Every field is optional in the file; the environment fills in (and overrides)
/// whatever is present there. Incomplete settings disable delivery but never
/// block a run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    #[serde(rename = "smtp-host")]
    pub smtp_host: Option<String>,

    #[serde(rename = "smtp-port")]
    pub smtp_port: Option<u16>,

    pub username: Option<String>,

    pub password: Option<String>,

    pub from: Option<String>,

    pub to: Option<String>,
}

/// Fully resolved email settings, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// Default SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

impl EmailConfig {
    /// Overlays `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
    /// `EMAIL_FROM` and `EMAIL_TO` from the given lookup
    ///
    /// Blank variables are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), crate::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SMTP_HOST") {
            self.smtp_host = Some(host);
        }
        if let Some(port) = get("SMTP_PORT") {
            let port = port.trim().parse::<u16>().map_err(|_| {
                crate::ConfigError::Validation(format!(
                    "SMTP_PORT must be a valid port, got '{}'",
                    port
                ))
            })?;
            self.smtp_port = Some(port);
        }
        if let Some(username) = get("SMTP_USERNAME") {
            self.username = Some(username);
        }
        if let Some(password) = get("SMTP_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(from) = get("EMAIL_FROM") {
            self.from = Some(from);
        }
        if let Some(to) = get("EMAIL_TO") {
            self.to = Some(to);
        }

        Ok(())
    }

    /// Names of the settings still missing, using their environment variable names
    pub fn missing(&self) -> Vec<&'static str> {
        let fields = [
            ("SMTP_HOST", &self.smtp_host),
            ("SMTP_USERNAME", &self.username),
            ("SMTP_PASSWORD", &self.password),
            ("EMAIL_FROM", &self.from),
            ("EMAIL_TO", &self.to),
        ];

        fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Resolves the complete settings, or returns the names of the missing ones
    pub fn settings(&self) -> Result<EmailSettings, Vec<&'static str>> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(missing);
        }

        let value = |field: &Option<String>| field.clone().unwrap_or_default();

        Ok(EmailSettings {
            smtp_host: value(&self.smtp_host),
            smtp_port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            username: value(&self.username),
            password: value(&self.password),
            from: value(&self.from),
            to: value(&self.to),
        })
    }
}
