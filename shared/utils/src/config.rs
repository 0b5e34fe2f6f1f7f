use ::config::{Config, ConfigError, Environment, File};
use docsmith_models::{OutputFormat, SummarizerOptions, SummaryLength, SummaryType, SurfaceShape};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upload: UploadConfig,
    pub summarizer: SummarizerConfig,
    pub translator: TranslatorConfig,
    pub ollama: OllamaConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub summary_type: SummaryType,
    pub format: OutputFormat,
    pub length: SummaryLength,
    pub language: String,
    pub output_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub format: OutputFormat,
    pub default_target_language: String,
    pub default_source_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub summarizer_model: String,
    pub translator_model: String,
    pub summarizer_shape: SurfaceShape,
    pub translator_shape: SurfaceShape,
    pub probe_timeout_seconds: u64,
    pub pull_timeout_seconds: u64,
    pub generate_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub redirect_to: String,
    pub storage_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Local overrides (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("DOCSMITH").separator("__"));

        config.build()?.try_deserialize()
    }
}

impl SummarizerConfig {
    pub fn session_options(&self) -> SummarizerOptions {
        SummarizerOptions {
            summary_type: self.summary_type,
            format: self.format,
            length: self.length,
            language: self.language.clone(),
            output_language: self.output_language.clone(),
        }
    }
}

impl AuthConfig {
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    /// Storage file for the session and sign-in hints; falls back to the
    /// platform data directory.
    pub fn resolved_storage_path(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("docsmith").join("auth.json")))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        let options = SummarizerOptions::default();
        Self {
            summary_type: options.summary_type,
            format: options.format,
            length: options.length,
            language: options.language,
            output_language: options.output_language,
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            default_target_language: "es".to_string(),
            default_source_language: "en".to_string(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:11434".to_string(),
            summarizer_model: "llama3.2:3b".to_string(),
            translator_model: "llama3.2:3b".to_string(),
            summarizer_shape: SurfaceShape::Legacy,
            translator_shape: SurfaceShape::Legacy,
            probe_timeout_seconds: 5,
            pull_timeout_seconds: 600,
            generate_timeout_seconds: 300,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            redirect_to: "http://localhost:3000/auth/callback".to_string(),
            storage_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
            file_path: None,
        }
    }
}
