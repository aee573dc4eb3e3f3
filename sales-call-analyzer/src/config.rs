//! Settings loaded once at startup from an env file plus the process
//! environment. Process variables win over file entries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::SetupError;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const API_KEY_PLACEHOLDER: &str = "PASTE_YOUR_ACTUAL_OPENROUTER_API_KEY_HERE";
pub const ENV_FILE_VAR: &str = "SALES_AGENT_ENV_FILE";

const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
const DEFAULT_SALESPERSON: &str = "Adi Tiwari";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_HISTORY_TURNS: usize = 10;
const DEFAULT_MAX_UPLOAD_MB: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    Valid(String),
    Missing,
    Placeholder,
}

impl CredentialStatus {
    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => CredentialStatus::Missing,
            Some(API_KEY_PLACEHOLDER) => CredentialStatus::Placeholder,
            Some(key) => CredentialStatus::Valid(key.to_string()),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        match self {
            CredentialStatus::Valid(key) => Some(key),
            _ => None,
        }
    }

    pub fn check(&self) -> Result<&str, SetupError> {
        match self {
            CredentialStatus::Valid(key) => Ok(key),
            CredentialStatus::Missing => Err(SetupError::MissingCredential(API_KEY_VAR.into())),
            CredentialStatus::Placeholder => {
                Err(SetupError::PlaceholderCredential(API_KEY_VAR.into()))
            }
        }
    }
}

/// Identifiers scoping the agent runtime's turn history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationIds {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl Default for ConversationIds {
    fn default() -> Self {
        Self {
            app_name: "sales_transcript_analyzer".to_string(),
            user_id: "local_user".to_string(),
            session_id: "transcript_session".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env_file: PathBuf,
    pub credential: CredentialStatus,
    pub model: String,
    pub salesperson: String,
    pub port: u16,
    pub max_history_turns: usize,
    /// Upper bound on an upload request body, in megabytes.
    pub max_upload_mb: usize,
    pub conversation: ConversationIds,
}


impl Settings {
    /// Load from the env file named by `SALES_AGENT_ENV_FILE` (default `.env`).
    pub fn load() -> Self {
        let env_file = std::env::var(ENV_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENV_FILE));
        let process_env: HashMap<String, String> = std::env::vars().collect();
        Self::from_sources(&env_file, &process_env)
    }

    /// Merge an env file with an explicit environment map.
    pub fn from_sources(env_file: &Path, process_env: &HashMap<String, String>) -> Self {
        let mut values = read_env_file(env_file);
        values.extend(process_env.iter().map(|(k, v)| (k.clone(), v.clone())));

        let credential = CredentialStatus::from_value(values.get(API_KEY_VAR).map(String::as_str));
        match &credential {
            CredentialStatus::Valid(_) => info!("API key found in environment"),
            _ => warn!("API key not found or is placeholder in {}", env_file.display()),
        }

        Self {
            env_file: env_file.to_path_buf(),
            credential,
            model: non_empty(&values, "SALES_AGENT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            salesperson: non_empty(&values, "SALESPERSON_NAME")
                .unwrap_or_else(|| DEFAULT_SALESPERSON.into()),
            port: parse_or(&values, "PORT", DEFAULT_PORT),
            max_history_turns: parse_or(&values, "MAX_HISTORY_TURNS", DEFAULT_MAX_HISTORY_TURNS),
            max_upload_mb: parse_or(&values, "MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB),
            conversation: ConversationIds::default(),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            warn!("Could not read env file {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    let mut values = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }
    info!("Loaded {} entries from {}", values.len(), path.display());
    values
}

fn non_empty(values: &HashMap<String, String>, key: &str) -> Option<String> {
    values
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(values: &HashMap<String, String>, key: &str, default: T) -> T {
    match non_empty(values, key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid value for {}: {}, using default", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_values_from_env_file() {
        let file = env_file("OPENROUTER_API_KEY=sk-or-123\nSALESPERSON_NAME=\"Dana Lee\"\nPORT=8080\n");
        let settings = Settings::from_sources(file.path(), &HashMap::new());

        assert_eq!(settings.credential, CredentialStatus::Valid("sk-or-123".into()));
        assert_eq!(settings.salesperson, "Dana Lee");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_quoted_multi_word_values_are_kept() {
        let file = env_file(
            "SALESPERSON_NAME=\"Maria del Carmen\"\nSALES_AGENT_MODEL='openai/gpt-4o-mini'\n",
        );
        let settings = Settings::from_sources(file.path(), &HashMap::new());
        assert_eq!(settings.salesperson, "Maria del Carmen");
        assert_eq!(settings.model, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_shipped_env_template_loads() {
        let template = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env.example");
        let settings = Settings::from_sources(&template, &HashMap::new());
        assert_eq!(settings.credential, CredentialStatus::Placeholder);
        assert_eq!(settings.salesperson, "Adi Tiwari");
        assert_eq!(settings.max_upload_bytes(), 200 * 1024 * 1024);
    }

    #[test]
    fn test_process_env_overrides_file() {
        let file = env_file("OPENROUTER_API_KEY=from-file\nSALES_AGENT_MODEL=file/model\n");
        let mut process_env = HashMap::new();
        process_env.insert("SALES_AGENT_MODEL".to_string(), "env/model".to_string());

        let settings = Settings::from_sources(file.path(), &process_env);
        assert_eq!(settings.model, "env/model");
        assert_eq!(settings.credential.api_key(), Some("from-file"));
    }

    #[test]
    fn test_placeholder_and_missing_credentials() {
        let file = env_file(&format!("OPENROUTER_API_KEY={}\n", API_KEY_PLACEHOLDER));
        let settings = Settings::from_sources(file.path(), &HashMap::new());
        assert_eq!(settings.credential, CredentialStatus::Placeholder);
        assert!(matches!(
            settings.credential.check(),
            Err(SetupError::PlaceholderCredential(_))
        ));

        let missing = Settings::from_sources(Path::new("/nonexistent/.env"), &HashMap::new());
        assert_eq!(missing.credential, CredentialStatus::Missing);
        assert_eq!(missing.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let file = env_file("PORT=not-a-port\nMAX_HISTORY_TURNS=-1\n");
        let settings = Settings::from_sources(file.path(), &HashMap::new());
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.max_history_turns, DEFAULT_MAX_HISTORY_TURNS);
    }
}
