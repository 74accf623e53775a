//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// How a nonzero tool exit status is reported back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Diagnostic output on stderr is returned as the result body even when
    /// the tool exits nonzero. Only a silent failure is an error.
    #[default]
    Lenient,
    /// Any nonzero exit is an error.
    Strict,
}

impl FromStr for ExitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ExitPolicy::Lenient),
            "strict" => Ok(ExitPolicy::Strict),
            other => Err(format!("unknown exit policy '{}'", other)),
        }
    }
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Executable used for every transcoding operation
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
    /// Executable used for `get_video_info`
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
    /// Nonzero exit handling (default lenient)
    #[serde(default)]
    pub exit_policy: ExitPolicy,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            exit_policy: ExitPolicy::default(),
        }
    }
}

/// Values used by the command builders when a caller omits an optional argument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Audio codec for `extract_audio`
    pub audio_format: String,
    /// Input frame rate for `create_video_from_images`
    pub framerate: f64,
    /// Video codec for `create_video_from_images`
    pub video_codec: String,
    /// Pixel format for `create_video_from_images`
    pub pixel_format: String,
    /// Start offset for the trim operations
    pub start_time: String,
    /// Overlay position for `add_watermark`
    pub watermark_position: String,
    /// Overlay opacity for `add_watermark` (0.0-1.0)
    pub watermark_opacity: f64,
    /// Target directory for `extract_frames`
    pub frames_output_dir: String,
    /// `fps` filter expression for `extract_frames`
    pub frame_rate: String,
    /// Image format for `extract_frames`
    pub frame_format: String,
    /// Image quality for `extract_frames` (1-100, higher is better)
    pub frame_quality: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            audio_format: "mp3".to_string(),
            framerate: 25.0,
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            start_time: "0".to_string(),
            watermark_position: "bottomright".to_string(),
            watermark_opacity: 0.5,
            frames_output_dir: "output".to_string(),
            frame_rate: "1".to_string(),
            frame_format: "jpg".to_string(),
            frame_quality: 95.0,
        }
    }
}

/// Server identity and transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Name reported to clients during the handshake
    pub name: String,
    /// Version reported to clients during the handshake
    pub version: String,
    /// Listen address for the HTTP transport
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mcp-ffmpeg-helper".to_string(),
            version: "0.2.0".to_string(),
            http_addr: "127.0.0.1:7878".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - FFMPEG_PATH -> tools.ffmpeg
    /// - FFPROBE_PATH -> tools.ffprobe
    /// - FFMPEG_EXIT_POLICY -> tools.exit_policy
    /// - MEDIA_HTTP_ADDR -> server.http_addr
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("FFMPEG_PATH") {
            if !val.trim().is_empty() {
                self.tools.ffmpeg = val;
            }
        }

        if let Ok(val) = env::var("FFPROBE_PATH") {
            if !val.trim().is_empty() {
                self.tools.ffprobe = val;
            }
        }

        if let Ok(val) = env::var("FFMPEG_EXIT_POLICY") {
            // Invalid value, keep existing
            if let Ok(policy) = val.parse::<ExitPolicy>() {
                self.tools.exit_policy = policy;
            }
        }

        if let Ok(val) = env::var("MEDIA_HTTP_ADDR") {
            if !val.trim().is_empty() {
                self.server.http_addr = val;
            }
        }
    }

    /// Load configuration from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = match Self::load_from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to ensure env var tests don't interfere with each other
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to clear all config-related env vars
    fn clear_env_vars() {
        env::remove_var("FFMPEG_PATH");
        env::remove_var("FFPROBE_PATH");
        env::remove_var("FFMPEG_EXIT_POLICY");
        env::remove_var("MEDIA_HTTP_ADDR");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_config_parses_all_sections(
            ffmpeg in "[a-z/_-]{1,24}",
            strict in proptest::bool::ANY,
            framerate in 1u32..240,
            quality in 1u32..=100,
            codec in "[a-z0-9]{3,10}",
        ) {
            let toml_str = format!(
                r#"
[tools]
ffmpeg = "{}"
exit_policy = "{}"

[defaults]
framerate = {}
frame_quality = {}
video_codec = "{}"
"#,
                ffmpeg,
                if strict { "strict" } else { "lenient" },
                framerate,
                quality,
                codec,
            );

            let config = Config::parse_toml(&toml_str).expect("Valid TOML should parse");

            prop_assert_eq!(&config.tools.ffmpeg, &ffmpeg);
            prop_assert_eq!(config.tools.ffprobe.as_str(), "ffprobe");
            let expected = if strict { ExitPolicy::Strict } else { ExitPolicy::Lenient };
            prop_assert_eq!(config.tools.exit_policy, expected);
            prop_assert!((config.defaults.framerate - framerate as f64).abs() < 1e-9);
            prop_assert!((config.defaults.frame_quality - quality as f64).abs() < 1e-9);
            prop_assert_eq!(&config.defaults.video_codec, &codec);
            // untouched keys in a present section keep their defaults
            prop_assert_eq!(config.defaults.pixel_format.as_str(), "yuv420p");
        }

        #[test]
        fn prop_env_overrides_ffmpeg_path(
            initial in "[a-z]{1,12}",
            override_path in "/[a-z]{1,12}/ffmpeg",
        ) {
            let _guard = ENV_MUTEX.lock().unwrap();
            clear_env_vars();

            let toml_str = format!("[tools]\nffmpeg = \"{}\"\n", initial);
            let mut config = Config::parse_toml(&toml_str).expect("Valid TOML");

            env::set_var("FFMPEG_PATH", &override_path);
            config.apply_env_overrides();
            clear_env_vars();

            prop_assert_eq!(config.tools.ffmpeg, override_path);
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_toml("").expect("Empty TOML should parse");

        assert_eq!(config.tools.ffmpeg, "ffmpeg");
        assert_eq!(config.tools.ffprobe, "ffprobe");
        assert_eq!(config.tools.exit_policy, ExitPolicy::Lenient);
        assert_eq!(config.defaults.audio_format, "mp3");
        assert!((config.defaults.framerate - 25.0).abs() < 1e-9);
        assert_eq!(config.defaults.video_codec, "libx264");
        assert_eq!(config.defaults.pixel_format, "yuv420p");
        assert_eq!(config.defaults.start_time, "0");
        assert_eq!(config.defaults.watermark_position, "bottomright");
        assert!((config.defaults.watermark_opacity - 0.5).abs() < 1e-9);
        assert_eq!(config.defaults.frames_output_dir, "output");
        assert_eq!(config.defaults.frame_rate, "1");
        assert_eq!(config.defaults.frame_format, "jpg");
        assert!((config.defaults.frame_quality - 95.0).abs() < 1e-9);
        assert_eq!(config.server.name, "mcp-ffmpeg-helper");
        assert_eq!(config.server.http_addr, "127.0.0.1:7878");
    }

    #[test]
    fn test_unknown_exit_policy_is_rejected_in_toml() {
        let result = Config::parse_toml("[tools]\nexit_policy = \"sometimes\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_exit_policy_env_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env_vars();

        let mut config = Config::default();
        env::set_var("FFMPEG_EXIT_POLICY", "STRICT");
        config.apply_env_overrides();
        assert_eq!(config.tools.exit_policy, ExitPolicy::Strict);

        // Invalid value, keep existing
        env::set_var("FFMPEG_EXIT_POLICY", "maybe");
        config.apply_env_overrides();
        clear_env_vars();
        assert_eq!(config.tools.exit_policy, ExitPolicy::Strict);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reads_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[server]\nname = \"media-box\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.name, "media-box");
        assert_eq!(config.server.version, "0.2.0");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
