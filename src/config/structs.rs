use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML + 环境变量加载，启动时使用）
///
/// - server: 监听地址、端口、对外访问的 base_url
/// - store: 有效期默认值、短码长度、生成重试次数
/// - access_log: 访问日志 sink 配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub access_log: AccessLogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SL，分隔符：__
    /// 示例：SL__SERVER__PORT=9999
    pub fn load() -> Self {
        let path = "config.toml";

        match Self::load_from(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit TOML path (optional on disk) plus `SL__*` env overrides
    pub fn load_from(path: &str) -> crate::errors::Result<Self> {
        use ::config::{Config, Environment, File, FileFormat};

        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("SL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> crate::errors::Result<()> {
        use crate::errors::SnaplinkError;
        use crate::utils::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

        if self.store.default_validity_minutes <= 0 {
            return Err(SnaplinkError::config(format!(
                "store.default_validity_minutes must be positive, got {}",
                self.store.default_validity_minutes
            )));
        }
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.store.code_length) {
            return Err(SnaplinkError::config(format!(
                "store.code_length must be between {} and {}, got {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH, self.store.code_length
            )));
        }
        if self.store.max_generate_attempts == 0 {
            return Err(SnaplinkError::config(
                "store.max_generate_attempts must be at least 1",
            ));
        }
        if self.access_log.channel_capacity == 0 {
            return Err(SnaplinkError::config(
                "access_log.channel_capacity must be at least 1",
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Public prefix used to render `short_url` in API responses
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 映射存储配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_validity_minutes")]
    pub default_validity_minutes: i64,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_max_generate_attempts")]
    pub max_generate_attempts: usize,
}

/// 访问日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessLogConfig {
    #[serde(default = "default_access_log_enabled")]
    pub enabled: bool,
    /// JSON Lines 文件路径，None 表示不写文件
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// 内存中保留的最近事件数（用于 /api/logs），0 表示关闭
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
    /// Re-emit every access event through tracing
    #[serde(default)]
    pub echo_tracing: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_validity_minutes() -> i64 {
    30
}

fn default_code_length() -> usize {
    6
}

fn default_max_generate_attempts() -> usize {
    50
}

fn default_access_log_enabled() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_memory_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            base_url: default_base_url(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_validity_minutes: default_validity_minutes(),
            code_length: default_code_length(),
            max_generate_attempts: default_max_generate_attempts(),
        }
    }
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: default_access_log_enabled(),
            file: None,
            channel_capacity: default_channel_capacity(),
            memory_capacity: default_memory_capacity(),
            echo_tracing: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
