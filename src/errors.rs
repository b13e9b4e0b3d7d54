use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnaplinkError {
    InvalidUrl(String),
    InvalidValidity(String),
    InvalidCodeFormat(String),
    CodeConflict(String),
    NotFound(String),
    Expired(String),
    GeneratorExhausted(String),
    Config(String),
    FileOperation(String),
    Serialization(String),
}

impl SnaplinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SnaplinkError::InvalidUrl(_) => "E001",
            SnaplinkError::InvalidValidity(_) => "E002",
            SnaplinkError::InvalidCodeFormat(_) => "E003",
            SnaplinkError::CodeConflict(_) => "E004",
            SnaplinkError::NotFound(_) => "E005",
            SnaplinkError::Expired(_) => "E006",
            SnaplinkError::GeneratorExhausted(_) => "E007",
            SnaplinkError::Config(_) => "E008",
            SnaplinkError::FileOperation(_) => "E009",
            SnaplinkError::Serialization(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SnaplinkError::InvalidUrl(_) => "Invalid URL",
            SnaplinkError::InvalidValidity(_) => "Invalid Validity",
            SnaplinkError::InvalidCodeFormat(_) => "Invalid Short Code",
            SnaplinkError::CodeConflict(_) => "Short Code Conflict",
            SnaplinkError::NotFound(_) => "Link Not Found",
            SnaplinkError::Expired(_) => "Link Expired",
            SnaplinkError::GeneratorExhausted(_) => "Code Generator Exhausted",
            SnaplinkError::Config(_) => "Configuration Error",
            SnaplinkError::FileOperation(_) => "File Operation Error",
            SnaplinkError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SnaplinkError::InvalidUrl(msg)
            | SnaplinkError::InvalidValidity(msg)
            | SnaplinkError::InvalidCodeFormat(msg)
            | SnaplinkError::CodeConflict(msg)
            | SnaplinkError::NotFound(msg)
            | SnaplinkError::Expired(msg)
            | SnaplinkError::GeneratorExhausted(msg)
            | SnaplinkError::Config(msg)
            | SnaplinkError::FileOperation(msg)
            | SnaplinkError::Serialization(msg) => msg,
        }
    }

    /// Short snake_case name used as the `event` field of ERROR access events
    pub fn event_name(&self) -> &'static str {
        match self {
            SnaplinkError::InvalidUrl(_) => "invalid_url",
            SnaplinkError::InvalidValidity(_) => "invalid_validity",
            SnaplinkError::InvalidCodeFormat(_) => "invalid_code_format",
            SnaplinkError::CodeConflict(_) => "code_conflict",
            SnaplinkError::NotFound(_) => "not_found",
            SnaplinkError::Expired(_) => "expired",
            SnaplinkError::GeneratorExhausted(_) => "generator_exhausted",
            SnaplinkError::Config(_) => "config",
            SnaplinkError::FileOperation(_) => "file_operation",
            SnaplinkError::Serialization(_) => "serialization",
        }
    }

    /// True for errors caused by caller input rather than by the process
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SnaplinkError::InvalidUrl(_)
                | SnaplinkError::InvalidValidity(_)
                | SnaplinkError::InvalidCodeFormat(_)
                | SnaplinkError::CodeConflict(_)
                | SnaplinkError::NotFound(_)
                | SnaplinkError::Expired(_)
        )
    }

    /// HTTP status used when the error is rendered by the API layer
    #[cfg(feature = "server")]
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            SnaplinkError::InvalidUrl(_)
            | SnaplinkError::InvalidValidity(_)
            | SnaplinkError::InvalidCodeFormat(_) => StatusCode::BAD_REQUEST,
            SnaplinkError::CodeConflict(_) => StatusCode::CONFLICT,
            SnaplinkError::NotFound(_) => StatusCode::NOT_FOUND,
            SnaplinkError::Expired(_) => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SnaplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SnaplinkError {}

// 便捷的构造函数
impl SnaplinkError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::InvalidUrl(msg.into())
    }

    pub fn invalid_validity<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::InvalidValidity(msg.into())
    }

    pub fn invalid_code_format<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::InvalidCodeFormat(msg.into())
    }

    pub fn code_conflict<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::CodeConflict(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Expired(msg.into())
    }

    pub fn generator_exhausted<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::GeneratorExhausted(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for SnaplinkError {
    fn from(err: std::io::Error) -> Self {
        SnaplinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SnaplinkError {
    fn from(err: serde_json::Error) -> Self {
        SnaplinkError::Serialization(err.to_string())
    }
}

impl From<::config::ConfigError> for SnaplinkError {
    fn from(err: ::config::ConfigError) -> Self {
        SnaplinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnaplinkError>;
