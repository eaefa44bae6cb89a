use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Fixed base phrase every search starts with.
    pub subject: String,
    pub newsdata_api_key: String,
    /// Reserved: required at startup but not consumed by any request yet.
    pub mediastack_api_key: String,
    pub newsdata_base_url: String,
    pub source_timeout_secs: u64,
    /// Text Embeddings Inference server hosting the sentiment classifier.
    pub tei_url: String,
    pub model_timeout_secs: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("subject", &self.subject)
            .field("newsdata_api_key", &"[redacted]")
            .field("mediastack_api_key", &"[redacted]")
            .field("newsdata_base_url", &self.newsdata_base_url)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("tei_url", &self.tei_url)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
