use crate::error::{ValkeyError, ValkeyResult};

#[derive(Debug, Clone)]
pub struct ValkeyConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl ValkeyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> ValkeyResult<Self> {
        let host = host.into();

        if host.is_empty() {
            return Err(ValkeyError::InvalidConfig("Host cannot be empty".into()));
        }

        Ok(Self {
            host,
            port,
            password: None,
            db: 0,
        })
    }

    /// An empty password is treated as no password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then_some(password);
        self
    }

    pub fn with_db(mut self, db: i64) -> ValkeyResult<Self> {
        if db < 0 {
            return Err(ValkeyError::InvalidConfig(format!("Database index cannot be negative: {db}")));
        }

        self.db = db;
        Ok(self)
    }

    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{password}@{}:{}/{}", self.host, self.port, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Endpoint description that is safe to log.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }
}
