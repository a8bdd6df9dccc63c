use std::env;
use std::net::SocketAddr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| {
                    warn!("SERVER_PORT not set or invalid, using default 3000");
                    3000
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Whether token verification is usable. The server still starts without
    /// a secret, but every authenticated request will be rejected.
    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .unwrap_or_else(|_| {
                warn!(
                    "Invalid SERVER_HOST/SERVER_PORT ({}:{}), falling back to 0.0.0.0:3000",
                    self.server_host, self.server_port
                );
                SocketAddr::from(([0, 0, 0, 0], 3000))
            })
    }
}
