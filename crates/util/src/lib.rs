pub mod config;

use std::{env, net::SocketAddr};

pub use config::{AppConfig, ConfigError, Environment};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_EMPLOYEE_CLIENT_BASE_URI: &str = "http://localhost:8112/api/v1/";

/// Loads environment variables from `.env` when available.
///
/// Missing files are ignored so the function is safe in production builds
/// where dotenv files are not deployed.
pub fn load_env_file() {
    let _ = dotenvy::dotenv();
}

/// Returns the address the HTTP server should bind to.
///
/// The value is resolved from the `APP_BIND_ADDR` environment variable and
/// falls back to [`DEFAULT_BIND_ADDR`] when the variable is not set.
pub fn server_bind_address() -> Result<SocketAddr, std::net::AddrParseError> {
    let value = env::var("APP_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    value.parse()
}

/// Returns the base URI of the upstream employee store.
///
/// Read from `EMPLOYEE_CLIENT_BASE_URI`, falling back to
/// [`DEFAULT_EMPLOYEE_CLIENT_BASE_URI`]. A trailing `/` is appended when missing so
/// relative endpoints resolve beneath the configured path.
pub fn employee_client_base_uri() -> Result<url::Url, url::ParseError> {
    let mut value = env::var("EMPLOYEE_CLIENT_BASE_URI")
        .unwrap_or_else(|_| DEFAULT_EMPLOYEE_CLIENT_BASE_URI.to_string());
    if !value.ends_with('/') {
        value.push('/');
    }
    url::Url::parse(&value)
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_GUARD: std::sync::LazyLock<std::sync::Mutex<()>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(()));

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn returns_default_address_when_env_missing() {
        let _lock = ENV_GUARD.lock().expect("env guard poisoned");
        env::remove_var("APP_BIND_ADDR");
        let addr = server_bind_address().expect("default address is valid");
        assert_eq!(addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn parses_custom_address_from_env() {
        let _lock = ENV_GUARD.lock().expect("env guard poisoned");
        env::set_var("APP_BIND_ADDR", "0.0.0.0:9000");
        let addr = server_bind_address().expect("custom address should parse");
        assert_eq!(addr.to_string(), "0.0.0.0:9000");
        env::remove_var("APP_BIND_ADDR");
    }

    #[test]
    fn base_uri_gets_trailing_slash() {
        let _lock = ENV_GUARD.lock().expect("env guard poisoned");
        env::set_var("EMPLOYEE_CLIENT_BASE_URI", "http://upstream:9000/api/v1");
        let url = employee_client_base_uri().expect("base uri should parse");
        assert_eq!(url.as_str(), "http://upstream:9000/api/v1/");
        assert_eq!(
            url.join("employee").expect("join").as_str(),
            "http://upstream:9000/api/v1/employee"
        );
        env::remove_var("EMPLOYEE_CLIENT_BASE_URI");
    }

    #[test]
    fn base_uri_defaults_when_env_missing() {
        let _lock = ENV_GUARD.lock().expect("env guard poisoned");
        env::remove_var("EMPLOYEE_CLIENT_BASE_URI");
        let url = employee_client_base_uri().expect("default uri is valid");
        assert_eq!(url.as_str(), DEFAULT_EMPLOYEE_CLIENT_BASE_URI);
    }
}
