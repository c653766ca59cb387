use thiserror::Error;

/// Errors raised by registrar clients.
///
/// Only `CredentialsMissing` is a configuration problem; everything else is a
/// per-call failure that callers downgrade into a structured result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("Missing registrar credentials: {0}")]
    CredentialsMissing(String),
    #[error("HTTP error{}: {message}", status_suffix(.status))]
    ProviderHttp { status: Option<u16>, message: String },
    #[error("Unexpected registrar response: {0}")]
    ProviderParse(String),
    #[error("Registration failed: {0}")]
    Registration(String),
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl RegistrarError {
    pub fn http(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ProviderHttp {
            status,
            message: message.into(),
        }
    }

    /// Text suitable for showing to the operator, without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::CredentialsMissing(m)
            | Self::ProviderParse(m)
            | Self::Registration(m)
            | Self::InvalidDomain(m) => m.clone(),
            Self::ProviderHttp { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for RegistrarError {
    fn from(e: reqwest::Error) -> Self {
        Self::http(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistrarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_display_includes_status_when_known() {
        let err = RegistrarError::http(Some(502), "bad gateway");
        assert_eq!(err.to_string(), "HTTP error (502): bad gateway");
        let err = RegistrarError::http(None, "connection refused");
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn detail_strips_prefix() {
        let err = RegistrarError::Registration("Domain taken".into());
        assert_eq!(err.detail(), "Domain taken");
    }
}
