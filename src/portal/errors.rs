//! Error types for the portal client.

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("failed to read certificate bundle {path}")]
    Certificate {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("certificate bundle {path} is not valid PEM")]
    CertificateFormat {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
