//! Compute provider configuration

use std::fmt;
use std::str::FromStr;

/// Default Compute Engine API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com";

/// Compute API surface the operation was created through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    #[default]
    V1,
    Beta,
    Alpha,
}

impl ApiVersion {
    /// Path segment used in request URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::Beta => "beta",
            ApiVersion::Alpha => "alpha",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(ApiVersion::V1),
            "beta" => Ok(ApiVersion::Beta),
            "alpha" => Ok(ApiVersion::Alpha),
            other => Err(format!(
                "Unknown API version '{}', expected v1, beta or alpha",
                other
            )),
        }
    }
}

/// Settings for talking to the Compute API
#[derive(Clone, PartialEq, Eq)]
pub struct ComputeConfig {
    /// Default project for handles that do not carry one
    pub project: String,

    pub api_version: ApiVersion,

    /// Base URL, without trailing slash
    pub endpoint: String,

    /// OAuth2 bearer token, passed through as is
    pub access_token: Option<String>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            api_version: ApiVersion::V1,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

impl fmt::Debug for ComputeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeConfig")
            .field("project", &self.project)
            .field("api_version", &self.api_version)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ComputeConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}
