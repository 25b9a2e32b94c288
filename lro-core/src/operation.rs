//! Operation - Handles to vendor-side asynchronous operations

use std::fmt;

use thiserror::Error;

/// Breadth at which a vendor tracks an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationScope {
    Global,
    Regional,
    Zonal,
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationScope::Global => write!(f, "global"),
            OperationScope::Regional => write!(f, "regional"),
            OperationScope::Zonal => write!(f, "zonal"),
        }
    }
}

/// Errors raised when a handle's scope and location do not agree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("Operation name must not be empty")]
    EmptyName,

    #[error("Regional operation {0} requires a region")]
    MissingRegion(String),

    #[error("Zonal operation {0} requires a zone")]
    MissingZone(String),

    #[error("Operation {0} requires a project")]
    MissingProject(String),
}

/// Reference to one vendor operation, created right after a mutating API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    name: String,
    scope: OperationScope,
    project: String,
    region: Option<String>,
    zone: Option<String>,
}

impl OperationHandle {
    /// Create a handle, checking that the location matches the scope
    ///
    /// Locations that the scope does not use are dropped.
    pub fn new(
        name: impl Into<String>,
        scope: OperationScope,
        region: Option<String>,
        zone: Option<String>,
    ) -> Result<Self, HandleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HandleError::EmptyName);
        }

        let region = region.filter(|r| !r.is_empty());
        let zone = zone.filter(|z| !z.is_empty());

        let (region, zone) = match scope {
            OperationScope::Global => (None, None),
            OperationScope::Regional => match region {
                Some(region) => (Some(region), None),
                None => return Err(HandleError::MissingRegion(name)),
            },
            OperationScope::Zonal => match zone {
                Some(zone) => (None, Some(zone)),
                None => return Err(HandleError::MissingZone(name)),
            },
        };

        Ok(Self {
            name,
            scope,
            project: String::new(),
            region,
            zone,
        })
    }

    pub fn global(name: impl Into<String>) -> Result<Self, HandleError> {
        Self::new(name, OperationScope::Global, None, None)
    }

    pub fn regional(
        name: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, HandleError> {
        Self::new(name, OperationScope::Regional, Some(region.into()), None)
    }

    pub fn zonal(name: impl Into<String>, zone: impl Into<String>) -> Result<Self, HandleError> {
        Self::new(name, OperationScope::Zonal, None, Some(zone.into()))
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> OperationScope {
        self.scope
    }

    /// Project the operation belongs to (empty for vendors without projects)
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// Project, or `MissingProject` for vendors that need one to route the poll
    pub fn require_project(&self) -> Result<&str, HandleError> {
        if self.project.is_empty() {
            Err(HandleError::MissingProject(self.name.clone()))
        } else {
            Ok(&self.project)
        }
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.region, &self.zone) {
            (Some(region), _) => write!(f, "{} operation {} ({})", self.scope, self.name, region),
            (_, Some(zone)) => write!(f, "{} operation {} ({})", self.scope, self.name, zone),
            _ => write!(f, "{} operation {}", self.scope, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_handle_ignores_location() {
        let handle = OperationHandle::new(
            "operation-123",
            OperationScope::Global,
            Some("us-central1".to_string()),
            None,
        )
        .unwrap()
        .with_project("my-project");

        assert_eq!(handle.name(), "operation-123");
        assert_eq!(handle.scope(), OperationScope::Global);
        assert_eq!(handle.project(), "my-project");
        assert_eq!(handle.region(), None);
        assert_eq!(handle.zone(), None);
    }

    #[test]
    fn test_regional_handle_requires_region() {
        let handle = OperationHandle::regional("op", "europe-west1").unwrap();
        assert_eq!(handle.region(), Some("europe-west1"));

        assert_eq!(
            OperationHandle::regional("op", ""),
            Err(HandleError::MissingRegion("op".to_string()))
        );
        assert_eq!(
            OperationHandle::new("op", OperationScope::Regional, None, Some("a".to_string())),
            Err(HandleError::MissingRegion("op".to_string()))
        );
    }

    #[test]
    fn test_zonal_handle_requires_zone() {
        let handle = OperationHandle::zonal("op", "us-east1-b").unwrap();
        assert_eq!(handle.zone(), Some("us-east1-b"));
        assert_eq!(handle.region(), None);

        assert_eq!(
            OperationHandle::zonal("op", ""),
            Err(HandleError::MissingZone("op".to_string()))
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(OperationHandle::global(""), Err(HandleError::EmptyName));
    }

    #[test]
    fn test_require_project() {
        let handle = OperationHandle::global("op").unwrap();
        assert_eq!(
            handle.require_project(),
            Err(HandleError::MissingProject("op".to_string()))
        );

        let handle = handle.with_project("p");
        assert_eq!(handle.require_project(), Ok("p"));
    }

    #[test]
    fn test_display() {
        let handle = OperationHandle::zonal("op-1", "us-east1-b").unwrap();
        assert_eq!(handle.to_string(), "zonal operation op-1 (us-east1-b)");

        let handle = OperationHandle::global("op-2").unwrap();
        assert_eq!(handle.to_string(), "global operation op-2");
    }
}
