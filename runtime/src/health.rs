//! Component health, as reported by the readiness endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health of one component, or of the service as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is operational
    Healthy,
    /// Component is not operational
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is unhealthy
    #[must_use]
    pub const fn is_unhealthy(self) -> bool {
        matches!(self, Self::Unhealthy)
    }
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Name of the component being checked
    pub component: String,

    /// Current health status
    pub status: HealthStatus,

    /// What went wrong, for unhealthy components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Extra details such as ping latency
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<(String, String)>,
}

impl HealthCheck {
    fn with_status(component: impl Into<String>, status: HealthStatus, message: Option<String>) -> Self {
        Self {
            component: component.into(),
            status,
            message,
            metadata: Vec::new(),
        }
    }

    /// A component that answered
    #[must_use]
    pub fn healthy(component: impl Into<String>) -> Self {
        Self::with_status(component, HealthStatus::Healthy, None)
    }

    /// A component that failed, with the reason
    #[must_use]
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(component, HealthStatus::Unhealthy, Some(message.into()))
    }

    /// Attach a metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

/// Health of the service: unhealthy as soon as one check is
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Overall status
    pub status: HealthStatus,

    /// Individual component checks
    pub checks: Vec<HealthCheck>,

    /// When the report was generated
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// Combine component checks into a report
    #[must_use]
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let status = if checks.iter().any(|check| check.status.is_unhealthy()) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            checks,
            timestamp: Utc::now(),
        }
    }

    /// Check if overall status is unhealthy
    #[must_use]
    pub const fn is_unhealthy(&self) -> bool {
        self.status.is_unhealthy()
    }
}
