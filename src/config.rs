//! Tessellation configuration and builder

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clip::DEFAULT_EPSILON;
use crate::error::{Result, TessellationError};

/// Largest accepted relative snapping tolerance
const MAX_EPSILON: f64 = 1e-3;

/// What happens to sites that fail the boundary constraints
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SitePolicy {
    /// Excluded sites are removed from the working set for good and only come
    /// back if they are added again
    #[default]
    Discard,
    /// Excluded sites stay in the working set but are left out of the
    /// published tessellation until a later boundary admits them
    Retain,
}

/// Configuration for a tessellation session
///
/// # Example
///
/// ```rust
/// use constrained_voronoi::*;
///
/// let config = TessellationConfigBuilder::new()
///     .epsilon(1e-10)
///     .unwrap()
///     .site_policy(SitePolicy::Retain)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.site_policy, SitePolicy::Retain);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationConfig {
    /// Relative snapping tolerance of the polygon clipper
    ///
    /// Scaled by the diagonal of the operands' bounding box. Vertices closer
    /// than that are merged and points that close to an edge count as lying
    /// on it.
    pub epsilon: f64,

    /// Padding added around the sites when no outer boundary is loaded
    ///
    /// Fraction of the sites' bounding box extent added on every side. With
    /// the default of 0.0 the outermost cells end exactly at the outermost
    /// sites. A fraction cannot grow a box without area, so boxes of a single
    /// site or of axis-aligned sites get an absolute margin instead.
    pub bounds_padding: f64,

    /// Treatment of sites outside the admissible region
    pub site_policy: SitePolicy,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            bounds_padding: 0.0,
            site_policy: SitePolicy::default(),
        }
    }
}

/// Builder for creating TessellationConfig with validation
#[derive(Debug, Clone)]
pub struct TessellationConfigBuilder {
    epsilon: f64,
    bounds_padding: f64,
    site_policy: SitePolicy,
}

impl TessellationConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - epsilon: 1e-9
    /// - bounds_padding: 0.0
    /// - site_policy: Discard
    pub fn new() -> Self {
        let defaults = TessellationConfig::default();
        Self {
            epsilon: defaults.epsilon,
            bounds_padding: defaults.bounds_padding,
            site_policy: defaults.site_policy,
        }
    }

    /// Set the relative snapping tolerance of the clipper
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < epsilon <= 1e-3`
    pub fn epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !(epsilon > 0.0 && epsilon <= MAX_EPSILON) {
            return Err(TessellationError::InvalidConfig(format!(
                "epsilon must be in (0, {}] (got {})",
                MAX_EPSILON, epsilon
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Set the padding used when bounds are derived from the sites
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if padding is negative or not finite
    pub fn bounds_padding(mut self, padding: f64) -> Result<Self> {
        if !padding.is_finite() || padding < 0.0 {
            return Err(TessellationError::InvalidConfig(format!(
                "bounds padding must be a finite value >= 0 (got {})",
                padding
            )));
        }
        self.bounds_padding = padding;
        Ok(self)
    }

    pub fn site_policy(mut self, policy: SitePolicy) -> Self {
        self.site_policy = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<TessellationConfig> {
        Ok(TessellationConfig {
            epsilon: self.epsilon,
            bounds_padding: self.bounds_padding,
            site_policy: self.site_policy,
        })
    }
}

impl Default for TessellationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = TessellationConfigBuilder::new().build().unwrap();
        assert_eq!(config, TessellationConfig::default());
        assert_eq!(config.epsilon, DEFAULT_EPSILON);
        assert_eq!(config.site_policy, SitePolicy::Discard);
    }

    #[test]
    fn test_builder_custom() {
        let config = TessellationConfigBuilder::new()
            .epsilon(1e-6)
            .unwrap()
            .bounds_padding(0.1)
            .unwrap()
            .site_policy(SitePolicy::Retain)
            .build()
            .unwrap();

        assert_eq!(config.epsilon, 1e-6);
        assert_eq!(config.bounds_padding, 0.1);
        assert_eq!(config.site_policy, SitePolicy::Retain);
    }

    #[test]
    fn test_builder_invalid_epsilon() {
        assert!(TessellationConfigBuilder::new().epsilon(0.0).is_err());
        assert!(TessellationConfigBuilder::new().epsilon(-1e-9).is_err());
        assert!(TessellationConfigBuilder::new().epsilon(0.5).is_err());
        assert!(TessellationConfigBuilder::new().epsilon(f64::NAN).is_err());
    }

    #[test]
    fn test_builder_invalid_padding() {
        assert!(TessellationConfigBuilder::new().bounds_padding(-0.1).is_err());
        assert!(TessellationConfigBuilder::new().bounds_padding(f64::INFINITY).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = TessellationConfigBuilder::new()
            .site_policy(SitePolicy::Retain)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: TessellationConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
