//! Runtime version parsing and the capability table.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use semver::Version;

use super::ConfigError;

/// Test-framework features that depend on the runtime version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Randomized test execution order with dependency resolution.
    RandomOrder,
}

/// Minimum version for each capability, as `(capability, major, minor, patch)`.
const CAPABILITIES: &[(Capability, u64, u64, u64)] = &[(Capability::RandomOrder, 7, 2, 0)];

/// A parsed test-framework runtime version.
///
/// Accepts the short forms frameworks report (`7`, `7.2`, `7.2.13`, `v7.2.0-dev`);
/// missing components are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersion(Version);

impl RuntimeVersion {
    /// Parse a version string.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
        let (core, suffix) = trimmed.split_at(split);

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(ConfigError::InvalidVersion(raw.to_string()));
        }

        let mut numbers = [0_u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| ConfigError::InvalidVersion(raw.to_string()))?;
        }

        let normalized = format!("{}.{}.{}{suffix}", numbers[0], numbers[1], numbers[2]);
        Version::parse(&normalized)
            .map(Self)
            .map_err(|_| ConfigError::InvalidVersion(raw.to_string()))
    }

    /// Underlying semantic version.
    pub fn as_semver(&self) -> &Version {
        &self.0
    }

    /// True when this version is at or above the capability's threshold.
    /// Pre-release tags are ignored: `7.2.0-dev` counts as `7.2.0`.
    pub fn supports(&self, capability: Capability) -> bool {
        let release = Version::new(self.0.major, self.0.minor, self.0.patch);
        CAPABILITIES
            .iter()
            .filter(|(entry, ..)| *entry == capability)
            .any(|&(_, major, minor, patch)| release >= Version::new(major, minor, patch))
    }

    /// Every capability this version enables.
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        CAPABILITIES
            .iter()
            .map(|(capability, ..)| *capability)
            .filter(|capability| self.supports(*capability))
            .collect()
    }
}

impl FromStr for RuntimeVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
