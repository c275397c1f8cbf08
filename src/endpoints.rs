//! # Endpoint Selector
//!
//! Version-range filtering and uniform-random selection over a configured
//! service endpoint list. Collaborators resolve the concrete URL to call
//! through here; the core itself never performs network I/O.

use crate::config::AppConfig;
use crate::error::{CoreError, CoreResult};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parsed dotted version, at most three numeric segments.
///
/// Missing segments default to zero, so `"2"` equals `"2.0.0"`. Ordering
/// is lexicographic over (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `"1"`, `"1.2"` or `"1.2.3"`; anything else is `None`.
    pub fn parse(version: &str) -> Option<Self> {
        let mut segments = [0u32; 3];
        let parts: Vec<&str> = version.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }
        for (slot, part) in segments.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }
        Some(Self::new(segments[0], segments[1], segments[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::Configuration(format!("invalid version: {s}")))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid version: {raw}")))
    }
}

/// One service endpoint with its version-range flags.
///
/// `max` marks a floor endpoint valid for every version at or above its
/// id; `min` marks a ceiling endpoint valid for every version at or below
/// its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: Version,
    pub url: String,
    #[serde(default)]
    pub min: bool,
    #[serde(default)]
    pub max: bool,
}

/// Ordered endpoint list for one named service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    endpoints: Vec<Endpoint>,
}

impl Endpoints {
    /// Construction fails on an empty list: a service with no endpoints is
    /// a configuration defect, not a runtime condition.
    pub fn new(endpoints: Vec<Endpoint>) -> CoreResult<Self> {
        if endpoints.is_empty() {
            return Err(CoreError::Configuration(
                "no endpoint specified".to_string(),
            ));
        }
        Ok(Self { endpoints })
    }

    /// Uniform-random pick over the full list.
    pub fn anyone(&self) -> &Endpoint {
        let index = rand::thread_rng().gen_range(0..self.endpoints.len());
        &self.endpoints[index]
    }

    /// URL of a uniform-random endpoint.
    pub fn url(&self) -> &str {
        &self.anyone().url
    }

    /// Keep every endpoint whose id exactly matches `version`, every
    /// `max`-flagged floor at or below it, and every `min`-flagged ceiling
    /// at or above it; return one of the survivors uniformly at random.
    ///
    /// An unparseable version, or an empty filtered subset, yields `None`.
    pub fn filter(&self, version: &str) -> Option<&Endpoint> {
        let version = Version::parse(version)?;
        let eligible: Vec<&Endpoint> = self
            .endpoints
            .iter()
            .filter(|endpoint| {
                endpoint.id == version
                    || (endpoint.max && endpoint.id <= version)
                    || (endpoint.min && endpoint.id >= version)
            })
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..eligible.len());
        Some(eligible[index])
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Replace the endpoint list; an empty replacement is ignored.
    pub fn reset(&mut self, endpoints: Vec<Endpoint>) {
        if endpoints.is_empty() {
            return;
        }
        self.endpoints = endpoints;
    }
}

/// Resolve the endpoint list for a named service out of the application
/// configuration. `None` when the service is unknown or empty.
pub fn load_endpoints(app: &AppConfig, service: &str) -> Option<Endpoints> {
    let endpoints = app.services.get(service)?;
    Endpoints::new(endpoints.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(id: &str, min: bool, max: bool) -> Endpoint {
        Endpoint {
            id: Version::parse(id).unwrap(),
            url: format!("https://svc-{id}.example.com"),
            min,
            max,
        }
    }

    #[test]
    fn version_parse_accepts_one_to_three_segments() {
        assert_eq!(Version::parse("2"), Some(Version::new(2, 0, 0)));
        assert_eq!(Version::parse("2.1"), Some(Version::new(2, 1, 0)));
        assert_eq!(Version::parse("2.1.3"), Some(Version::new(2, 1, 3)));
    }

    #[test]
    fn version_parse_rejects_garbage() {
        for raw in ["", "not-a-version", "1.2.3.4", "1..2", "v1.0", "1.-2"] {
            assert_eq!(Version::parse(raw), None, "{raw}");
        }
    }

    #[test]
    fn version_ordering_is_lexicographic() {
        assert!(Version::new(2, 0, 0) > Version::new(1, 9, 9));
        assert!(Version::new(1, 2, 0) > Version::new(1, 1, 9));
        assert!(Version::new(1, 1, 2) > Version::new(1, 1, 1));
        assert_eq!(Version::parse("1.0"), Version::parse("1.0.0"));
    }

    #[test]
    fn empty_list_is_a_configuration_error() {
        assert!(Endpoints::new(Vec::new()).is_err());
    }

    #[test]
    fn filter_honors_exact_floor_and_ceiling() {
        let endpoints = Endpoints::new(vec![
            endpoint("2.1.0", false, false),
            endpoint("1.0.0", false, true),
            endpoint("3.0.0", true, false),
        ])
        .unwrap();

        // all three are eligible for 2.1.0: exact, floor below, ceiling above
        for _ in 0..32 {
            let picked = endpoints.filter("2.1.0").unwrap();
            assert!(
                picked.id == Version::new(2, 1, 0)
                    || picked.id == Version::new(1, 0, 0)
                    || picked.id == Version::new(3, 0, 0)
            );
        }
    }

    #[test]
    fn filter_excludes_unflagged_ranges() {
        let endpoints = Endpoints::new(vec![
            endpoint("1.0.0", false, false),
            endpoint("3.0.0", false, false),
        ])
        .unwrap();
        assert!(endpoints.filter("2.0.0").is_none());
    }

    #[test]
    fn filter_rejects_unparseable_version() {
        let endpoints = Endpoints::new(vec![endpoint("1.0.0", false, true)]).unwrap();
        assert!(endpoints.filter("not-a-version").is_none());
    }

    #[test]
    fn floor_flag_does_not_apply_above_version() {
        // a max-flagged endpoint is a floor: eligible only at or below the
        // requested version
        let endpoints = Endpoints::new(vec![endpoint("3.0.0", false, true)]).unwrap();
        assert!(endpoints.filter("2.0.0").is_none());
        assert!(endpoints.filter("3.0.0").is_some());
        assert!(endpoints.filter("4.0.0").is_some());
    }

    #[test]
    fn anyone_picks_from_the_full_list() {
        let endpoints =
            Endpoints::new(vec![endpoint("1.0.0", false, false), endpoint("2.0.0", false, false)])
                .unwrap();
        for _ in 0..16 {
            let url = endpoints.url();
            assert!(url.starts_with("https://svc-"));
        }
    }

    #[test]
    fn reset_ignores_empty_replacement() {
        let mut endpoints = Endpoints::new(vec![endpoint("1.0.0", false, false)]).unwrap();
        endpoints.reset(Vec::new());
        assert_eq!(endpoints.len(), 1);
        endpoints.reset(vec![endpoint("2.0.0", false, false), endpoint("3.0.0", false, false)]);
        assert_eq!(endpoints.len(), 2);
    }
}
