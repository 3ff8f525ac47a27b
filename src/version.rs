use std::cmp::Ordering;

/// Version number extracted from a tool's version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub original: String,
    pub parsed: VersionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionType {
    Semantic(semver::Version),
    Numeric(Vec<u64>),
    Unknown(String),
}

impl Version {
    pub fn parse(version: &str) -> Self {
        let parsed = if let Ok(v) = semver::Version::parse(version) {
            VersionType::Semantic(v)
        } else if let Some(numeric) = Self::parse_numeric(version) {
            VersionType::Numeric(numeric)
        } else {
            VersionType::Unknown(version.to_string())
        };

        Version {
            original: version.to_string(),
            parsed,
        }
    }

    fn parse_numeric(version: &str) -> Option<Vec<u64>> {
        let mut numbers = Vec::new();

        for part in version.split('.') {
            numbers.push(part.parse::<u64>().ok()?);
        }

        if numbers.is_empty() {
            None
        } else {
            Some(numbers)
        }
    }

    /// Second component of the version, if it has one.
    pub fn minor(&self) -> Option<u64> {
        match &self.parsed {
            VersionType::Semantic(v) => Some(v.minor),
            VersionType::Numeric(parts) => parts.get(1).copied(),
            VersionType::Unknown(_) => None,
        }
    }

    /// True for plain release numbers without pre-release or build tags.
    pub fn is_release(&self) -> bool {
        match &self.parsed {
            VersionType::Semantic(v) => v.pre.is_empty() && v.build.is_empty(),
            VersionType::Numeric(_) => true,
            VersionType::Unknown(_) => false,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parsed, &other.parsed) {
            (VersionType::Semantic(a), VersionType::Semantic(b)) => a.cmp(b),
            (VersionType::Numeric(a), VersionType::Numeric(b)) => a.cmp(b),
            (VersionType::Semantic(a), VersionType::Numeric(b)) => {
                [a.major, a.minor, a.patch].as_slice().cmp(b.as_slice())
            }
            (VersionType::Numeric(a), VersionType::Semantic(b)) => {
                a.as_slice().cmp([b.major, b.minor, b.patch].as_slice())
            }
            (VersionType::Unknown(_), VersionType::Unknown(_)) => {
                self.original.cmp(&other.original)
            }
            (VersionType::Unknown(_), _) => Ordering::Less,
            (_, VersionType::Unknown(_)) => Ordering::Greater,
        }
    }
}

pub struct VersionComparator;

impl VersionComparator {
    /// Get the newest version accepted by `keep`
    pub fn latest_matching<F>(versions: &[String], keep: F) -> Option<String>
    where
        F: Fn(&Version) -> bool,
    {
        versions
            .iter()
            .map(|v| Version::parse(v))
            .filter(|v| keep(v))
            .max()
            .map(|v| v.original)
    }

    /// Sort tool version strings ascending by the number following `prefix`
    pub fn sort_by_number(versions: &mut [String], prefix: &str) {
        versions.sort_by_cached_key(|v| Version::parse(v.strip_prefix(prefix).unwrap_or(v)));
    }
}
