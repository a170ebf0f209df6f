use std::path::Path;

use crate::error::Error;
use crate::types::TierSet;

/// Project configuration loaded from `.ucfix.toml`.
/// Include/exclude patterns are path prefixes applied to `.uc` source files;
/// the `[tiers]` table sets which rule tiers run by default.
pub struct Config {
    include: Vec<String>,
    exclude: Vec<String>,
    default_tiers: TierSet,
}

/// Raw TOML structure for `.ucfix.toml`.
#[derive(serde::Deserialize)]
struct UcfixTomlConfig {
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    tiers: TiersToml,
}

/// Raw `[tiers]` table controlling default rule activation.
#[derive(Default, serde::Deserialize)]
struct TiersToml {
    #[serde(default)]
    extended: bool,
    #[serde(default)]
    paren_fixer: bool,
}

impl Config {
    /// Tiers enabled by default for every scan.
    pub fn default_tiers(&self) -> TierSet {
        self.default_tiers
    }

    /// Load config from `.ucfix.toml` in the given root directory.
    /// Returns a default that scans everything if the file doesn't exist.
    /// Returns an error if the file exists but is malformed — never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".ucfix.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::scan_everything_by_default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: UcfixTomlConfig = toml::from_str(&content)?;
        Ok(Self {
            include: raw.include,
            exclude: raw.exclude,
            default_tiers: TierSet {
                extended: raw.tiers.extended,
                paren_fixer: raw.tiers.paren_fixer,
            },
        })
    }

    /// Default config that includes everything, excludes nothing, and runs
    /// only the strict tier.
    fn scan_everything_by_default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            default_tiers: TierSet::strict_only(),
        }
    }

    /// Check whether a source file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        !self.exclude.iter().any(|p| relative_path.starts_with(p.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_filters_and_tiers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".ucfix.toml"),
            "include = [\"Src/\"]\nexclude = [\"Src/ThirdParty/\"]\n\n[tiers]\nextended = true\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.default_tiers().extended);
        assert!(!config.default_tiers().paren_fixer);
        assert!(config.should_scan("Src/Pawn.uc"));
        assert!(!config.should_scan("Src/ThirdParty/Lib.uc"));
        assert!(!config.should_scan("Docs/Sample.uc"));
    }

    #[test]
    fn missing_config_scans_everything_strict_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.should_scan("Anything/At/All.uc"));
        assert_eq!(config.default_tiers(), TierSet::strict_only());
    }

    #[test]
    fn malformed_config_is_an_error_not_a_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".ucfix.toml"), "include = 3\n").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }
}
