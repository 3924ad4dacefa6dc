use crate::error::{ConfigError, HostsentryError};

/// Glob-based exclusion rules for raw filesystem paths. Patterns are
/// compiled once at construction; matching is read-only so a single
/// instance can be shared across producers without locking.
///
/// `*` matches any run of characters including path separators (the glob
/// crate's default options), so `*/logs/*` suppresses anything under a
/// `logs` directory at any depth.
#[derive(Debug)]
pub struct PathFilter {
    patterns: Vec<glob::Pattern>,
}

impl PathFilter {
    pub fn new(patterns: &[String]) -> Result<Self, HostsentryError> {
        let compiled = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    HostsentryError::Config(ConfigError::IgnorePattern {
                        pattern: p.clone(),
                        source: e,
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns: compiled })
    }

    /// True if the path matches any ignore pattern.
    pub fn should_ignore(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> PathFilter {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        PathFilter::new(&owned).unwrap()
    }

    #[test]
    fn matches_extension_patterns() {
        let f = filter(&["*.tmp", "*.log"]);
        assert!(f.should_ignore("/home/user/scratch.tmp"));
        assert!(f.should_ignore("/var/app/output.log"));
        assert!(!f.should_ignore("/home/user/notes.txt"));
    }

    #[test]
    fn star_crosses_path_separators() {
        let f = filter(&["*/logs/*"]);
        assert!(f.should_ignore("/srv/app/logs/file_log.txt"));
        assert!(f.should_ignore("/deeply/nested/tree/logs/a/b/c"));
        assert!(!f.should_ignore("/srv/app/data/file.txt"));
    }

    #[test]
    fn empty_rule_set_ignores_nothing() {
        let f = filter(&[]);
        assert!(!f.should_ignore("/anything/at/all.tmp"));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let err = PathFilter::new(&["[".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::IgnorePattern { .. })
        ));
    }
}
