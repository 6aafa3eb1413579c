// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Classification of generated files.
//!
//! Conan's generator step writes three kinds of files into the same folder:
//! CMake build descriptors, environment scripts (`conanbuild.sh`,
//! `conanrun.bat`, ...), and JSON presets. Only the build descriptors are
//! consumed in place. The [`Classifier`] decides where everything else goes
//! by matching the file name against an ordered table of glob patterns.

use crate::config::{ConfigError, Destination, OrganizeRule};

use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Rules every classifier falls back to.
pub const DEFAULT_RULES: [(&str, Destination); 3] = [
    ("*.sh", Destination::Scripts),
    ("*.bat", Destination::Scripts),
    ("*.json", Destination::Config),
];

/// Ordered rule table mapping file names to destinations.
///
/// First matching rule wins. Names matching no rule stay in the
/// generator-output directory.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(Pattern, Destination)>,
}

impl Classifier {
    /// Construct classifier from configured rules.
    ///
    /// Configured rules are consulted before [`DEFAULT_RULES`], so they can
    /// override the default destination of a file name, or pin a file name to
    /// the generator-output directory with [`Destination::Generators`].
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Pattern`] if a configured pattern is not a
    ///   valid glob.
    pub fn from_rules<'a>(
        rules: impl IntoIterator<Item = &'a OrganizeRule>,
    ) -> Result<Self, ConfigError> {
        let mut compiled = Vec::new();
        for rule in rules {
            let pattern = Pattern::new(&rule.pattern).map_err(|source| ConfigError::Pattern {
                source,
                pattern: rule.pattern.clone(),
            })?;
            compiled.push((pattern, rule.destination));
        }

        compiled.extend(default_patterns());

        Ok(Self { rules: compiled })
    }

    /// Determine destination of file by its name.
    ///
    /// Only the final path component takes part in matching.
    pub fn classify(&self, path: impl AsRef<Path>) -> Destination {
        let Some(name) = path.as_ref().file_name() else {
            return Destination::Generators;
        };
        let name = name.to_string_lossy();

        // INVARIANT: Wildcards never cross path separators or match leading dots
        // implicitly, i.e., match like a shell would.
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches_with(&name, options))
            .map(|(_, destination)| *destination)
            .unwrap_or_default()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            rules: default_patterns().collect(),
        }
    }
}

fn default_patterns() -> impl Iterator<Item = (Pattern, Destination)> {
    DEFAULT_RULES.into_iter().filter_map(|(pattern, destination)| {
        Pattern::new(pattern)
            .ok()
            .map(|pattern| (pattern, destination))
    })
}
