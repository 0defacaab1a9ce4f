//! Read-only reference data shared by every worker
//!
//! This module provides:
//! - the static asset manifest (path + md5)
//! - the dictionary used to synthesize memo content
//! - the synthetic user pool the target is seeded with

mod static_files;
mod words;

pub use static_files::{DEFAULT_STATIC_FILES, StaticAsset, default_manifest};
pub use words::{DICT_WORDS, markdown_content, random_phrase};

use crate::random::RandomSource;

/// Number of seeded users on the target (`isucon1` ..= `isucon400`)
pub const USER_SCALE: usize = 400;
/// Prefix of every seeded username
pub const USER_PREFIX: &str = "isucon";

/// Process-lifetime reference data, shared behind an `Arc` without locking
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub static_files: Vec<StaticAsset>,
    pub words: &'static [&'static str],
    pub user_prefix: String,
    pub user_scale: usize,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            static_files: default_manifest(),
            words: DICT_WORDS,
            user_prefix: USER_PREFIX.to_string(),
            user_scale: USER_SCALE,
        }
    }
}

impl Fixtures {
    /// Replace the static asset manifest
    pub fn with_static_files(mut self, static_files: Vec<StaticAsset>) -> Self {
        self.static_files = static_files;
        self
    }

    /// Draw a user uniformly from the pool. Password equals the username.
    pub fn random_user(&self, rng: &mut dyn RandomSource) -> String {
        format!("{}{}", self.user_prefix, rng.below(self.user_scale) + 1)
    }

    pub fn title(&self, rng: &mut dyn RandomSource) -> String {
        random_phrase(self.words, rng)
    }

    pub fn content(&self, title: &str, rng: &mut dyn RandomSource) -> String {
        markdown_content(title, self.words, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_user_pool_bounds() {
        let fixtures = Fixtures::default();
        let mut rng = ScriptedRandom::new([0, 399, 400]);
        assert_eq!(fixtures.random_user(&mut rng), "isucon1");
        assert_eq!(fixtures.random_user(&mut rng), "isucon400");
        // 400 wraps to the first user
        assert_eq!(fixtures.random_user(&mut rng), "isucon1");
    }

    #[test]
    fn test_default_manifest() {
        let fixtures = Fixtures::default();
        assert_eq!(fixtures.static_files.len(), 4);
        assert!(fixtures.static_files.iter().all(|a| a.md5.len() == 32));
        assert!(
            fixtures
                .static_files
                .iter()
                .any(|a| a.path == "/js/jquery.min.js")
        );
    }
}
