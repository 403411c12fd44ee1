//! Loads JSON golden files from `contracts/`.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Load a JSON fixture file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use soko_testing::fixture::Fixture;
/// let val = Fixture::load("contracts/mpesa/stk_callback_success.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Parse the fixture at `workspace_root/path`.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        let contents = Self::load_str(relative_path);
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {relative_path}: {e}"))
    }

    /// Raw fixture text, for tests that feed bytes to a parser.
    pub fn load_str(relative_path: &str) -> String {
        let full_path = workspace_root().join(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {}", full_path.display(), e))
    }
}

/// Nearest ancestor of the crate under test that holds `contracts/`.
fn workspace_root() -> PathBuf {
    let start = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap());
    let found = start
        .ancestors()
        .find(|a| a.join("contracts").is_dir())
        .map(Path::to_path_buf);
    found.unwrap_or(start)
}
