//! Package manifest discovery used for default artifact names.

use std::fs;
use std::path::Path;

use serde_json::Value;

/// Name of the manifest file looked up at every directory level.
pub const MANIFEST_FILE: &str = "package.json";

/// Walks up from `start_dir` and returns the first non-empty `name` found in a
/// `package.json`.
///
/// Unreadable or malformed manifests are logged and skipped; the walk keeps
/// going towards the filesystem root instead of failing.
///
/// # Examples
/// ```no_run
/// # use std::path::Path;
/// # use memo_bundler::package::find_nearest_package_name;
/// let name = find_nearest_package_name(Path::new("/project/packages/ui/src"));
/// // Some("@scope/ui") if /project/packages/ui/package.json declares it
/// ```
pub fn find_nearest_package_name(start_dir: &Path) -> Option<String> {
    let mut current = Some(start_dir);

    while let Some(dir) = current {
        let manifest = dir.join(MANIFEST_FILE);
        if manifest.is_file() {
            match read_name(&manifest) {
                Ok(Some(name)) => {
                    tracing::trace!("package name '{}' from {}", name, manifest.display());
                    return Some(name);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("failed to read {}: {}", manifest.display(), err);
                }
            }
        }
        current = dir.parent();
    }

    None
}

fn read_name(manifest: &Path) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(manifest)?;
    let parsed: Value = serde_json::from_str(&content)?;
    Ok(parsed
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string))
}
