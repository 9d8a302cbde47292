use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Directory under the user's home that holds Forta state.
const FORTA_DIR_NAME: &str = ".forta";
/// Directory under [`FORTA_DIR_NAME`] that holds deploy keys.
const DEPLOY_KEYS_DIR_NAME: &str = ".deploy-keys";

/// Default location of the deploy keys below an explicit home directory.
///
/// ```
/// # use std::path::Path;
/// # use forta_publish_lib::paths::deploy_key_path_in;
/// assert_eq!(
///     deploy_key_path_in(Path::new("/home/alice")),
///     Path::new("/home/alice/.forta/.deploy-keys")
/// );
/// ```
pub fn deploy_key_path_in(home: &Path) -> PathBuf {
    home.join(FORTA_DIR_NAME).join(DEPLOY_KEYS_DIR_NAME)
}

/// Resolve the default deploy key directory, `~/.forta/.deploy-keys`.
pub fn deploy_key_path() -> Result<PathBuf> {
    let dirs = BaseDirs::new().ok_or(Error::HomeDirUnavailable)?;
    Ok(deploy_key_path_in(dirs.home_dir()))
}

/// Pick the key directory for a command.
///
/// An explicit, non-empty path wins; otherwise the default deploy key path
/// is resolved from the home directory.
pub fn resolve_key_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => Ok(path.to_path_buf()),
        _ => {
            let default = deploy_key_path()?;
            debug!(path = %default.display(), "using default deploy key directory");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_key_path_appends_forta_dirs() {
        let path = deploy_key_path_in(Path::new("/tmp/home"));
        assert_eq!(path, PathBuf::from("/tmp/home/.forta/.deploy-keys"));
    }

    #[test]
    fn explicit_key_dir_is_kept() {
        let resolved = resolve_key_dir(Some(Path::new("/keys"))).expect("resolve");
        assert_eq!(resolved, PathBuf::from("/keys"));
    }

    #[test]
    fn empty_key_dir_falls_back_to_default() {
        let Ok(default) = deploy_key_path() else {
            // No home directory in this environment; nothing to compare.
            return;
        };
        let resolved = resolve_key_dir(Some(Path::new(""))).expect("resolve");
        assert_eq!(resolved, default);
        assert!(resolved.ends_with(".forta/.deploy-keys"));
    }
}
