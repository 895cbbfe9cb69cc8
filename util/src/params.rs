//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the toolkit's root directory.
pub const ROOT_ENV_VAR: &str = "CDK_ROOT";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// Relative paths are resolved against `$CDK_ROOT/params` when the variable is
/// set, otherwise against the working directory.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let path = resolve(param_file_path);

    // Load the file into a string
    let params_str = match read_to_string(&path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(path, e)),
    };

    from_str(params_str.as_str())
}

/// Parse parameters from a TOML string
pub fn from_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    match toml::from_str(params_str) {
        Ok(p) => Ok(p),
        Err(e) => Err(LoadError::DeserialiseError(e)),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn resolve(param_file_path: &str) -> PathBuf {
    let given = Path::new(param_file_path);

    if given.is_absolute() {
        return given.to_path_buf();
    }

    match std::env::var_os(ROOT_ENV_VAR) {
        Some(root) => {
            let mut path = PathBuf::from(root);
            path.push("params");
            path.push(given);
            path
        }
        None => given.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct TestParams {
        precision: usize,
        unit: String,
    }

    #[test]
    fn test_from_str() -> Result<(), LoadError> {
        let p: TestParams = from_str("precision = 4\nunit = \"m/s\"\n")?;

        assert_eq!(p.precision, 4);
        assert_eq!(p.unit, "m/s");

        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let res: Result<TestParams, _> = load("/nonexistent/cdk_params.toml");

        assert!(matches!(res, Err(LoadError::FileLoadError(_, _))));
    }
}
