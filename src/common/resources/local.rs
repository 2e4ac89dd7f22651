use crate::common::error::LTPError;
use crate::resources::ResourceProvider;
use std::path::PathBuf;

/// # Local resource
#[derive(PartialEq, Clone, Debug)]
pub struct LocalResource {
    /// Local path for the resource
    pub local_path: PathBuf,
}

impl LocalResource {
    /// Points to a file located in a model directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::resources::LocalResource;
    /// let model_resource = LocalResource::from_directory("path/to/model", "ltp.onnx");
    /// ```
    pub fn from_directory<P: Into<PathBuf>>(directory: P, file_name: &str) -> LocalResource {
        let mut local_path = directory.into();
        local_path.push(file_name);
        LocalResource { local_path }
    }
}

impl From<PathBuf> for LocalResource {
    fn from(local_path: PathBuf) -> Self {
        LocalResource { local_path }
    }
}

impl ResourceProvider for LocalResource {
    /// Gets the path for a local resource.
    ///
    /// Fails with an `IOError` if nothing exists at that location.
    ///
    /// # Returns
    ///
    /// * `PathBuf` pointing to the resource file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::resources::{LocalResource, ResourceProvider};
    /// use std::path::PathBuf;
    /// let vocab_resource = LocalResource {
    ///     local_path: PathBuf::from("path/to/vocab.txt"),
    /// };
    /// let vocab_path = vocab_resource.get_local_path();
    /// ```
    fn get_local_path(&self) -> Result<PathBuf, LTPError> {
        if !self.local_path.exists() {
            return Err(LTPError::IOError(format!(
                "resource not found: {}",
                self.local_path.display()
            )));
        }
        Ok(self.local_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn missing_local_resource_is_an_error() {
        let resource = LocalResource::from_directory("does/not/exist", "ltp.onnx");
        assert!(matches!(
            resource.get_local_path(),
            Err(LTPError::IOError(_))
        ));
    }

    #[test]
    fn existing_local_resource_resolves() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        File::create(dir.path().join("vocab.txt"))?;
        let resource = LocalResource::from_directory(dir.path(), "vocab.txt");
        assert_eq!(resource.get_local_path()?, dir.path().join("vocab.txt"));
        Ok(())
    }
}
