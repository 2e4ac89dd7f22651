use super::*;
use crate::common::error::LTPError;
use cached_path::{Cache, Options, ProgressBar};
use dirs::cache_dir;
use lazy_static::lazy_static;
use std::path::PathBuf;

/// # Remote resource, downloaded and cached locally on first use
#[derive(PartialEq, Clone, Debug)]
pub struct RemoteResource {
    /// Remote path/url for the resource
    pub url: String,
    /// Local subdirectory of the cache root where this resource is saved
    pub cache_subdir: String,
}

impl RemoteResource {
    /// Declares a remote resource and the cache subdirectory it is saved to. Nothing is
    /// downloaded until `get_local_path` is called.
    ///
    /// # Arguments
    ///
    /// * `url` - location of the remote resource
    /// * `cache_subdir` - subdirectory of the cache root to save the resource to
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::resources::RemoteResource;
    /// let labels_resource =
    ///     RemoteResource::new("https://my-mirror/ltp-small/vocab.json", "ltp-small");
    /// ```
    pub fn new(url: &str, cache_subdir: &str) -> RemoteResource {
        RemoteResource {
            url: url.to_string(),
            cache_subdir: cache_subdir.to_string(),
        }
    }

    /// Resource `file_name` of a model published under `base_url`, cached under
    /// `<cache root>/<model_name>`.
    ///
    /// # Arguments
    ///
    /// * `model_name` - name of the model, used as cache subdirectory
    /// * `base_url` - location of the model directory
    /// * `file_name` - file of the model directory (`ltp.onnx`, `vocab.txt` or `vocab.json`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::resources::RemoteResource;
    /// let model_resource = RemoteResource::from_model_directory(
    ///     "ltp-small",
    ///     "https://my-mirror/ltp-small/",
    ///     "ltp.onnx",
    /// );
    /// assert_eq!(model_resource.url, "https://my-mirror/ltp-small/ltp.onnx");
    /// ```
    pub fn from_model_directory(
        model_name: &str,
        base_url: &str,
        file_name: &str,
    ) -> RemoteResource {
        RemoteResource {
            url: format!("{}/{}", base_url.trim_end_matches('/'), file_name),
            cache_subdir: model_name.to_string(),
        }
    }
}

impl ResourceProvider for RemoteResource {
    /// Downloads the resource on first use and returns the path of the cached copy.
    ///
    /// Fails with a `FileDownloadError` if the cache directory is unusable or the download fails.
    fn get_local_path(&self) -> Result<PathBuf, LTPError> {
        let cache = CACHE
            .as_ref()
            .map_err(|error| LTPError::FileDownloadError(error.clone()))?;
        let options = Options::default().subdir(&self.cache_subdir);
        Ok(cache.cached_path_with_options(&self.url, &options)?)
    }
}

lazy_static! {
    /// # Global model cache
    /// Located at `$LTP_CACHE` if set, `<user cache directory>/.ltp` otherwise.
    pub static ref CACHE: Result<Cache, String> = Cache::builder()
        .dir(cache_directory())
        .progress_bar(Some(ProgressBar::Light))
        .build()
        .map_err(|error| format!("could not set up the model cache: {error}"));
}

fn cache_directory() -> PathBuf {
    match std::env::var("LTP_CACHE") {
        Ok(value) => PathBuf::from(value),
        Err(_) => {
            let mut home = cache_dir().unwrap_or_else(std::env::temp_dir);
            home.push(".ltp");
            home
        }
    }
}
