// Copyright 2019 Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::common::error::LTPError;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// # Utility to deserialize JSON configuration files
pub trait Config
where
    Self: Sized + DeserializeOwned,
{
    /// Loads a `Config` object from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - `Path` to the JSON file to deserialize
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::pipelines::vocabs::Vocab;
    /// use ltp::Config;
    /// use std::path::Path;
    ///
    /// let vocab = Vocab::from_file(Path::new("path/to/vocab.json"));
    /// ```
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LTPError> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LTPError::IOError(format!("could not open {}: {}", path.display(), e))
        })?;
        let br = BufReader::new(f);
        let config = serde_json::from_reader(br)?;
        Ok(config)
    }
}
