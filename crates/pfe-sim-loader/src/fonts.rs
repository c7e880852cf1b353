//! Font binaries read from a directory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use pfe_sim_abstract::{FontStore, Result, SimError, WorkerConfig};
use tracing::debug;

/// Loads fonts from `directory`, memoizing every successful read.
///
/// Each worker owns its own loader; the memo is never shared.
#[derive(Debug)]
pub struct FontLoader {
    directory: PathBuf,
    default_font_id: Option<String>,
    cache: RefCell<HashMap<String, Bytes>>,
}

impl FontLoader {
    pub fn new(directory: impl Into<PathBuf>, default_font_id: Option<String>) -> Self {
        Self {
            directory: directory.into(),
            default_font_id,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(&config.font_directory, config.default_font_id.clone())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn resolve<'a>(&'a self, font_id: &'a str) -> Result<&'a str> {
        if !font_id.is_empty() {
            return Ok(font_id);
        }
        self.default_font_id
            .as_deref()
            .ok_or_else(|| SimError::FontNotFound {
                font_id: String::new(),
            })
    }

    fn read(&self, font_id: &str) -> Result<Bytes> {
        let candidates = [
            self.directory.join(font_id),
            self.directory.join(variable_font_alternate_name(font_id)),
        ];
        for path in &candidates {
            match fs::read(path) {
                Ok(data) => {
                    debug!("Loaded font {} from {}", font_id, path.display());
                    return Ok(Bytes::from(data));
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(SimError::FontIo {
                        font_id: font_id.to_string(),
                        source,
                    });
                }
            }
        }
        Err(SimError::FontNotFound {
            font_id: font_id.to_string(),
        })
    }
}

impl FontStore for FontLoader {
    fn load(&self, font_id: &str) -> Result<Bytes> {
        let font_id = self.resolve(font_id)?;
        if let Some(data) = self.cache.borrow().get(font_id) {
            return Ok(data.clone());
        }
        let data = self.read(font_id)?;
        self.cache
            .borrow_mut()
            .insert(font_id.to_string(), data.clone());
        Ok(data)
    }
}

/// File name used on disk for variable fonts: `Roboto[wght].ttf` is stored as
/// `RobotoBwghtB.ttf`.
pub fn variable_font_alternate_name(font_id: &str) -> String {
    font_id.replace(['[', ']'], "B")
}
