use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::input::domain::detection_source::DetectionSource;
use crate::shared::constants::DETECTION_FILE_EXTENSIONS;
use crate::shared::detection::{Detection, ImageDetections};

#[derive(Error, Debug)]
pub enum DetectionReadError {
    #[error("detection input not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level object of a batch file.
#[derive(Deserialize)]
struct BatchFile {
    images: Vec<ImageDetections>,
}

/// Reads detections from JSON files.
///
/// A file holding an array of detection records is one image named after
/// the file. A file holding `{"images": [{"name", "detections"}]}` is a
/// batch. A directory is read file by file, sorted by name, skipping files
/// without a `.json` extension.
pub struct JsonDetectionReader;

impl JsonDetectionReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<Vec<ImageDetections>, DetectionReadError> {
        if !path.exists() {
            return Err(DetectionReadError::NotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            let mut images = Vec::new();
            for file in detection_files(path)? {
                images.extend(read_file(&file)?);
            }
            Ok(images)
        } else {
            read_file(path)
        }
    }
}

impl Default for JsonDetectionReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionSource for JsonDetectionReader {
    fn load(&self, path: &Path) -> Result<Vec<ImageDetections>, Box<dyn std::error::Error>> {
        Ok(self.read(path)?)
    }
}

fn read_file(path: &Path) -> Result<Vec<ImageDetections>, DetectionReadError> {
    let text = fs::read_to_string(path).map_err(|source| DetectionReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_images(&text, path).map_err(|source| DetectionReadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Picks single-image or batch layout from the top-level JSON shape, so
/// errors point at the offending record instead of a failed variant match.
fn parse_images(text: &str, path: &Path) -> Result<Vec<ImageDetections>, serde_json::Error> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        value @ serde_json::Value::Array(_) => {
            let detections: Vec<Detection> = serde_json::from_value(value)?;
            Ok(vec![ImageDetections::new(image_name(path), detections)])
        }
        value @ serde_json::Value::Object(_) => {
            let batch: BatchFile = serde_json::from_value(value)?;
            Ok(batch.images)
        }
        _ => Err(serde::de::Error::custom(
            "expected an array of detections or an object with \"images\"",
        )),
    }
}

fn detection_files(dir: &Path) -> Result<Vec<PathBuf>, DetectionReadError> {
    let io_err = |source| DetectionReadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_detection_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_detection_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DETECTION_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// `photo.jpg.json` → `photo.jpg`, `scan.json` → `scan`.
fn image_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
