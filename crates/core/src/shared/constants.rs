/// Boxes overlapping more than this are treated as one face.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.3;

/// Descriptor distance below which two faces are the same person.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.6;

/// Tighter distance threshold the CLI uses by default.
pub const CLI_DISTANCE_THRESHOLD: f64 = 0.55;

pub const DETECTION_FILE_EXTENSIONS: &[&str] = &["json"];
