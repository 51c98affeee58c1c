pub mod json_detection_reader;
