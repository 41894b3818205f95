//! File processor module with compile-time limits and global logging integration

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::log_debug;
use crate::logging::codes;
pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Create a file processor with default settings
pub fn create_processor() -> FileProcessor {
    FileProcessor::new()
}

/// Create a file processor from runtime preferences
pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

pub fn get_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

/// Validate file processor error codes and report the compiled limits (for system startup)
pub fn init_file_processor_logging() -> Result<(), String> {
    let test_codes = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::EMPTY_FILE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
    ];

    for code in &test_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT_FOR_ANALYSIS);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("program.txt");
        fs::write(&file_path, "if (a >= b) a = b;\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.metadata.line_count, 1);
    }

    #[test]
    fn test_create_processor_from_preferences() {
        let prefs = FileProcessorPreferences {
            enable_performance_logging: false,
            reject_empty_files: false,
        };
        let processor = create_processor_from_preferences(&prefs);
        assert!(!processor.enable_performance_logging);
        assert!(create_processor().enable_performance_logging);
    }

    #[test]
    fn test_error_helpers() {
        let error = FileProcessorError::FileNotFound {
            path: "missing.txt".to_string(),
        };
        assert!(should_halt_on_error(&error));

        let error = FileProcessorError::EmptyFile {
            path: "empty.txt".to_string(),
        };
        assert!(!should_halt_on_error(&error));
    }

    #[test]
    fn test_compile_time_constants_access() {
        assert_eq!(get_max_file_size(), MAX_FILE_SIZE);
        assert_eq!(get_large_file_threshold(), LARGE_FILE_THRESHOLD);
        assert!(get_large_file_threshold() <= get_max_file_size());
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }
}
