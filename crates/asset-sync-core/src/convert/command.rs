use super::ImageConverter;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

const INPUT: &str = "{input}";
const OUTPUT: &str = "{output}";

/// Converter that shells out to an external tool, ImageMagick by default.
///
/// `args` may contain `{input}` and `{output}`, which are replaced by the
/// source and target paths.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![INPUT.to_string(), OUTPUT.to_string()],
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn build_args(&self, source: &Path, target: &Path) -> Vec<String> {
        let input = source.to_string_lossy();
        let output = target.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(INPUT, &input).replace(OUTPUT, &output))
            .collect()
    }
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self::new("magick")
    }
}

impl ImageConverter for CommandConverter {
    fn convert(&self, source: &Path, target: &Path) -> Result<PathBuf, ConvertError> {
        let args = self.build_args(source, target);
        trace!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ConvertError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConvertError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(target.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_build_args_substitutes_paths() {
        let converter = CommandConverter::new("magick").with_args(vec![
            "{input}".to_string(),
            "-strip".to_string(),
            "png:{output}".to_string(),
        ]);
        let args = converter.build_args(Path::new("/a/b c.jpg"), Path::new("/a/b c.png"));
        assert_eq!(args, vec!["/a/b c.jpg", "-strip", "png:/a/b c.png"]);
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let converter = CommandConverter::new("asset-sync-no-such-converter");
        let err = converter
            .convert(Path::new("in.jpg"), Path::new("out.png"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Launch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_program_produces_target() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.jpg");
        let target = tmp.path().join("a.png");
        fs::write(&source, b"pixels").unwrap();

        let produced = CommandConverter::new("cp").convert(&source, &target).unwrap();
        assert_eq!(produced, target);
        assert_eq!(fs::read(&target).unwrap(), b"pixels");
        assert!(source.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_failure() {
        let converter = CommandConverter::new("false").with_args(Vec::new());
        let err = converter
            .convert(Path::new("in.jpg"), Path::new("out.png"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Failed { .. }));
    }
}
