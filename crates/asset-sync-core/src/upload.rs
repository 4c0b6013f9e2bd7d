//! Where an uploaded product image lands on disk.
//!
//! Everything here is a pure function of [`UploadContext`]; creating the
//! directory and writing the bytes is left to the caller.

use std::path::{Path, PathBuf};

const DEFAULT_CATEGORY: &str = "men";
const DEFAULT_PRODUCT: &str = "unnamed";
const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct UploadContext {
    pub base: PathBuf,
    pub category: Option<String>,
    pub product_name: Option<String>,
    pub original_file_name: String,
    /// Caller-supplied uniquifier, typically a timestamp.
    pub unique_suffix: String,
}

/// Lower-case and replace anything outside `[a-z0-9-]` with `-`.
pub fn sanitize_segment(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' { c } else { '-' })
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `base/<category>/<product>` for the upload.
pub fn destination(ctx: &UploadContext) -> PathBuf {
    let category = non_blank(&ctx.category).unwrap_or(DEFAULT_CATEGORY);
    let product = non_blank(&ctx.product_name).unwrap_or(DEFAULT_PRODUCT);
    ctx.base
        .join(sanitize_segment(category))
        .join(sanitize_segment(product))
}

/// `<sanitized stem>-<suffix>.<ext>`, extension lower-cased.
pub fn file_name(ctx: &UploadContext) -> String {
    let original = Path::new(&ctx.original_file_name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = sanitize_segment(&stem);
    match original.extension() {
        Some(ext) => format!(
            "{}-{}.{}",
            stem,
            ctx.unique_suffix,
            ext.to_string_lossy().to_lowercase()
        ),
        None => format!("{}-{}", stem, ctx.unique_suffix),
    }
}

pub fn target_path(ctx: &UploadContext) -> PathBuf {
    destination(ctx).join(file_name(ctx))
}

/// Whether the upload endpoint takes files with this name.
pub fn accepts(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(category: Option<&str>, product: Option<&str>, file: &str) -> UploadContext {
        UploadContext {
            base: PathBuf::from("storage/uploads"),
            category: category.map(String::from),
            product_name: product.map(String::from),
            original_file_name: file.to_string(),
            unique_suffix: "1700000000000".to_string(),
        }
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Classic V Cut"), "classic-v-cut");
        assert_eq!(sanitize_segment("Fit Shorts (Black)"), "fit-shorts--black-");
        assert_eq!(sanitize_segment("boys-2"), "boys-2");
    }

    #[test]
    fn test_destination_defaults() {
        let c = ctx(None, Some("  "), "a.png");
        assert_eq!(destination(&c), PathBuf::from("storage/uploads/men/unnamed"));
    }

    #[test]
    fn test_destination_and_file_name() {
        let c = ctx(Some("Women"), Some("Shorty Panties"), "Front View.JPG");
        assert_eq!(
            target_path(&c),
            PathBuf::from("storage/uploads/women/shorty-panties/front-view-1700000000000.jpg")
        );
    }

    #[test]
    fn test_file_name_without_extension() {
        let c = ctx(None, None, "scan");
        assert_eq!(file_name(&c), "scan-1700000000000");
    }

    #[test]
    fn test_accepts() {
        assert!(accepts("a.JPG"));
        assert!(accepts("b.webp"));
        assert!(!accepts("c.heic"));
        assert!(!accepts("noext"));
    }
}
