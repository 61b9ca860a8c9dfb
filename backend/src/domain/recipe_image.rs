//! Recipe image naming and upload validation.
//!
//! Stored images never reuse client-supplied names: only the extension of
//! the original filename survives, appended to a fresh random identifier.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::{ImageError, ImageFormat, ImageReader, Limits};

use super::ports::ImageNameGenerator;

/// Directory, relative to the media root, holding recipe images.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Largest width or height accepted for an uploaded image.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;

/// Upper bound on decoder allocations for one upload.
pub const MAX_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

/// Relative storage path of an uploaded recipe image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImagePath(String);

impl ImagePath {
    /// Wrap a path loaded from storage.
    #[must_use]
    pub const fn from_stored(path: String) -> Self {
        Self(path)
    }

    /// Relative path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the storage path for an uploaded recipe image.
///
/// Returns `uploads/recipe/{id}.{ext}` where `{id}` comes from `names` and
/// `{ext}` is the extension of `original_filename`. Extensions that are
/// missing or not plain ASCII alphanumerics are dropped.
///
/// # Examples
/// ```
/// use recipe_api::domain::ports::ImageNameGenerator;
/// use recipe_api::domain::recipe_image_file_path;
///
/// struct Fixed;
/// impl ImageNameGenerator for Fixed {
///     fn next_name(&self) -> String {
///         "test-uuid".to_owned()
///     }
/// }
///
/// let path = recipe_image_file_path("myimage.jpg", &Fixed);
/// assert_eq!(path.as_str(), "uploads/recipe/test-uuid.jpg");
/// ```
pub fn recipe_image_file_path(original_filename: &str, names: &dyn ImageNameGenerator) -> ImagePath {
    let name = names.next_name();
    match image_extension(original_filename) {
        Some(ext) => ImagePath(format!("{RECIPE_IMAGE_DIR}/{name}.{ext}")),
        None => ImagePath(format!("{RECIPE_IMAGE_DIR}/{name}")),
    }
}

/// Extension of `filename` when it is non-empty ASCII alphanumeric.
#[must_use]
pub fn image_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Errors raised when an upload is not an acceptable image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    /// No bytes were sent.
    #[error("image upload is empty")]
    Empty,
    /// The bytes are not a recognised image at all.
    #[error("upload is not a valid image")]
    Unrecognised,
    /// A recognised format outside the accepted set.
    #[error("image format {format} is not supported")]
    UnsupportedFormat {
        /// Detected format name.
        format: String,
    },
    /// The header looked right but the body failed to decode.
    #[error("image could not be decoded: {message}")]
    Corrupt {
        /// Decoder diagnostic.
        message: String,
    },
    /// Declared dimensions or decoded size exceed the decode limits.
    #[error("image is too large: {message}")]
    TooLarge {
        /// Decoder diagnostic.
        message: String,
    },
}

/// Raw upload received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Image bytes.
    pub bytes: Vec<u8>,
    /// Client-supplied filename, used only for its extension.
    pub filename: Option<String>,
}

/// Upload whose bytes decoded as an accepted raster format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    bytes: Vec<u8>,
    extension: &'static str,
}

impl ValidatedImage {
    /// Image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the image bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Canonical extension of the detected format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }
}

/// Decode `bytes` and accept PNG, JPEG, GIF, WebP or BMP.
///
/// Decoding is bounded by [`MAX_IMAGE_DIMENSION`] and [`MAX_DECODE_ALLOC`]
/// but still CPU-bound; call from a blocking context.
pub fn validate_image(bytes: Vec<u8>) -> Result<ValidatedImage, ImageValidationError> {
    validate_within(bytes, upload_limits())
}

fn upload_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

fn validate_within(bytes: Vec<u8>, limits: Limits) -> Result<ValidatedImage, ImageValidationError> {
    if bytes.is_empty() {
        return Err(ImageValidationError::Empty);
    }
    let format = image::guess_format(&bytes).map_err(|_| ImageValidationError::Unrecognised)?;
    let extension = accepted_extension(format).ok_or_else(|| {
        ImageValidationError::UnsupportedFormat {
            format: format!("{format:?}"),
        }
    })?;
    let mut reader = ImageReader::with_format(Cursor::new(bytes.as_slice()), format);
    reader.limits(limits);
    reader.decode().map_err(|err| match err {
        ImageError::Limits(_) => ImageValidationError::TooLarge {
            message: err.to_string(),
        },
        other => ImageValidationError::Corrupt {
            message: other.to_string(),
        },
    })?;
    Ok(ValidatedImage { bytes, extension })
}

const fn accepted_extension(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::WebP => Some("webp"),
        ImageFormat::Bmp => Some("bmp"),
        _ => None,
    }
}
