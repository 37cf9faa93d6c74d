use image::codecs::png::PngEncoder;
use image::{ImageError, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT: &str = "before-after-post.png";

/// Maximum accepted input dimension in pixels (per axis).
const MAX_INPUT_DIM: u32 = 32_768;

/// Common RAW camera file extensions (lowercase).
pub const RAW_EXTENSIONS: &[&str] = &[
    "cr2", "cr3", "nef", "nrw", "arw", "srf", "sr2", "dng", "orf", "rw2", "pef", "raf", "raw",
    "rwl", "srw", "x3f", "3fr", "fff", "iiq", "mrw", "mef", "mos", "kdc", "dcr", "erf",
];

/// Check if a file extension is a known RAW format.
pub fn is_raw_extension(ext: &str) -> bool {
    RAW_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Decode(ImageError),
    Raw(String),
    Empty,
    TooLarge(u32, u32),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Decode(e) => write!(f, "Decode error: {}", e),
            LoadError::Raw(e) => write!(f, "{}", e),
            LoadError::Empty => write!(f, "Image has zero width or height"),
            LoadError::TooLarge(w, h) => write!(
                f,
                "Image size {}x{} exceeds maximum allowed {}x{}",
                w, h, MAX_INPUT_DIM, MAX_INPUT_DIM
            ),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<ImageError> for LoadError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::IoError(io) => LoadError::Io(io),
            other => LoadError::Decode(other),
        }
    }
}

/// Decode a RAW camera file to an sRGB RgbaImage.
/// Uses rawloader for decoding and imagepipe for demosaicing + colour processing.
pub fn decode_raw_image(path: &Path) -> Result<RgbaImage, LoadError> {
    let mut pipeline = imagepipe::Pipeline::new_from_file(path)
        .map_err(|e| LoadError::Raw(format!("RAW decode error: {}", e)))?;

    let srgb = pipeline
        .output_8bit(None)
        .map_err(|e| LoadError::Raw(format!("RAW processing error: {}", e)))?;

    let width = srgb.width;
    let height = srgb.height;

    // srgb.data is packed RGB, 3 bytes per pixel
    let pixel_count = width * height;
    if srgb.data.len() < pixel_count * 3 {
        return Err(LoadError::Raw(format!(
            "RAW buffer too short: expected {} bytes, got {}",
            pixel_count * 3,
            srgb.data.len()
        )));
    }
    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for px in srgb.data[..pixel_count * 3].chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }

    RgbaImage::from_raw(width as u32, height as u32, rgba)
        .ok_or_else(|| LoadError::Raw("Failed to create image from RAW data".to_string()))
}

/// Load a photo for one of the image slots.
///
/// Standard raster formats go through the `image` crate; RAW camera files
/// are demosaiced to 8-bit sRGB. Zero-sized or oversized images are rejected.
pub fn load_image(path: &Path) -> Result<RgbaImage, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let img = if is_raw_extension(&ext) {
        decode_raw_image(path)?
    } else {
        image::open(path)?.to_rgba8()
    };

    validate_dimensions(&img)?;
    crate::log_info!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Decode an in-memory encoded image (PNG, JPEG, …).
pub fn load_image_bytes(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    validate_dimensions(&img)?;
    Ok(img)
}

fn validate_dimensions(img: &RgbaImage) -> Result<(), LoadError> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(LoadError::Empty);
    }
    if w > MAX_INPUT_DIM || h > MAX_INPUT_DIM {
        return Err(LoadError::TooLarge(w, h));
    }
    Ok(())
}

/// Encode the composite as PNG into `writer`.
pub fn encode_png<W: std::io::Write>(image: &RgbaImage, writer: W) -> Result<(), ImageError> {
    let encoder = PngEncoder::new(writer);
    #[allow(deprecated)]
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )
}

/// Write the composite to `path` as PNG. Always PNG, whatever the extension.
pub fn export_png(image: &RgbaImage, path: &Path) -> Result<(), ImageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    encode_png(image, BufWriter::new(file))?;
    crate::log_info!("Exported {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn raw_extensions_are_case_insensitive() {
        assert!(is_raw_extension("CR2"));
        assert!(is_raw_extension("dng"));
        assert!(!is_raw_extension("png"));
        assert!(!is_raw_extension(""));
    }

    #[test]
    fn png_export_decodes_back() {
        let mut img = RgbaImage::from_pixel(5, 3, Rgba([10, 20, 30, 255]));
        img.put_pixel(4, 2, Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        encode_png(&img, &mut bytes).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let back = load_image_bytes(&bytes).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn export_writes_file_and_creates_dirs() {
        let dir = std::env::temp_dir().join(format!("beforeafter-io-{}", std::process::id()));
        let path = dir.join("out").join(DEFAULT_OUTPUT);
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        export_png(&img, &path).unwrap();
        assert_eq!(load_image(&path).unwrap().dimensions(), (4, 4));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(load_image_bytes(b"not an image").is_err());
    }
}
