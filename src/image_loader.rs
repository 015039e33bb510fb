use crate::constants::IMAGE_EXTENSIONS;
use crate::data_uri;
use crate::error::BinderError;
use egui::{ColorImage, DroppedFile};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::Path;

/// Whether a dropped or picked file should be treated as an image. The MIME type
/// wins when the platform provides one, otherwise the extension decides.
pub fn is_image_file(path: Option<&Path>, mime: &str) -> bool {
    if !mime.is_empty() {
        return mime.starts_with("image/");
    }
    path.and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// The file a drop onto a slot loads: the first image in the drop. The rest are ignored.
pub fn first_image_file(files: &[DroppedFile]) -> Option<&DroppedFile> {
    files
        .iter()
        .find(|file| is_image_file(file.path.as_deref(), &file.mime))
}

/// MIME type of an image, sniffed from its bytes with the file name as fallback.
pub fn sniff_mime(bytes: &[u8], name: Option<&Path>) -> Result<&'static str, BinderError> {
    let format = image::guess_format(bytes)
        .or_else(|err| match name {
            Some(path) => ImageFormat::from_path(path),
            None => Err(err),
        })
        .map_err(|err| BinderError::UnsupportedImage(err.to_string()))?;
    Ok(format.to_mime_type())
}

/// Encodes raw image bytes into the data URI stored in a slot.
pub fn encode_image_bytes(bytes: &[u8], name: Option<&Path>) -> Result<String, BinderError> {
    let mime = sniff_mime(bytes, name)?;
    Ok(data_uri::encode(mime, bytes))
}

pub fn encode_image_file(path: &Path) -> Result<String, BinderError> {
    let bytes = fs::read(path)
        .map_err(|err| BinderError::Io(format!("Failed to read {}: {err}", path.display())))?;
    encode_image_bytes(&bytes, Some(path))
}

/// Decodes a slot image into pixels for display, shrunk so its longest edge is at
/// most `max_dimension`. Animated sources yield their first frame.
pub fn decode_thumbnail(uri: &str, max_dimension: u32) -> Result<ColorImage, String> {
    let (_, bytes) = data_uri::decode(uri).map_err(|err| err.to_string())?;
    let format =
        image::guess_format(&bytes).map_err(|err| format!("Failed to determine format: {err}"))?;

    let image = match format {
        ImageFormat::Avif => decode_static(&bytes, ImageFormat::Avif).or_else(|err| {
            log::debug!("Falling back to libavif decode: {err}");
            avif_support::decode_first_frame(&bytes)
        }),
        _ => decode_static(&bytes, format),
    }?;

    let image = if image.width() > max_dimension || image.height() > max_dimension {
        image.thumbnail(max_dimension, max_dimension)
    } else {
        image
    };
    Ok(color_image_from_dynamic(image))
}

fn decode_static(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, String> {
    image::load_from_memory_with_format(bytes, format)
        .map_err(|err| format!("Failed to decode image: {err}"))
}

fn color_image_from_dynamic(image: DynamicImage) -> ColorImage {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw())
}

mod avif_support {
    use image::{DynamicImage, RgbaImage};

    pub fn decode_first_frame(bytes: &[u8]) -> Result<DynamicImage, String> {
        let decoder =
            DecoderGuard::new().ok_or_else(|| "Failed to create AVIF decoder".to_string())?;

        unsafe {
            let result =
                libavif_sys::avifDecoderSetIOMemory(decoder.decoder, bytes.as_ptr(), bytes.len());
            if result != libavif_sys::AVIF_RESULT_OK {
                return Err(format!("avifDecoderSetIOMemory failed: {}", result as i32));
            }

            let result = libavif_sys::avifDecoderParse(decoder.decoder);
            if result != libavif_sys::AVIF_RESULT_OK {
                return Err(format!("avifDecoderParse failed: {}", result as i32));
            }

            let result = libavif_sys::avifDecoderNextImage(decoder.decoder);
            if result != libavif_sys::AVIF_RESULT_OK {
                return Err(format!("avifDecoderNextImage failed: {}", result as i32));
            }
        }

        let image = unsafe { (*decoder.decoder).image };
        if image.is_null() {
            return Err("AVIF decode produced no image".to_string());
        }
        let (width, height) = unsafe { ((*image).width, (*image).height) };
        if width == 0 || height == 0 {
            return Err("AVIF image has no pixels".to_string());
        }

        let mut rgb = RgbImageGuard::new();
        rgb.allocate(image);
        rgb.convert_from_yuv(image);
        let pixels = rgb.extract_pixels();

        RgbaImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| "AVIF pixel buffer has the wrong size".to_string())
    }

    struct DecoderGuard {
        decoder: *mut libavif_sys::avifDecoder,
    }

    impl DecoderGuard {
        fn new() -> Option<Self> {
            let decoder = unsafe { libavif_sys::avifDecoderCreate() };
            if decoder.is_null() {
                None
            } else {
                Some(Self { decoder })
            }
        }
    }

    impl Drop for DecoderGuard {
        fn drop(&mut self) {
            unsafe {
                libavif_sys::avifDecoderDestroy(self.decoder);
            }
        }
    }

    struct RgbImageGuard {
        rgb: libavif_sys::avifRGBImage,
        allocated: bool,
    }

    impl RgbImageGuard {
        fn new() -> Self {
            Self {
                rgb: unsafe { std::mem::zeroed() },
                allocated: false,
            }
        }

        fn allocate(&mut self, image: *const libavif_sys::avifImage) {
            unsafe {
                libavif_sys::avifRGBImageSetDefaults(&mut self.rgb, image);
                self.rgb.format = libavif_sys::AVIF_RGB_FORMAT_RGBA;
                self.rgb.depth = 8;
                libavif_sys::avifRGBImageAllocatePixels(&mut self.rgb);
                self.allocated = true;
            }
        }

        fn convert_from_yuv(&mut self, image: *const libavif_sys::avifImage) {
            unsafe {
                libavif_sys::avifImageYUVToRGB(image, &mut self.rgb);
            }
        }

        // Rows may be padded; copy them out tightly packed.
        fn extract_pixels(&self) -> Vec<u8> {
            let width = self.rgb.width;
            let height = self.rgb.height;
            let row_bytes = self.rgb.rowBytes;

            let mut packed_pixels = Vec::with_capacity((width * height * 4) as usize);
            unsafe {
                let pixel_slice =
                    std::slice::from_raw_parts(self.rgb.pixels, (row_bytes * height) as usize);
                for y in 0..height {
                    let src_offset = (y * row_bytes) as usize;
                    let src_row = &pixel_slice[src_offset..src_offset + (width * 4) as usize];
                    packed_pixels.extend_from_slice(src_row);
                }
            }
            packed_pixels
        }
    }

    impl Drop for RgbImageGuard {
        fn drop(&mut self) {
            if self.allocated {
                unsafe {
                    libavif_sys::avifRGBImageFreePixels(&mut self.rgb);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::new_rgba8(width, height);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(None, "image/png"));
        assert!(!is_image_file(Some(Path::new("a.png")), "text/plain"));
        assert!(is_image_file(Some(Path::new("photo.JPG")), ""));
        assert!(!is_image_file(Some(Path::new("notes.txt")), ""));
        assert!(!is_image_file(None, ""));
    }

    fn dropped(name: &str, mime: &str) -> DroppedFile {
        DroppedFile {
            path: Some(PathBuf::from(name)),
            name: name.to_owned(),
            mime: mime.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_image_file_skips_non_images() {
        let files = [
            dropped("notes.txt", "text/plain"),
            dropped("front.png", "image/png"),
            dropped("back.jpg", "image/jpeg"),
        ];
        let file = first_image_file(&files).unwrap();
        assert_eq!(file.name, "front.png");
    }

    #[test]
    fn test_first_image_file_without_images() {
        let files = [dropped("notes.txt", "text/plain"), dropped("data.json", "")];
        assert!(first_image_file(&files).is_none());
        assert!(first_image_file(&[]).is_none());
    }

    #[test]
    fn test_first_image_file_falls_back_to_extension() {
        let files = [dropped("scan.webp", "")];
        assert_eq!(first_image_file(&files).unwrap().name, "scan.webp");
    }

    #[test]
    fn test_sniff_prefers_content() {
        let bytes = png_bytes(2, 2);
        let misnamed = PathBuf::from("really_a_png.jpg");
        assert_eq!(sniff_mime(&bytes, Some(&misnamed)).unwrap(), "image/png");
    }

    #[test]
    fn test_sniff_rejects_non_images() {
        assert!(sniff_mime(b"plain text", Some(Path::new("notes.txt"))).is_err());
        assert!(encode_image_bytes(b"plain text", None).is_err());
    }

    #[test]
    fn test_encode_produces_png_data_uri() {
        let uri = encode_image_bytes(&png_bytes(1, 1), None).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_thumbnail_limits_size() {
        let uri = encode_image_bytes(&png_bytes(40, 10), None).unwrap();
        let image = decode_thumbnail(&uri, 20).unwrap();
        assert_eq!(image.size, [20, 5]);

        let small = decode_thumbnail(&uri, 100).unwrap();
        assert_eq!(small.size, [40, 10]);
    }

    #[test]
    fn test_decode_thumbnail_rejects_garbage() {
        assert!(decode_thumbnail("data:image/png;base64,AAAA", 10).is_err());
        assert!(decode_thumbnail("not a uri", 10).is_err());
    }
}
