/*
 * @file vision.rs
 * @brief Decoding of uploaded meal photos and nutrition labels
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Image decoding for the multimodal request path.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, ImageReader};

use crate::error::ImageError;

/// An uploaded image that decoded successfully.
///
/// The original bytes are kept so the model receives exactly what the user
/// uploaded; decoding only proves the blob is a readable image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    /// Base64 payload for inline request parts.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Decodes an uploaded blob, accepting JPEG and PNG.
///
/// # Errors
/// Returns [`ImageError`] when the blob is empty, is not a recognizable
/// image, or is a format the multimodal path does not accept.
pub fn decode_image(blob: &[u8]) -> Result<DecodedImage, ImageError> {
    if blob.is_empty() {
        return Err(ImageError::Empty);
    }
    let reader = ImageReader::new(Cursor::new(blob))
        .with_guessed_format()
        .map_err(|err| ImageError::Decode(err.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| ImageError::Decode("unrecognized image data".to_string()))?;
    let mime_type = mime_for(format)?;
    let image = reader
        .decode()
        .map_err(|err| ImageError::Decode(err.to_string()))?;
    Ok(DecodedImage {
        mime_type,
        bytes: blob.to_vec(),
        width: image.width(),
        height: image.height(),
    })
}

fn mime_for(format: ImageFormat) -> Result<&'static str, ImageError> {
    match format {
        ImageFormat::Jpeg => Ok("image/jpeg"),
        ImageFormat::Png => Ok("image/png"),
        other => Err(ImageError::Unsupported(format!("{:?}", other))),
    }
}
