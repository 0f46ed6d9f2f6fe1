//! RGBA8 pixel buffers in OpenGL row order.

use crate::error::{Error, Result};
use std::{fs, io, path::Path};

/// An RGBA8 image whose first row is the **bottom** row, matching
/// `glReadPixels` and `glTexImage2D`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pixels {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixels {
    /// Constructor.
    ///
    /// `data` must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(data.len()) {
            return Err(Error::InvalidImageSize { width, height, len: data.len() });
        }
        Ok(Pixels { width, height, data })
    }

    /// An image filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Pixels { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, bottom row first.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the RGBA value at `(x, y)`, with `y = 0` at the bottom.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    /// Reverses the row order in place.
    pub fn flip_vertical(&mut self) {
        let stride = self.width as usize * 4;
        if stride == 0 {
            return;
        }
        let rows = self.height as usize;
        for row in 0..rows / 2 {
            let (top, bottom) = self.data.split_at_mut((rows - 1 - row) * stride);
            top[row * stride..(row + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }

    /// Encodes the image as PNG, top row first as the format expects.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut flipped = self.clone();
        flipped.flip_vertical();
        let image = image::RgbaImage::from_raw(self.width, self.height, flipped.data)
            .ok_or(Error::InvalidImageSize {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            })?;
        let mut bytes = io::Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Decodes a PNG image.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
        Ok(Self::from_image(image))
    }

    /// Decodes any supported image format, guessing it from the content.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(image))
    }

    fn from_image(image: image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixels = Pixels { width, height, data: rgba.into_raw() };
        pixels.flip_vertical();
        pixels
    }

    /// Writes the image to `path` as PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode_png().map_err(|err| match err {
            Error::Codec(source) => Error::Image { path: path.to_owned(), source },
            other => other,
        })?;
        fs::write(path, bytes).map_err(|err| Error::io(path, err))
    }

    /// Reads and decodes the image at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| Error::io(path, err))?;
        Self::decode(&bytes).map_err(|err| match err {
            Error::Codec(source) => Error::Image { path: path.to_owned(), source },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Pixels {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, (x * y) as u8, 255]);
            }
        }
        Pixels::new(width, height, data).unwrap()
    }

    #[test]
    fn rejects_wrong_length() {
        match Pixels::new(2, 2, vec![0; 15]) {
            Err(Error::InvalidImageSize { width: 2, height: 2, len: 15 }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn flip_is_self_inverse() {
        let original = gradient(3, 5);
        let mut pixels = original.clone();
        pixels.flip_vertical();
        assert_ne!(pixels, original);
        assert_eq!(pixels.get(1, 0), original.get(1, 4));
        pixels.flip_vertical();
        assert_eq!(pixels, original);
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let original = gradient(7, 4);
        let bytes = original.encode_png().unwrap();
        assert_eq!(Pixels::decode_png(&bytes).unwrap(), original);
    }

    #[test]
    fn png_stores_top_row_first() {
        let mut data = vec![0; 2 * 2 * 4];
        // bottom row red, top row blue
        data[..8].copy_from_slice(&[255, 0, 0, 255, 255, 0, 0, 255]);
        data[8..].copy_from_slice(&[0, 0, 255, 255, 0, 0, 255, 255]);
        let pixels = Pixels::new(2, 2, data).unwrap();
        let bytes = pixels.encode_png().unwrap();
        let image = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn save_and_load_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let original = gradient(4, 4);
        original.save_png(&path).unwrap();
        assert_eq!(Pixels::load(&path).unwrap(), original);
    }

    #[test]
    fn load_reports_path_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        match Pixels::load(&path) {
            Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
