//! The floating-point image buffer the process pipe operates on.
//!
//! An [`Image`] is an interleaved H×W×3 `f32` buffer tagged with its color
//! space and a linear/encoded flag. Buffers are immutable by convention:
//! transforms take the previous node's output by reference and produce a
//! fresh buffer, and pipes that must branch from the same source state
//! (preview vs. export) deep-copy it.

use crate::core::colorspace::{self, ColorSpace};
use crate::core::error::{ComputeError, ComputeResult, HdrPipeError, HdrPipeResult};
use image::codecs::hdr::HdrEncoder;
use image::{Rgb, Rgb32FImage, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// A 3-channel floating-point image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Vec<f32>,
    width: usize,
    height: usize,
    /// Color space the samples are expressed in.
    pub color_space: ColorSpace,
    /// True when the sRGB CCTF has been decoded (or the source was linear).
    pub linear: bool,
    /// Originating file, when the image was read from disk.
    pub path: Option<PathBuf>,
}

impl Image {
    /// Create an image from an interleaved buffer. The buffer length must
    /// equal `width * height * 3`.
    pub fn from_data(
        data: Vec<f32>,
        width: usize,
        height: usize,
        color_space: ColorSpace,
        linear: bool,
    ) -> ComputeResult<Self> {
        if data.len() != width * height * 3 {
            return Err(ComputeError::ShapeMismatch(format!(
                "buffer of {} samples for {}x{}x3",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            color_space,
            linear,
            path: None,
        })
    }

    /// Create a constant-filled linear sRGB image.
    pub fn filled(width: usize, height: usize, value: [f32; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&value);
        }
        Self {
            data,
            width,
            height,
            color_space: ColorSpace::Srgb,
            linear: true,
            path: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved sample buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the sample buffer.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// One pixel, by column and row.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Read an image from disk.
    ///
    /// Radiance `.hdr` files decode to linear samples directly; LDR formats
    /// decode through the sRGB CCTF so every image enters the pipe linear.
    pub fn read(path: impl AsRef<Path>) -> HdrPipeResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)?;
        let buf: Rgb32FImage = decoded.to_rgb32f();
        let (width, height) = (buf.width() as usize, buf.height() as usize);
        let mut data = buf.into_raw();

        let is_hdr = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("hdr"))
            .unwrap_or(false);
        if !is_hdr {
            colorspace::slice_cctf_decode(&mut data);
        }

        log::debug!("read {} ({}x{}, hdr={})", path.display(), width, height, is_hdr);
        let mut img = Self::from_data(data, width, height, ColorSpace::Srgb, true)
            .map_err(HdrPipeError::Compute)?;
        img.path = Some(path.to_path_buf());
        Ok(img)
    }

    /// Write the image to disk. `.hdr` keeps the linear floating-point
    /// samples; any other extension encodes to 8-bit sRGB.
    pub fn write(&self, path: impl AsRef<Path>) -> HdrPipeResult<()> {
        let path = path.as_ref();
        let is_hdr = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("hdr"))
            .unwrap_or(false);

        if is_hdr {
            let file = BufWriter::new(File::create(path)?);
            let pixels: Vec<Rgb<f32>> = self
                .data
                .chunks_exact(3)
                .map(|px| Rgb([px[0], px[1], px[2]]))
                .collect();
            HdrEncoder::new(file).encode(&pixels, self.width, self.height)?;
        } else {
            let mut encoded = self.data.clone();
            if self.linear {
                colorspace::slice_cctf_encode(&mut encoded);
            }
            let bytes: Vec<u8> = encoded
                .iter()
                .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
                .collect();
            let buf = RgbImage::from_raw(self.width as u32, self.height as u32, bytes)
                .ok_or_else(|| HdrPipeError::Config("image buffer size mismatch".into()))?;
            buf.save(path)?;
        }
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    /// Split into an `nb_w` x `nb_h` grid of non-overlapping tiles,
    /// row-major. Trailing tiles absorb the division remainder. The
    /// color-space tag and linear flag carry through to every tile.
    pub fn split(&self, nb_w: usize, nb_h: usize) -> Vec<Vec<Image>> {
        let base_w = self.width / nb_w;
        let base_h = self.height / nb_h;
        let mut rows = Vec::with_capacity(nb_h);
        for ty in 0..nb_h {
            let y0 = ty * base_h;
            let y1 = if ty == nb_h - 1 { self.height } else { y0 + base_h };
            let mut row = Vec::with_capacity(nb_w);
            for tx in 0..nb_w {
                let x0 = tx * base_w;
                let x1 = if tx == nb_w - 1 { self.width } else { x0 + base_w };
                let (tw, th) = (x1 - x0, y1 - y0);
                let mut data = Vec::with_capacity(tw * th * 3);
                for y in y0..y1 {
                    let start = (y * self.width + x0) * 3;
                    data.extend_from_slice(&self.data[start..start + tw * 3]);
                }
                row.push(Image {
                    data,
                    width: tw,
                    height: th,
                    color_space: self.color_space,
                    linear: self.linear,
                    path: None,
                });
            }
            rows.push(row);
        }
        rows
    }

    /// Merge a grid of tiles (as produced by [`Image::split`]) back into
    /// one image. Tiles within a row must share a height, rows must agree
    /// on total width, and all tiles must share color space and linearity.
    pub fn merge(grid: &[Vec<Image>]) -> ComputeResult<Image> {
        let first = grid
            .first()
            .and_then(|r| r.first())
            .ok_or_else(|| ComputeError::ShapeMismatch("empty tile grid".into()))?;
        let color_space = first.color_space;
        let linear = first.linear;

        let total_width: usize = grid[0].iter().map(|t| t.width).sum();
        let total_height: usize = grid.iter().map(|r| r[0].height).sum();

        let mut data = vec![0.0f32; total_width * total_height * 3];
        let mut y_off = 0;
        for row in grid {
            let row_height = row[0].height;
            let row_width: usize = row.iter().map(|t| t.width).sum();
            if row_width != total_width {
                return Err(ComputeError::ShapeMismatch(format!(
                    "row width {} != {}",
                    row_width, total_width
                )));
            }
            let mut x_off = 0;
            for tile in row {
                if tile.height != row_height {
                    return Err(ComputeError::ShapeMismatch(format!(
                        "tile height {} != row height {}",
                        tile.height, row_height
                    )));
                }
                if tile.color_space != color_space || tile.linear != linear {
                    return Err(ComputeError::ShapeMismatch(
                        "tiles disagree on color space".into(),
                    ));
                }
                for y in 0..tile.height {
                    let src = y * tile.width * 3;
                    let dst = ((y_off + y) * total_width + x_off) * 3;
                    data[dst..dst + tile.width * 3]
                        .copy_from_slice(&tile.data[src..src + tile.width * 3]);
                }
                x_off += tile.width;
            }
            y_off += row_height;
        }

        Image::from_data(data, total_width, total_height, color_space, linear)
    }

    /// Downsample so the longest side fits `max_dim`, preserving aspect.
    /// Returns a clone when the image already fits.
    pub fn resized_to_fit(&self, max_dim: usize) -> Image {
        let longest = self.width.max(self.height);
        if longest <= max_dim {
            return self.clone();
        }
        let scale = max_dim as f64 / longest as f64;
        let nw = ((self.width as f64 * scale).round() as u32).max(1);
        let nh = ((self.height as f64 * scale).round() as u32).max(1);
        let buf = Rgb32FImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
            .expect("buffer length checked at construction");
        let resized =
            image::imageops::resize(&buf, nw, nh, image::imageops::FilterType::Triangle);
        Image {
            data: resized.into_raw(),
            width: nw as usize,
            height: nh as usize,
            color_space: self.color_space,
            linear: self.linear,
            path: self.path.clone(),
        }
    }
}
