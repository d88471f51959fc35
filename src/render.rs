//! Turning rugs into pictures.

use crate::error::{Error, Result};

use image::{GrayImage, Luma, Rgb, RgbImage};

use ndarray::{Array2, ArrayView2};

/// An 8-bit RGB color.
pub type Rgb8 = Rgb<u8>;

/// The number of color bins.
pub const BINS: usize = 10;

/// An ordered table of colors, one per bin, from low to high values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Palette([Rgb8; BINS]);

impl Palette {
    /// The [ColorBrewer](https://colorbrewer2.org/) RdYlBu diverging scheme: red for low
    /// values, blue for high ones.
    pub const DIVERGING: Self = Self([
        Rgb([165, 0, 38]),
        Rgb([215, 48, 39]),
        Rgb([244, 109, 67]),
        Rgb([253, 174, 97]),
        Rgb([254, 224, 144]),
        Rgb([224, 243, 248]),
        Rgb([171, 217, 233]),
        Rgb([116, 173, 209]),
        Rgb([69, 117, 180]),
        Rgb([49, 54, 149]),
    ]);

    pub fn new(colors: [Rgb8; BINS]) -> Self {
        Self(colors)
    }

    /// The color of a bin.
    pub fn get(&self, bin: usize) -> Option<Rgb8> {
        self.0.get(bin).copied()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DIVERGING
    }
}

/// The smallest and largest values of an image.
fn range(image: ArrayView2<'_, f64>) -> (f64, f64) {
    image
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        })
}

/// Linearly rescale an image so that its maximum becomes 255.
pub fn gray_scale(image: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    let (_, max) = range(image);
    if max == 0.0 {
        return Err(Error::DegenerateRange);
    }

    // Divide first so that max / max is exactly 1
    Ok(image.mapv(|v| v / max * 255.0))
}

/// Convert an image already scaled to `[0, 255]` into 8-bit grayscale.  Rows become image rows
/// and columns image columns.
pub fn to_gray_image(image: ArrayView2<'_, f64>) -> GrayImage {
    let (rows, cols) = image.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = image[[y as usize, x as usize]];
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Find the palette bin for a value, with `range = max - min + 1`.
fn bin(value: f64, min: f64, range: f64) -> Result<usize> {
    if !value.is_finite() {
        return Err(Error::NonFiniteValue(value));
    }

    let bin = (BINS as f64 * (value - min) / range).floor();
    if bin >= 0.0 && bin < BINS as f64 {
        Ok(bin as usize)
    } else {
        Err(Error::InvalidColorRange { value, bin })
    }
}

/// Color each value of an image by the palette bin it falls in.
///
/// Values are split into [BINS] equal bins over `[min, max + 1)`; missing bounds default to the
/// image's own extremes.
pub fn color_map(
    image: ArrayView2<'_, f64>,
    palette: &Palette,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<RgbImage> {
    let (own_min, own_max) = range(image);
    let min = min.unwrap_or(own_min);
    let max = max.unwrap_or(own_max);
    let range = max - min + 1.0;

    let (rows, cols) = image.dim();
    let mut output = RgbImage::new(cols as u32, rows as u32);
    for ((r, c), &value) in image.indexed_iter() {
        let bin = bin(value, min, range)?;
        // bin() guarantees bin < BINS
        let color = palette.0[bin];
        output.put_pixel(c as u32, r as u32, color);
    }

    Ok(output)
}
