use crate::error::{CoreError, CoreResult};

/// Interleaved 8-bit pixel buffer, row-major, 3 (RGB) or 4 (RGBA) channels.
///
/// Buffers arrive from an external image-loading collaborator; this crate
/// never parses file formats. Channel counts outside {3, 4} are constructible
/// but rejected by the operations that depend on a known layout.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl ImageBuffer {
    /// Creates a buffer, validating dimensions against the data length.
    pub fn new(data: Vec<u8>, width: usize, height: usize, channels: usize) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImageSize { width, height });
        }
        if channels == 0 {
            return Err(CoreError::UnsupportedChannels(0));
        }
        let expected_len = width * height * channels;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { data, width, height, channels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Interleaved channel values of the pixel at (x, y).
    ///
    /// Panics if (x, y) is out of bounds; callers clamp first.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Canonical 3-channel BGR copy of this buffer.
    ///
    /// RGB input swaps red/blue; RGBA additionally drops the alpha channel.
    /// Detection always runs on this canonical buffer, never on the original.
    pub fn to_bgr(&self) -> CoreResult<ImageBuffer> {
        if self.channels != 3 && self.channels != 4 {
            return Err(CoreError::UnsupportedChannels(self.channels));
        }
        let mut out = Vec::with_capacity(self.width * self.height * 3);
        for px in self.data.chunks_exact(self.channels) {
            out.push(px[2]);
            out.push(px[1]);
            out.push(px[0]);
        }
        ImageBuffer::new(out, self.width, self.height, 3)
    }

    /// Rec. 601 luma plane of a canonical BGR buffer.
    pub fn to_luma(&self) -> CoreResult<Vec<u8>> {
        if self.channels != 3 {
            return Err(CoreError::UnsupportedChannels(self.channels));
        }
        let luma = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let (b, g, r) = (px[0] as u32, px[1] as u32, px[2] as u32);
                ((299 * r + 587 * g + 114 * b) / 1000) as u8
            })
            .collect();
        Ok(luma)
    }
}
