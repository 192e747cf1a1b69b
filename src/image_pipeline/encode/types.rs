//! Output encoding configuration and the encoded frame container

/// Default JPEG quality for streamed frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression with horizontal predictor
    Lzw,
    /// Deflate compression, fast level, with horizontal predictor
    Deflate,
}

/// Container format of encoded frames. Fixed per pipeline, not per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy, for live streaming (e.g. MJPEG)
    Jpeg { quality: u8 },
    /// Lossless stills
    Tiff(TiffCompression),
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Tiff(_) => "image/tiff",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Tiff(_) => "tiff",
        }
    }
}

/// One finished frame, ready for transport. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    bytes: Box<[u8]>,
    width: u32,
    height: u32,
    format: OutputFormat,
}

impl EncodedFrame {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, format: OutputFormat) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
            width,
            height,
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel size of the encoded image.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl AsRef<[u8]> for EncodedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
