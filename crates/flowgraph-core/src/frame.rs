//! Spectral analysis frames.
//!
//! A [`Frame`] carries one streaming phase-vocoder frame: `size + 2` floats
//! holding `size / 2 + 1` (magnitude, frequency-or-phase) pairs, plus the
//! analysis parameters that describe it. Sliding frames instead carry one
//! frame of complex bins per sample of the block.
//!
//! Frames are not summed. An inlet merges its sources bin by bin and the
//! larger magnitude wins; see [`merge_dominant`].

/// Data format of a frame's bin pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FrameFormat {
    /// Amplitude and frequency pairs.
    #[default]
    AmpFreq,
    /// Amplitude and phase pairs.
    AmpPhase,
    /// Real and imaginary pairs.
    Complex,
    /// Partial-tracking data.
    Tracks,
}

impl FrameFormat {
    /// Returns true if bins can be merged by magnitude dominance.
    #[inline]
    pub fn is_mergeable(self) -> bool {
        matches!(self, FrameFormat::AmpFreq | FrameFormat::AmpPhase)
    }
}

/// Analysis window the frame was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WindowType {
    /// Hamming window.
    Hamming,
    /// Hann (von Hann) window.
    #[default]
    Hann,
    /// Kaiser window.
    Kaiser,
    /// Blackman window.
    Blackman,
    /// User-supplied window.
    Custom,
}

/// Memory layout of a frame's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLayout {
    /// One frame of `size + 2` floats.
    #[default]
    Standard,
    /// `frames` consecutive frames of `bins` complex values (re, im interleaved).
    Sliding {
        /// Complex bins per frame.
        bins: usize,
        /// Frames per block (one per sample).
        frames: usize,
    },
}

/// A spectral frame signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Analysis size (FFT length).
    pub size: usize,
    /// Hop size between frames.
    pub overlap: usize,
    /// Analysis window length.
    pub window_size: usize,
    /// Analysis window shape.
    pub window_type: WindowType,
    /// Data format of the bin pairs.
    pub format: FrameFormat,
    /// Generation counter, advanced by the producer for every new frame.
    pub frame_count: u64,
    /// Memory layout of `bins`.
    pub layout: FrameLayout,
    /// Interleaved bin data.
    pub bins: Vec<f32>,
}

impl Frame {
    /// Creates a zeroed standard frame of the given analysis size.
    pub fn new(size: usize, format: FrameFormat) -> Self {
        Self {
            size,
            overlap: size / 4,
            window_size: size,
            window_type: WindowType::Hann,
            format,
            frame_count: 0,
            layout: FrameLayout::Standard,
            bins: vec![0.0; size + 2],
        }
    }

    /// Creates a zeroed sliding frame with `bins` complex bins per sample.
    pub fn sliding(size: usize, bins: usize, frames: usize, format: FrameFormat) -> Self {
        Self {
            layout: FrameLayout::Sliding { bins, frames },
            bins: vec![0.0; bins * frames * 2],
            ..Self::new(size, format)
        }
    }

    /// Number of floats the layout requires.
    pub fn data_len(&self) -> usize {
        match self.layout {
            FrameLayout::Standard => self.size + 2,
            FrameLayout::Sliding { bins, frames } => bins * frames * 2,
        }
    }

    /// Returns true for sliding layouts.
    #[inline]
    pub fn is_sliding(&self) -> bool {
        matches!(self.layout, FrameLayout::Sliding { .. })
    }

    /// Copies the analysis parameters of `source` and resizes the data to match.
    ///
    /// Bin data is zeroed; the generation counter restarts at 1.
    pub fn adopt_format(&mut self, source: &Frame) {
        self.size = source.size;
        self.overlap = source.overlap;
        self.window_size = source.window_size;
        self.window_type = source.window_type;
        self.format = source.format;
        self.layout = source.layout;
        self.frame_count = 1;
        self.bins.clear();
        self.bins.resize(self.data_len(), 0.0);
    }

    /// Zeroes all bin data.
    pub fn clear_bins(&mut self) {
        self.bins.fill(0.0);
    }
}

/// Merges `source` into `sink` pair by pair; the larger first component wins.
///
/// A source pair replaces the sink pair only when strictly greater, so on ties
/// the earlier contributor is kept. Extra trailing data in either slice is
/// ignored.
#[inline]
pub fn merge_dominant(sink: &mut [f32], source: &[f32]) {
    for (dst, src) in sink.chunks_exact_mut(2).zip(source.chunks_exact(2)) {
        if src[0] > dst[0] {
            dst[0] = src[0];
            dst[1] = src[1];
        }
    }
}
