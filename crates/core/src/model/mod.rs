use image::{DynamicImage, GenericImageView};

/// A single difficulty's chart for one song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub song_id: String,
    pub difficulty: String,
    /// Chart source exactly as stored in the bundle.
    pub data: Vec<u8>,
}

/// One playable audio variant of a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub song_id: String,
    pub variant_tag: String,
    pub track_id: String,
    /// Decoded waveform. Empty when decoding failed or the bundle held no audio.
    pub audio: Vec<u8>,
}

impl Track {
    /// Label used both in the manifest and in the exported file name.
    pub fn label(&self) -> String {
        format!("{}_{}", self.variant_tag, self.track_id)
    }

    pub fn file_name(&self) -> String {
        format!("audio_{}.wav", self.label())
    }
}

/// Cover art of a song. Always present: a 1x1 placeholder stands in when no
/// jacket exists for the song.
#[derive(Debug, Clone)]
pub struct Jacket {
    image: Option<DynamicImage>,
    found: bool,
}

impl Jacket {
    pub fn placeholder() -> Self {
        Self {
            image: Some(DynamicImage::new_rgb8(1, 1)),
            found: false,
        }
    }

    pub fn found(image: DynamicImage) -> Self {
        Self {
            image: Some(image),
            found: true,
        }
    }

    /// True if the image came from a jacket file rather than the placeholder.
    pub fn is_found(&self) -> bool {
        self.found
    }

    /// The pixels, unless they were released after export.
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| image.dimensions())
    }

    fn release(&mut self) {
        self.image = None;
    }
}

impl Default for Jacket {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Aggregate of every asset belonging to one song.
#[derive(Debug, Clone)]
pub struct Music {
    pub id: String,
    pub jacket: Jacket,
    /// The first track comes from the file that triggered discovery.
    pub tracks: Vec<Track>,
    pub scores: Vec<Score>,
}

impl Music {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            jacket: Jacket::placeholder(),
            tracks: Vec::new(),
            scores: Vec::new(),
        }
    }

    /// Drops the bulk payloads while keeping everything the manifest needs.
    pub fn release_payloads(&mut self) {
        for track in &mut self.tracks {
            track.audio = Vec::new();
        }
        for score in &mut self.scores {
            score.data = Vec::new();
        }
        self.jacket.release();
    }
}
