//! Flat binary images

use {
    crate::RtError,
    memmap2::Mmap,
    nandbytecode::MEMORY_SIZE,
    std::{fs::File, ops::Deref, path::Path},
};

/// Program image, placed at address 0
pub enum Image {
    /// Zero-length file
    Empty,
    Mapped(Mmap),
}

impl Image {
    /// Map the image file read-only
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RtError> {
        let path = path.as_ref();
        let bad = |e| RtError::BadImage(path.display().to_string(), e);

        log::info!("Loading image from \"{}\"", path.display());
        let file = File::open(path).map_err(bad)?;
        if file.metadata().map_err(bad)?.len() == 0 {
            log::warn!("Image is empty, memory stays zeroed");
            return Ok(Self::Empty);
        }

        // SAFETY: The mapping is private and read-only, it is only copied
        // into VM memory before execution starts
        let map = unsafe { Mmap::map(&file) }.map_err(bad)?;
        if map.len() > MEMORY_SIZE {
            log::warn!("Image is {} bytes, only the first {MEMORY_SIZE} are loaded", map.len());
        }

        log::info!("Image loaded, {} bytes", map.len().min(MEMORY_SIZE));
        Ok(Self::Mapped(map))
    }
}

impl Deref for Image {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Empty => &[],
            Self::Mapped(map) => &map[..],
        }
    }
}
