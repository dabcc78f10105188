use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::video::domain::frame_reader::{FrameReader, FrameResult};

use super::image_file_reader::decode_frame;

/// Reads every image in a directory, sorted by file name, as one frame each.
///
/// Files are decoded lazily while iterating so only the frames in flight
/// are held in memory.
pub struct ImageSequenceReader {
    paths: Vec<PathBuf>,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self { paths: Vec::new() }
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| format!("Failed to list {}: {e}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        if paths.is_empty() {
            return Err(format!("No images found in {}", path.display()).into());
        }
        paths.sort();

        let file_names = paths
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        log::debug!("Found {} images in {}", paths.len(), path.display());

        self.paths = paths;
        Ok(SequenceMetadata {
            total_frames: self.paths.len(),
            file_names,
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = FrameResult> + '_> {
        if self.paths.is_empty() {
            return Box::new(std::iter::once(Err(
                "ImageSequenceReader: not opened".into()
            )));
        }
        Box::new(
            self.paths
                .iter()
                .enumerate()
                .map(|(index, path)| decode_frame(path, index)),
        )
    }

    fn close(&mut self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &Path, name: &str, value: u8) {
        image::RgbImage::from_pixel(8, 6, image::Rgb([value, value, value]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_frames_follow_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 20);
        write_image(dir.path(), "a.png", 10);
        write_image(dir.path(), "c.bmp", 30);
        fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

        let mut reader = ImageSequenceReader::new();
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.total_frames, 3);
        assert_eq!(meta.file_names, vec!["a.png", "b.png", "c.bmp"]);

        let firsts: Vec<(usize, u8)> = reader
            .frames()
            .map(|f| {
                let f = f.unwrap();
                (f.index(), f.data()[0])
            })
            .collect();
        assert_eq!(firsts, vec![(0, 10), (1, 20), (2, 30)]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = ImageSequenceReader::new();
        assert!(reader.open(dir.path()).is_err());
    }

    #[test]
    fn test_corrupt_file_surfaces_as_frame_error() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 10);
        fs::write(dir.path().join("b.png"), b"not a png").unwrap();

        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        let results: Vec<_> = reader.frames().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_is_image_file_ignores_case() {
        assert!(is_image_file(Path::new("x/FACE.JPG")));
        assert!(!is_image_file(Path::new("x/face.xml")));
        assert!(!is_image_file(Path::new("x/face")));
    }
}
