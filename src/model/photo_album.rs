use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use crate::file::list_files;
use crate::model::photo::{Photo, PhotoSuffixes};
use crate::sync_error::SyncError;

pub struct ImageAlbum {
    pub(crate) name: String,
    pub(crate) photos: Vec<Photo>
}

impl ImageAlbum {
    /// Collects the photos sitting directly inside `folder`.
    pub(crate) fn from_folder(name: &str, folder: &Path, suffixes: &PhotoSuffixes) -> Result<Self, SyncError> {
        let photos = read_photos(list_files(folder)?, suffixes);
        debug!(album = name, count = photos.len(), "collected local photos");

        Ok(ImageAlbum { name: name.to_owned(), photos })
    }
}

fn read_photos(paths: Vec<PathBuf>, suffixes: &PhotoSuffixes) -> Vec<Photo> {
    let mut photos = Vec::new();

    for path in paths {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(filename) => filename.to_owned(),
            None => {
                warn!("{:?} has no UTF-8 file name and is skipped", &path);
                continue;
            }
        };

        if suffixes.matches(&filename) {
            photos.push(Photo { name: filename, path });
        } else {
            debug!("{:?} is not an image", &path)
        }
    }

    photos
}
