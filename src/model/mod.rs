pub mod photo;
pub mod photo_album;
