use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info};
use crate::cli::{CliCommand, TransferCmd};
use crate::model::photo::PhotoSuffixes;
use crate::model::photo_album::ImageAlbum;
use crate::store::PhotoStore;
use crate::sync_error::SyncError;

/// Runs one invocation against a storage capability. Results go to `out`,
/// faults to `err`; nothing is returned to the caller.
pub(crate) struct Dispatcher<S> {
    store: S,
    suffixes: PhotoSuffixes,
}

impl<S: PhotoStore> Dispatcher<S> {
    pub(crate) fn new(store: S, suffixes: PhotoSuffixes) -> Self {
        Dispatcher { store, suffixes }
    }

    pub(crate) async fn execute<W: Write, E: Write>(&self, args: &[String], out: &mut W, err: &mut E) {
        if let Err(fault) = self.run(args, out).await {
            match &fault {
                SyncError::AlbumNotFound { album, .. } => debug!(album = album.as_str(), "album is missing"),
                other => debug!(error = ?other, "command failed"),
            }
            if let Err(write_err) = writeln!(err, "{}", fault) {
                error!("failed to report fault: {}", write_err);
            }
        }
    }

    async fn run<W: Write>(&self, args: &[String], out: &mut W) -> Result<(), SyncError> {
        let cmd = CliCommand::parse(args)?;
        debug!(command = cmd.name().as_str(), suffixes = %self.suffixes, "dispatching");

        match cmd {
            CliCommand::ListAlbums => self.list_albums(out).await,
            CliCommand::ListPhotos { album_name } => self.list_photos(&album_name, out).await,
            CliCommand::Download(c) => self.download(&c).await,
            CliCommand::Upload(c) => self.upload(&c).await,
        }
    }

    async fn list_albums<W: Write>(&self, out: &mut W) -> Result<(), SyncError> {
        let album_names = self.store.list_albums().await?;
        writeln!(out, "[{}]", album_names.join(", "))?;
        Ok(())
    }

    async fn list_photos<W: Write>(&self, album_name: &str, out: &mut W) -> Result<(), SyncError> {
        for key in self.photo_keys(album_name).await? {
            writeln!(out, "{}", key)?;
        }
        Ok(())
    }

    async fn download(&self, c: &TransferCmd) -> Result<(), SyncError> {
        ensure_directory(&c.path)?;

        let keys = self.photo_keys(&c.album_name).await?;
        for (i, key) in keys.iter().enumerate() {
            let target = download_target(&c.path, key)?;
            let body = self.store.get_object(&c.album_name, key).await?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, &body).await?;
            info!("Downloaded {} / {} files ({})", i + 1, keys.len(), key);
        }

        Ok(())
    }

    async fn upload(&self, c: &TransferCmd) -> Result<(), SyncError> {
        ensure_directory(&c.path)?;

        if !self.store.album_exists(&c.album_name).await? {
            info!(album = c.album_name.as_str(), "creating album");
            self.store.create_album(&c.album_name).await?;
        }

        let album = ImageAlbum::from_folder(&c.album_name, &c.path, &self.suffixes)?;
        for (i, photo) in album.photos.iter().enumerate() {
            let buffer = tokio::fs::read(&photo.path).await?;
            self.store.put_object(&album.name, &photo.name, buffer).await?;
            info!("uploaded {} / {} files {}", i + 1, album.photos.len(), photo);
        }

        Ok(())
    }

    async fn photo_keys(&self, album_name: &str) -> Result<Vec<String>, SyncError> {
        let keys = self.store.list_keys(album_name).await?;
        Ok(keys.into_iter().filter(|key| self.suffixes.matches(key)).collect())
    }
}

/// Location of `key` under `dir`. Keys that could escape `dir` are refused.
fn download_target(dir: &Path, key: &str) -> Result<PathBuf, SyncError> {
    let mut target = dir.to_path_buf();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(SyncError::Store(format!("refusing to write key {} outside the target folder", key)));
            }
        }
    }

    if target == dir {
        return Err(SyncError::Store(format!("key {} does not name a file", key)));
    }
    Ok(target)
}

fn ensure_directory(path: &Path) -> Result<(), SyncError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(SyncError::InvalidPath(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use crate::store::memory::InMemoryStore;

    fn jpg_only() -> PhotoSuffixes {
        PhotoSuffixes::new(vec![".jpg".to_owned()])
    }

    fn vacation() -> InMemoryStore {
        InMemoryStore::default().with_album(
            "vacation",
            &[("a.jpg", &b"aaa"[..]), ("b.png", &b"bbb"[..]), ("c.jpg", &b"ccc"[..])],
        )
    }

    struct Output {
        out: String,
        err: String,
    }

    async fn invoke<S: PhotoStore>(dispatcher: &Dispatcher<S>, words: &[&str]) -> Output {
        let args: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        let mut out = Vec::new();
        let mut err = Vec::new();
        dispatcher.execute(&args, &mut out, &mut err).await;
        Output {
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[tokio::test]
    async fn empty_and_unknown_invocations_report_launch_error() {
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        for words in [&[][..], &["sync"][..], &["delete", "-a", "vacation"][..]] {
            let output = invoke(&dispatcher, words).await;
            assert_eq!(output.out, "");
            assert_eq!(output.err, "Launch parameters error\n");
        }
    }

    #[tokio::test]
    async fn list_prints_albums_as_one_line() {
        let store = vacation().with_album("family", &[]).with_album("work", &[]);
        let dispatcher = Dispatcher::new(store, jpg_only());

        let output = invoke(&dispatcher, &["list"]).await;

        assert_eq!(output.out, "[vacation, family, work]\n");
        assert_eq!(output.err, "");
    }

    #[tokio::test]
    async fn list_with_no_albums_prints_empty_literal() {
        let dispatcher = Dispatcher::new(InMemoryStore::default(), jpg_only());
        assert_eq!(invoke(&dispatcher, &["list"]).await.out, "[]\n");
    }

    #[tokio::test]
    async fn list_album_prints_photo_keys_in_order() {
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        let output = invoke(&dispatcher, &["list", "-a", "vacation"]).await;

        assert_eq!(output.out, "a.jpg\nc.jpg\n");
        assert_eq!(output.err, "");
    }

    #[tokio::test]
    async fn list_missing_album_reports_not_found() {
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        let output = invoke(&dispatcher, &["list", "-a", "ghost"]).await;

        assert_eq!(output.out, "");
        assert!(output.err.starts_with("The specified album does not exist. "));
        assert_eq!(output.err.lines().count(), 1);
    }

    #[tokio::test]
    async fn list_with_bad_shape_does_no_io() {
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        let output = invoke(&dispatcher, &["list", "-p", "vacation"]).await;

        assert_eq!(output.out, "");
        assert_eq!(output.err, "Launch parameters error: Parameters should be like: list -a *album_name*\n");
    }

    #[tokio::test]
    async fn configured_suffixes_widen_the_filter() {
        let store = InMemoryStore::default().with_album("trip", &[("a.jpg", &b""[..]), ("b.jpeg", &b""[..]), ("c.png", &b""[..])]);
        let dispatcher = Dispatcher::new(store, PhotoSuffixes::new(vec![".jpg".to_owned(), ".jpeg".to_owned()]));

        assert_eq!(invoke(&dispatcher, &["list", "-a", "trip"]).await.out, "a.jpg\nb.jpeg\n");
    }

    #[tokio::test]
    async fn download_writes_photos_and_overwrites() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.jpg"), b"stale content").unwrap();
        let dispatcher = Dispatcher::new(vacation(), jpg_only());
        let path = temp.path().to_str().unwrap();

        let output = invoke(&dispatcher, &["download", "-p", path, "-a", "vacation"]).await;

        assert_eq!(output.err, "");
        assert_eq!(output.out, "");
        assert_eq!(fs::read(temp.path().join("a.jpg")).unwrap(), &b"aaa"[..]);
        assert_eq!(fs::read(temp.path().join("c.jpg")).unwrap(), b"ccc");
        assert!(!temp.path().join("b.png").exists());
        assert_eq!(*dispatcher.store.fetched.borrow(), vec!["a.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn download_creates_folders_for_nested_keys() {
        let temp = TempDir::new().unwrap();
        let store = InMemoryStore::default()
            .with_album("vacation", &[("trip/a.jpg", &b"aaa"[..]), ("z.jpg", &b"zzz"[..])]);
        let dispatcher = Dispatcher::new(store, jpg_only());

        let output = invoke(&dispatcher, &["download", "-p", temp.path().to_str().unwrap(), "-a", "vacation"]).await;

        assert_eq!(output.err, "");
        assert_eq!(fs::read(temp.path().join("trip").join("a.jpg")).unwrap(), &b"aaa"[..]);
        assert_eq!(fs::read(temp.path().join("z.jpg")).unwrap(), &b"zzz"[..]);
    }

    #[tokio::test]
    async fn download_refuses_keys_leaving_the_folder() {
        let target = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let absolute = elsewhere.path().join("escaped.jpg");
        let absolute_key = absolute.to_str().unwrap().to_owned();

        for key in [absolute_key.as_str(), "../escaped.jpg", "trip/../../escaped.jpg"] {
            let store = InMemoryStore::default().with_album("vacation", &[(key, &b"evil"[..])]);
            let dispatcher = Dispatcher::new(store, jpg_only());

            let output = invoke(&dispatcher, &["download", "-p", target.path().to_str().unwrap(), "-a", "vacation"]).await;

            assert!(output.err.starts_with("Error: refusing to write key"), "{}", output.err);
            assert!(dispatcher.store.fetched.borrow().is_empty());
        }

        assert!(!absolute.exists());
        assert!(!target.path().parent().unwrap().join("escaped.jpg").exists());
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn download_target_stays_under_folder() {
        let dir = Path::new("/tmp/out");

        assert_eq!(download_target(dir, "a.jpg").unwrap(), dir.join("a.jpg"));
        assert_eq!(download_target(dir, "./trip/a.jpg").unwrap(), dir.join("trip").join("a.jpg"));
        assert!(download_target(dir, "/etc/a.jpg").is_err());
        assert!(download_target(dir, "..").is_err());
        assert!(download_target(dir, "").is_err());
    }

    #[tokio::test]
    async fn download_to_missing_path_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nonexistent");
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        let output = invoke(&dispatcher, &["download", "-p", missing.to_str().unwrap(), "-a", "vacation"]).await;

        assert_eq!(
            output.err,
            format!("Launch parameters error: Invalid path specified {}\n", missing.display())
        );
        assert!(!missing.exists());
        assert!(dispatcher.store.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn download_to_a_file_path_is_invalid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        let output = invoke(&dispatcher, &["download", "-p", file.to_str().unwrap(), "-a", "vacation"]).await;

        assert!(output.err.starts_with("Launch parameters error: Invalid path specified"));
    }

    #[tokio::test]
    async fn download_from_missing_album_fetches_nothing() {
        let temp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        let output = invoke(&dispatcher, &["download", "-p", temp.path().to_str().unwrap(), "-a", "ghost"]).await;

        assert!(output.err.starts_with("The specified album does not exist."));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn upload_creates_album_and_sends_only_photos() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("x.jpg"), b"xxx").unwrap();
        fs::write(temp.path().join("y.txt"), b"yyy").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::write(temp.path().join("subdir/z.jpg"), b"zzz").unwrap();
        let dispatcher = Dispatcher::new(InMemoryStore::default(), jpg_only());

        let output = invoke(&dispatcher, &["upload", "-p", temp.path().to_str().unwrap(), "-a", "newalbum"]).await;

        assert_eq!(output.err, "");
        assert_eq!(output.out, "");
        assert_eq!(*dispatcher.store.created.borrow(), vec!["newalbum"]);
        assert_eq!(dispatcher.store.keys("newalbum").unwrap(), vec!["x.jpg"]);
        assert_eq!(dispatcher.store.object("newalbum", "x.jpg").unwrap(), b"xxx");
    }

    #[tokio::test]
    async fn upload_into_existing_album_does_not_recreate_it() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("d.jpg"), b"ddd").unwrap();
        let dispatcher = Dispatcher::new(vacation(), jpg_only());

        invoke(&dispatcher, &["upload", "-p", temp.path().to_str().unwrap(), "-a", "vacation"]).await;

        assert!(dispatcher.store.created.borrow().is_empty());
        assert_eq!(
            dispatcher.store.keys("vacation").unwrap(),
            vec!["a.jpg", "b.png", "c.jpg", "d.jpg"]
        );
    }

    #[tokio::test]
    async fn upload_from_missing_path_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let dispatcher = Dispatcher::new(InMemoryStore::default(), jpg_only());

        let output = invoke(&dispatcher, &["upload", "-p", missing.to_str().unwrap(), "-a", "newalbum"]).await;

        assert!(output.err.starts_with("Launch parameters error: Invalid path specified"));
        assert!(dispatcher.store.created.borrow().is_empty());
        assert!(dispatcher.store.keys("newalbum").is_none());
    }
}
