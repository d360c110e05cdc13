use config::Config as ConfigBuilder;
use rusoto_core::Region;
use serde::Deserialize;
use crate::model::photo::PhotoSuffixes;
use crate::sync_error::SyncError;

const ENV_PREFIX: &str = "PHOTO_ALBUMS";
const ENV_SEPARATOR: &str = "__";

fn default_region() -> String {
    Region::ApSouth1.name().to_owned()
}

fn default_suffixes() -> Vec<String> {
    vec![".jpg".to_owned()]
}

#[derive(Debug, Deserialize)]
pub(crate) struct AwsSettings {
    pub(crate) accesskey: String,
    pub(crate) secretkey: String,

    #[serde(default = "default_region")]
    pub(crate) region: String,
}

impl AwsSettings {
    pub(crate) fn region(&self) -> Result<Region, SyncError> {
        self.region
            .parse::<Region>()
            .map_err(|err| SyncError::Init(format!("invalid region {}: {}", self.region, err)))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoSettings {
    #[serde(default = "default_suffixes")]
    pub(crate) suffixes: Vec<String>,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        PhotoSettings { suffixes: default_suffixes() }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Settings {
    pub(crate) aws: AwsSettings,

    #[serde(default)]
    pub(crate) photo: PhotoSettings,
}

impl Settings {
    pub(crate) fn suffixes(&self) -> PhotoSuffixes {
        PhotoSuffixes::new(self.photo.suffixes.clone())
    }
}

/// Reads the settings file (any format the config crate recognises) with
/// `PHOTO_ALBUMS__SECTION__KEY` environment variables layered on top.
pub(crate) fn load_settings(config_path: &str) -> Result<Settings, SyncError> {
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("photo.suffixes"),
        )
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
