use std::path::PathBuf;
use std::str::FromStr;
use clap::{App, AppSettings, Arg, ArgMatches, ErrorKind};
use crate::sync_error::SyncError;

static VERSION: &str = "0.1.0";
static DESCRIPTION: &str = "List, download and upload photo albums kept in S3 buckets";
pub(crate) const CONFIG: &str = "config";
const CONFIG_SHORT: &str = "c";
const CONFIG_ENV: &str = "PHOTO_ALBUMS_CONFIG";
pub(crate) const DEFAULT_CONFIG: &str = "application";
pub(crate) const VERBOSE: &str = "verbose";
const VERBOSE_SHORT: &str = "v";
pub(crate) const ARGS: &str = "args";

const LIST: &str = "list";
const DOWNLOAD: &str = "download";
const UPLOAD: &str = "upload";
const ALBUM_FLAG: &str = "-a";
const PATH_FLAG: &str = "-p";

const LIST_USAGE: &str = "Parameters should be like: list -a *album_name*";
const DOWNLOAD_USAGE: &str = "Parameters should be like: download -p *path* -a *album_name*";
const UPLOAD_USAGE: &str = "Parameters should be like: upload -p *path* -a *album_name*";

/// Parses the process arguments. Help and version requests exit through clap;
/// any other rejection is reported like every other launch parameters fault.
pub(crate) fn build_cli<'a>() -> Result<ArgMatches<'a>, SyncError> {
    app().get_matches_safe().map_err(launch_error)
}

fn launch_error(err: clap::Error) -> SyncError {
    match err.kind {
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
        _ => SyncError::LaunchParameters(None),
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("photo-albums")
        .version(VERSION)
        .about(DESCRIPTION)
        .setting(AppSettings::TrailingVarArg)
        .arg(Arg::with_name(CONFIG)
            .short(CONFIG_SHORT)
            .long(CONFIG)
            .takes_value(true)
            .env(CONFIG_ENV)
            .default_value(DEFAULT_CONFIG)
            .help("Settings file holding the storage credentials"))
        .arg(Arg::with_name(VERBOSE)
            .short(VERBOSE_SHORT)
            .long(VERBOSE)
            .multiple(true)
            .help("Raises the log level, may be repeated"))
        .arg(Arg::with_name(ARGS)
            .multiple(true)
            .allow_hyphen_values(true)
            .help("list | list -a ALBUM | download -p PATH -a ALBUM | upload -p PATH -a ALBUM"))
}

/// Raw command words following the global options, passed through untouched.
pub(crate) fn command_args(matches: &ArgMatches) -> Vec<String> {
    matches.values_of(ARGS)
        .map(|values| values.map(String::from).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandName {
    List,
    Download,
    Upload,
}

impl FromStr for CommandName {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LIST => Ok(Self::List),
            DOWNLOAD => Ok(Self::Download),
            UPLOAD => Ok(Self::Upload),
            _ => Err(SyncError::LaunchParameters(None))
        }
    }
}

impl CommandName {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            CommandName::List => LIST,
            CommandName::Download => DOWNLOAD,
            CommandName::Upload => UPLOAD,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TransferCmd {
    pub(crate) path: PathBuf,
    pub(crate) album_name: String,
}

impl TransferCmd {
    /// Accepts exactly `-p PATH -a ALBUM`.
    fn build(params: &[String], usage: &str) -> Result<Self, SyncError> {
        match params {
            [p, path, a, album_name] if p == PATH_FLAG && a == ALBUM_FLAG => Ok(TransferCmd {
                path: PathBuf::from(path),
                album_name: album_name.to_owned(),
            }),
            _ => Err(SyncError::usage(usage))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CliCommand {
    ListAlbums,
    ListPhotos { album_name: String },
    Download(TransferCmd),
    Upload(TransferCmd),
}

impl CliCommand {
    /// Validates the shape of a full invocation: the command word followed by its parameters.
    pub(crate) fn parse(args: &[String]) -> Result<Self, SyncError> {
        let (name, params) = args.split_first().ok_or(SyncError::LaunchParameters(None))?;

        match name.parse::<CommandName>()? {
            CommandName::List => match params {
                [] => Ok(CliCommand::ListAlbums),
                [a, album_name] if a == ALBUM_FLAG => Ok(CliCommand::ListPhotos {
                    album_name: album_name.to_owned(),
                }),
                _ => Err(SyncError::usage(LIST_USAGE))
            },
            CommandName::Download => TransferCmd::build(params, DOWNLOAD_USAGE).map(CliCommand::Download),
            CommandName::Upload => TransferCmd::build(params, UPLOAD_USAGE).map(CliCommand::Upload),
        }
    }

    pub(crate) fn name(&self) -> CommandName {
        match self {
            CliCommand::ListAlbums | CliCommand::ListPhotos { .. } => CommandName::List,
            CliCommand::Download(_) => CommandName::Download,
            CliCommand::Upload(_) => CommandName::Upload,
        }
    }
}
