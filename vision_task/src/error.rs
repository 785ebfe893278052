use std::{error::Error, fmt, io, path::PathBuf};

use ml_core::MlErr;

use crate::http::HttpError;

/// The task module's result type.
pub type Result<T> = std::result::Result<T, TaskErr>;

/// Pipeline runtime failures.
#[derive(Debug)]
pub enum TaskErr {
    /// A topology, weight shard or manifest could not be fetched.
    Download { resource: String, source: HttpError },
    /// A dataset image could not be fetched; one miss aborts the whole load.
    ImageFetch {
        image_id: String,
        url: String,
        source: HttpError,
    },
    /// A fetched image could not be decoded into a 3-channel tensor.
    ImageDecode { image_id: String, detail: String },
    /// A model reported present on disk turned out to be corrupt.
    LocalLoad { path: PathBuf, detail: String },
    /// The model could not be built, adapted or trained.
    Model(MlErr),
    Io(io::Error),
}

impl fmt::Display for TaskErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskErr::Download { resource, source } => {
                write!(f, "failed to download {resource}: {source}")
            }
            TaskErr::ImageFetch {
                image_id,
                url,
                source,
            } => write!(f, "failed to fetch image {image_id} from {url}: {source}"),
            TaskErr::ImageDecode { image_id, detail } => {
                write!(f, "failed to decode image {image_id}: {detail}")
            }
            TaskErr::LocalLoad { path, detail } => {
                write!(f, "corrupt local model at {}: {detail}", path.display())
            }
            TaskErr::Model(e) => write!(f, "model error: {e}"),
            TaskErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for TaskErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TaskErr::Download { source, .. } | TaskErr::ImageFetch { source, .. } => Some(source),
            TaskErr::Model(e) => Some(e),
            TaskErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TaskErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<MlErr> for TaskErr {
    fn from(value: MlErr) -> Self {
        Self::Model(value)
    }
}
