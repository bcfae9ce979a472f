//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of a run failed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not search for files to upload")]
    Discovery,
    #[display("could not open the artifact store")]
    Store,
    #[display("upload failed")]
    Upload,
}
