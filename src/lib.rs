pub mod instance;
pub mod lazy;

pub mod io {
    pub mod binary;
    pub mod durable;
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("can't encode shared instance: {0}")]
    Encode(#[from] bincode::Error),
    #[error(transparent)]
    Decode(#[from] io::durable::DecodeError),
}
