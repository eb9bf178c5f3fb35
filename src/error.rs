use crate::{dataset::DatasetError, filter::FilterError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `dataset` module")]
    Dataset(#[from] DatasetError),
    #[error("Error in the `filter` module")]
    Filter(#[from] FilterError),
}
