use crate::DeepDataError;

pub type Result<T> = std::result::Result<T, DeepDataError>;
