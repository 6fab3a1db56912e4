use dimensional_model::ModelError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum TranslationError {
    #[error("unknown function `{function}`")]
    UnknownFunction { function: String },
    #[error("`{function}` expects {expected} argument(s), got {actual}")]
    WrongArity {
        function: String,
        expected: String,
        actual: usize,
    },
    #[error("invalid argument {index} of `{function}`: {reason}")]
    InvalidArgument {
        function: String,
        index: usize,
        reason: String,
    },
    #[error("unknown attribute `{path}`")]
    UnknownAttribute { path: String },
    #[error("datetime attribute `{path}` needs a granularity")]
    MissingGranularity { path: String },
    #[error("unknown measure function `{function}`")]
    UnknownMeasureFunction { function: String },
    #[error("filter relations reference unknown filter `{guid}`")]
    UnknownFilterReference { guid: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type TranslationResult<T> = Result<T, TranslationError>;
