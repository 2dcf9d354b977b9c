use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The logo could not be probed for its pixel dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// Column geometry that would divide by zero or produce a non-finite width.
    #[error("invalid column configuration: {columns} columns, {detail}")]
    InvalidColumnConfiguration { columns: usize, detail: String },

    #[error("invalid font: {0}")]
    InvalidFont(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}
