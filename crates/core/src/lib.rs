//! Core shared types and errors (renderer-agnostic).

pub use glam::{DVec2, dvec2};

pub mod color;
pub mod rect;

pub use color::Color;
pub use rect::{PageRect, TexRect};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Page {index} out of range (page count {count})")]
    PageOutOfRange { index: usize, count: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_message_names_both_numbers() {
        let err = CoreError::PageOutOfRange { index: 7, count: 3 };
        assert_eq!(err.to_string(), "Page 7 out of range (page count 3)");
    }

    #[test]
    fn io_errors_convert() {
        fn open() -> CoreResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(CoreError::Io(_))));
    }
}
