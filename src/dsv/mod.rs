//! DSV primitives: the resumable parse step and the encoder

mod decoder;
mod encoder;
mod parser;

pub use decoder::ChunkDecoder;
pub use encoder::{format_row, format_rows, format_value, DsvEncoder};
pub use parser::{flush, parse, ParseState, Parser};
