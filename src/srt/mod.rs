//! Subtitle (SRT) translation: parsing, chunked translation through a
//! [`CompletionProvider`](crate::core::traits::CompletionProvider), and
//! per-language term refinement.

pub mod dictionary;
pub mod parser;
pub mod pipeline;

pub use dictionary::{DataDictionary, DictionaryEntry, apply_dictionary, refine_entries};
pub use parser::{SrtEntry, format_srt, parse_srt};
pub use pipeline::{
    ChunkLimits, SrtOptions, SrtTranslator, chunk_entries, split_translation, translated_file_name,
};
