// Internal modules
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod output;
pub mod source;
pub mod tokens;

// Re-export key types for library consumers
pub use file_processor::{FileProcessingResult, FileProcessor, FileProcessorError};
pub use lexical::{
    tokenize_file_result, tokenize_reader, tokenize_source, tokenize_str, LexerError, Tokenizer,
};
pub use output::{write_token, write_tokens, OutputError, TokenReport};
pub use source::{CharSource, ReaderSource, SourceError, StrSource};
pub use tokens::{MalformedToken, Token, TokenKind, TokenStream};
