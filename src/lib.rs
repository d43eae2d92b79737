/// Module for the source text readers: the line cursor, word extraction and the numeric
/// literal parser.
pub mod lang;

/// Module for the runtime: tokens, dictionaries, the interpreter session and the built-in
/// words.
pub mod runtime;
