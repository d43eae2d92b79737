/// Module for the line cursor and whitespace-delimited word reader.
pub mod line;

/// Module for the tagged numeric value and base-N literal support.
pub mod number;
