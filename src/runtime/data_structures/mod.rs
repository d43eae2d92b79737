/// Module contains the Token enumeration and its implementation.  The token is the core data
/// structure of the interpreter: everything the stacks hold is one of its variants.
pub mod token;

/// The named cell-array variable and the non-owning cursor into one.
pub mod variable;

/// User-defined named token sequences.
pub mod procedure;

/// Named primitives and the compiled bodies the control-structure words carry.
pub mod builtin;

/// The dictionary module provides the variable and procedure definition stacks used for name
/// lookup, shadowing and FORGET.
pub mod dictionary;
