//! Compilation stage: the external collaborators behind the pipeline.
//!
//! Each compiler follows the same contract: given an input file, produce an
//! output file in the flat output root (and optionally a source map). The
//! pipeline core never looks inside these - it only sequences them and
//! rewrites the text they produce.

pub mod markup;
pub mod minify;
pub mod script;
pub mod stylesheet;
