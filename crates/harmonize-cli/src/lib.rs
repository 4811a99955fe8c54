//! Library side of the `harmonize` binary: table I/O and logging setup.

pub mod io;
pub mod logging;
