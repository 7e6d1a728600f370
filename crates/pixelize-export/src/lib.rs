//! pixelize-export: Pure format serializers (sans-IO)
//!
//! Converts the pipeline's indexed-color output into an encoded file.
//! Currently supports palette PNG.

pub mod png;

pub use self::png::{ExportError, to_png, write_png};
