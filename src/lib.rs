// lib.rs
//
// mini-photoshop: the core of a small single-window image editor.
//
// An editing session holds one original image and one processed copy. Each of
// the five fixed filters rebuilds the processed copy from the original.
//
// Design goals:
// - Every failure is a typed error; the caller keeps its previous state
// - Filters always start from the original (no chaining)
// - Numeric backends sit behind traits (Convolver, EdgeDetector, Resampler)

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod ops;
pub mod session;

pub use buffer::{ImageBuffer, LumaPlane};
pub use config::{DisplayBounds, EditorConfig};
pub use engine::{
    Codec, DisplayFrame, DisplayScaler, FileCodec, FilterEngine, SaveReport,
};
pub use error::{EditorError, ErrorKind, Result};
pub use ops::{FilterOperation, OutputFormat};
pub use session::{Command, CommandOutcome, EditorSession};
