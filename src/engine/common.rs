// src/engine/common.rs
//
// Common utilities shared across engine modules.
// Provides the engine Result alias and panic containment for native codecs.

use crate::error::EditorError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Engine-wide result type; always carries EditorError so the taxonomy
/// survives every layer.
pub type EngineResult<T> = std::result::Result<T, EditorError>;

/// Which side of the codec boundary a guarded call belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CodecStage {
    Decode,
    Encode,
}

/// Run a codec call, turning a panic inside the backend into a typed error.
///
/// libjpeg errors are raised as Rust panics by the mozjpeg bindings; callers
/// must see DecodeError/EncodeError instead of an unwinding stack.
pub(crate) fn run_guarded<T>(
    stage: CodecStage,
    label: &'static str,
    f: impl FnOnce() -> EngineResult<T>,
) -> EngineResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(target: "mini_photoshop::codec", %label, %message, "codec panicked");
            Err(match stage {
                CodecStage::Decode => {
                    EditorError::decode_failed(format!("{label}: codec panicked: {message}"))
                }
                CodecStage::Encode => {
                    EditorError::encode_failed(label, format!("codec panicked: {message}"))
                }
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
