//! Effect-handler stack slicing
//!
//! INSTALL leaves a codeless frame carrying a token in the chain. Slicing
//! finds that frame again and cuts the chain just above it, splitting the
//! computation into the part run under the handler and everything below.

use core_types::{Value, VmError, VmResult};
use tracing::debug;

use crate::arena::{FrameArena, FrameId};

/// Result of [`slice_stack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSlice {
    /// The matching handler frame, still linked to everything below it
    pub handler: FrameId,
    /// The frame directly above the handler, now without a caller; `None`
    /// when the handler frame itself was the top
    pub above: Option<FrameId>,
    /// The frame the walk started from
    pub top: FrameId,
}

/// Cut the chain starting at `top` just above the frame whose handler token
/// is identical to `token`.
///
/// When the handler sits directly below `top`, `above` and `top` are the
/// same frame and the cut shows through both handles.
pub fn slice_stack(frames: &mut FrameArena, top: FrameId, token: &Value) -> VmResult<StackSlice> {
    let mut above = None;
    let mut current = Some(top);

    while let Some(id) = current {
        let frame = frames.get(id)?;
        if frame
            .handler_token()
            .is_some_and(|candidate| candidate.identical(token))
        {
            if let Some(above_id) = above {
                frames.get_mut(above_id)?.set_caller(None);
            }
            debug!(handler = %id, top = %top, "stack sliced");
            return Ok(StackSlice {
                handler: id,
                above,
                top,
            });
        }
        above = Some(id);
        current = frame.caller();
    }

    Err(VmError::HandlerNotFound {
        token: token.to_string(),
    })
}
