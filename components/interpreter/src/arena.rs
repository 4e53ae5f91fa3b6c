//! Frame arena with free list and generation-stamped handles.

use std::fmt;

use core_types::{VmError, VmResult};

use crate::call_frame::Frame;
use crate::config::DEFAULT_MAX_DEPTH;

/// Handle to a frame in a [`FrameArena`]
///
/// A slot reused after `free` gets a new generation, so a handle kept past
/// its frame's lifetime is detected instead of aliasing the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId {
    index: u32,
    generation: u32,
}

impl FrameId {
    /// Slot index inside the arena
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    frame: Option<Frame>,
}

/// Owner of every frame of one interpreter
#[derive(Debug)]
pub struct FrameArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
    max_depth: usize,
}

impl FrameArena {
    /// Create an empty arena with the default depth limit
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an empty arena whose calls may not exceed `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        FrameArena {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            max_depth,
        }
    }

    /// Depth limit enforced by calls
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Store `frame` and return its handle
    pub fn alloc(&mut self, frame: Frame) -> FrameId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.frame = Some(frame);
            FrameId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                frame: Some(frame),
            });
            FrameId {
                index,
                generation: 0,
            }
        }
    }

    /// Remove a frame, returning it
    pub fn free(&mut self, id: FrameId) -> VmResult<Frame> {
        let slot = self.slot_mut(id)?;
        let frame = slot.frame.take().ok_or_else(|| stale(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.live -= 1;
        Ok(frame)
    }

    /// Borrow a live frame
    pub fn get(&self, id: FrameId) -> VmResult<&Frame> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.frame.as_ref())
            .ok_or_else(|| stale(id))
    }

    /// Mutably borrow a live frame
    pub fn get_mut(&mut self, id: FrameId) -> VmResult<&mut Frame> {
        self.slot_mut(id)?.frame.as_mut().ok_or_else(|| stale(id))
    }

    fn slot_mut(&mut self, id: FrameId) -> VmResult<&mut Slot> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .ok_or_else(|| stale(id))
    }

    /// Check if `id` still names a live frame
    pub fn contains(&self, id: FrameId) -> bool {
        self.get(id).is_ok()
    }

    /// Walk from `top` down the caller links
    pub fn chain(&self, top: FrameId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(top),
        }
    }

    /// Number of frames reachable from `top`, `top` included
    pub fn chain_len(&self, top: FrameId) -> usize {
        self.chain(top).count()
    }

    /// Store a copy of frame `id` and return the copy's handle
    pub fn clone_frame(&mut self, id: FrameId) -> VmResult<FrameId> {
        let copy = self.get(id)?.clone();
        Ok(self.alloc(copy))
    }

    /// Free `top` and every frame below it; returns how many were freed
    pub fn free_chain(&mut self, top: FrameId) -> VmResult<usize> {
        let mut freed = 0;
        let mut next = Some(top);
        while let Some(id) = next {
            next = self.free(id)?.caller();
            freed += 1;
        }
        Ok(freed)
    }

    /// Number of live frames
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if no frame is live
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::new()
    }
}

fn stale(id: FrameId) -> VmError {
    VmError::Internal(format!("stale frame handle {}", id))
}

/// Iterator over a frame chain, most recent frame first
#[derive(Debug)]
pub struct Chain<'a> {
    arena: &'a FrameArena,
    next: Option<FrameId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (FrameId, &'a Frame);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let frame = self.arena.get(id).ok()?;
        self.next = frame.caller();
        Some((id, frame))
    }
}
