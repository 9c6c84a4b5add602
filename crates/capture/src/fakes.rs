use std::cell::Cell;

use layers::OverlaySpec;

use crate::frame::{CapturedImage, FrameError, SceneFrame};

/// Scriptable scene for flow tests. Captures encode the attached overlay's
/// time token into pixel data, so different dates produce different images.
pub(crate) struct FakeScene {
    pub generation: u64,
    pub destroyed: bool,
    /// `imagery_ready` turns true after this many polls.
    pub ready_after_polls: usize,
    polls: Cell<usize>,
    pub attached: Option<OverlaySpec>,
    /// Every spec ever applied, in order.
    pub applied: Vec<OverlaySpec>,
    pub fail_render: bool,
    /// Fail the nth `capture_frame` call (1-based).
    pub fail_capture_at: Option<usize>,
    captures: usize,
    pub size: (u32, u32),
}

impl FakeScene {
    pub fn new() -> Self {
        Self {
            generation: 1,
            destroyed: false,
            ready_after_polls: 0,
            polls: Cell::new(0),
            attached: None,
            applied: Vec::new(),
            fail_render: false,
            fail_capture_at: None,
            captures: 0,
            size: (16, 16),
        }
    }

    pub fn with_overlay(spec: OverlaySpec) -> Self {
        let mut scene = Self::new();
        scene.attached = Some(spec);
        scene
    }

    pub fn polls_seen(&self) -> usize {
        self.polls.get()
    }
}

impl SceneFrame for FakeScene {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn imagery_ready(&self) -> bool {
        let seen = self.polls.get() + 1;
        self.polls.set(seen);
        seen > self.ready_after_polls
    }

    fn attached_overlay(&self) -> Option<OverlaySpec> {
        self.attached.clone()
    }

    fn apply_overlay(&mut self, spec: &OverlaySpec) {
        self.attached = Some(spec.clone());
        self.applied.push(spec.clone());
    }

    async fn render(&mut self) -> Result<(), FrameError> {
        if self.fail_render {
            return Err(FrameError::Render("scripted render failure".into()));
        }
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<CapturedImage, FrameError> {
        self.captures += 1;
        if self.fail_capture_at == Some(self.captures) {
            return Err(FrameError::Render("scripted capture failure".into()));
        }

        let (w, h) = self.size;
        let mut rgba = vec![0u8; (w * h * 4) as usize];
        for px in rgba.chunks_exact_mut(4) {
            px[3] = 255;
        }
        if let Some(spec) = &self.attached {
            for (i, byte) in spec
                .time
                .wmts_token()
                .bytes()
                .enumerate()
                .take((w * h) as usize)
            {
                rgba[i * 4] = byte;
            }
        }
        CapturedImage::from_rgba(w, h, &rgba)
    }
}
