use winit::dpi::PhysicalSize;

use crate::device::AcquireFailure;

/// Something frames can be acquired from and presented to.
///
/// `Gpu` is the real implementation; anything else is a test double.
pub trait PresentTarget {
    type Frame;

    /// Current framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> PhysicalSize<u32>;

    fn acquire(&mut self) -> Result<Self::Frame, wgpu::SurfaceError>;

    /// Configures the presentation surface for `size`.
    ///
    /// Fails when the surface can no longer be presented in the format the
    /// frame's consumers were built for.
    fn reconfigure(&mut self, size: PhysicalSize<u32>) -> Result<(), FrameError>;

    /// Submits recorded work and presents the frame.
    fn present(&mut self, frame: Self::Frame);
}

/// Why a frame was not drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SkipReason {
    /// Framebuffer has a zero dimension.
    Minimized,
    /// Acquisition reported a stale surface; it was reconfigured instead.
    Reconfigured,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    Skipped(SkipReason),
}

/// Fatal frame failures. The host should stop its loop.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("surface acquisition failed: {0}")]
    Surface(wgpu::SurfaceError),

    #[error("surface no longer supports format {0:?}")]
    FormatUnsupported(wgpu::TextureFormat),

    #[error("frame recording failed")]
    Record(#[source] anyhow::Error),
}

/// Drives acquire → record → present for one presentation target.
#[derive(Debug, Default)]
pub struct FrameOrchestrator {
    minimized: bool,
}

impl FrameOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Reacts to a framebuffer size change.
    ///
    /// A zero dimension only marks the target minimized; the surface is left
    /// untouched until a drawable size arrives.
    pub fn resize<T: PresentTarget>(
        &mut self,
        target: &mut T,
        size: PhysicalSize<u32>,
    ) -> Result<(), FrameError> {
        if size.width == 0 || size.height == 0 {
            if !self.minimized {
                log::debug!("framebuffer minimized");
            }
            self.minimized = true;
            return Ok(());
        }

        self.minimized = false;
        target.reconfigure(size)
    }

    /// Runs one frame.
    ///
    /// `record` is only called when a frame was acquired; its frame is
    /// presented when it returns `Ok` and dropped otherwise.
    pub fn frame<T, F>(&mut self, target: &mut T, record: F) -> Result<FrameOutcome, FrameError>
    where
        T: PresentTarget,
        F: FnOnce(&mut T::Frame) -> anyhow::Result<()>,
    {
        let size = target.framebuffer_size();
        if self.minimized || size.width == 0 || size.height == 0 {
            return Ok(FrameOutcome::Skipped(SkipReason::Minimized));
        }

        let mut frame = match target.acquire() {
            Ok(frame) => frame,
            Err(err) => match AcquireFailure::classify(&err) {
                AcquireFailure::Reconfigure => {
                    log::debug!("surface acquisition returned {err}; reconfiguring");
                    target.reconfigure(size)?;
                    return Ok(FrameOutcome::Skipped(SkipReason::Reconfigured));
                }
                AcquireFailure::Fatal => {
                    log::error!("surface acquisition failed: {err}");
                    return Err(FrameError::Surface(err));
                }
            },
        };

        record(&mut frame).map_err(FrameError::Record)?;
        target.present(frame);

        Ok(FrameOutcome::Presented)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug, Default)]
    struct FakeTarget {
        size: PhysicalSize<u32>,
        acquire_results: VecDeque<Result<u32, wgpu::SurfaceError>>,
        acquired: u32,
        reconfigured: Vec<PhysicalSize<u32>>,
        presented: Vec<u32>,
        format_dropped: bool,
    }

    impl FakeTarget {
        fn sized(width: u32, height: u32) -> Self {
            Self {
                size: PhysicalSize::new(width, height),
                ..Default::default()
            }
        }

        fn then(mut self, result: Result<u32, wgpu::SurfaceError>) -> Self {
            self.acquire_results.push_back(result);
            self
        }
    }

    impl PresentTarget for FakeTarget {
        type Frame = u32;

        fn framebuffer_size(&self) -> PhysicalSize<u32> {
            self.size
        }

        fn acquire(&mut self) -> Result<u32, wgpu::SurfaceError> {
            self.acquired += 1;
            self.acquire_results.pop_front().unwrap_or(Ok(self.acquired))
        }

        fn reconfigure(&mut self, size: PhysicalSize<u32>) -> Result<(), FrameError> {
            if self.format_dropped {
                return Err(FrameError::FormatUnsupported(wgpu::TextureFormat::Bgra8UnormSrgb));
            }
            self.size = size;
            self.reconfigured.push(size);
            Ok(())
        }

        fn present(&mut self, frame: u32) {
            self.presented.push(frame);
        }
    }

    #[test]
    fn outdated_surface_reconfigures_once_and_skips_recording() {
        let mut target = FakeTarget::sized(800, 600).then(Err(wgpu::SurfaceError::Outdated));
        let mut orchestrator = FrameOrchestrator::new();
        let mut recorded = false;

        let outcome = orchestrator
            .frame(&mut target, |_| {
                recorded = true;
                Ok(())
            })
            .unwrap();

        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::Reconfigured));
        assert!(!recorded);
        assert!(target.presented.is_empty());
        assert_eq!(target.reconfigured, vec![PhysicalSize::new(800, 600)]);
    }

    #[test]
    fn timeout_and_lost_are_recoverable() {
        for err in [wgpu::SurfaceError::Timeout, wgpu::SurfaceError::Lost] {
            let mut target = FakeTarget::sized(64, 64).then(Err(err));
            let outcome = FrameOrchestrator::new()
                .frame(&mut target, |_| Ok(()))
                .unwrap();
            assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::Reconfigured));
            assert_eq!(target.reconfigured.len(), 1);
        }
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let mut target = FakeTarget::sized(800, 600).then(Err(wgpu::SurfaceError::OutOfMemory));
        let result = FrameOrchestrator::new().frame(&mut target, |_| Ok(()));

        assert!(matches!(
            result,
            Err(FrameError::Surface(wgpu::SurfaceError::OutOfMemory))
        ));
        assert!(target.reconfigured.is_empty());
        assert!(target.presented.is_empty());
    }

    #[test]
    fn acquired_frame_is_recorded_then_presented() {
        let mut target = FakeTarget::sized(800, 600);
        let mut orchestrator = FrameOrchestrator::new();
        let mut seen = None;

        let outcome = orchestrator
            .frame(&mut target, |frame| {
                seen = Some(*frame);
                Ok(())
            })
            .unwrap();

        assert_eq!(outcome, FrameOutcome::Presented);
        assert_eq!(seen, Some(1));
        assert_eq!(target.presented, vec![1]);
        assert!(target.reconfigured.is_empty());
    }

    #[test]
    fn record_failure_drops_the_frame() {
        let mut target = FakeTarget::sized(800, 600);
        let result = FrameOrchestrator::new().frame(&mut target, |_| anyhow::bail!("boom"));

        assert!(matches!(result, Err(FrameError::Record(_))));
        assert!(target.presented.is_empty());
    }

    #[test]
    fn minimize_then_restore_reconfigures_exactly_once() {
        let mut target = FakeTarget::sized(800, 600);
        let mut orchestrator = FrameOrchestrator::new();

        orchestrator.resize(&mut target, PhysicalSize::new(0, 0)).unwrap();
        assert!(orchestrator.is_minimized());
        assert!(target.reconfigured.is_empty());

        let outcome = orchestrator.frame(&mut target, |_| Ok(())).unwrap();
        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::Minimized));
        assert_eq!(target.acquired, 0);

        orchestrator.resize(&mut target, PhysicalSize::new(800, 600)).unwrap();
        assert!(!orchestrator.is_minimized());
        assert_eq!(target.reconfigured, vec![PhysicalSize::new(800, 600)]);

        let outcome = orchestrator.frame(&mut target, |_| Ok(())).unwrap();
        assert_eq!(outcome, FrameOutcome::Presented);
    }

    #[test]
    fn zero_sized_target_never_acquires() {
        let mut target = FakeTarget::sized(0, 600);
        let outcome = FrameOrchestrator::new().frame(&mut target, |_| Ok(())).unwrap();

        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::Minimized));
        assert_eq!(target.acquired, 0);
    }

    #[test]
    fn losing_the_configured_format_is_fatal() {
        let mut target = FakeTarget::sized(800, 600).then(Err(wgpu::SurfaceError::Lost));
        target.format_dropped = true;
        let mut recorded = false;

        let result = FrameOrchestrator::new().frame(&mut target, |_| {
            recorded = true;
            Ok(())
        });

        assert!(matches!(result, Err(FrameError::FormatUnsupported(_))));
        assert!(!recorded);
        assert!(target.presented.is_empty());
    }

    #[test]
    fn resize_reports_a_dropped_format() {
        let mut target = FakeTarget::sized(800, 600);
        target.format_dropped = true;
        let mut orchestrator = FrameOrchestrator::new();

        let result = orchestrator.resize(&mut target, PhysicalSize::new(1024, 768));
        assert!(matches!(result, Err(FrameError::FormatUnsupported(_))));
        assert!(target.reconfigured.is_empty());
    }
}
