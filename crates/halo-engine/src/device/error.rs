/// How the frame loop should react to a failed surface acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AcquireFailure {
    /// Expected on resize or a driver hiccup: reconfigure and drop this frame.
    Reconfigure,
    /// Unrecoverable; stop rendering.
    Fatal,
}

impl AcquireFailure {
    pub fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Timeout
            | wgpu::SurfaceError::Outdated
            | wgpu::SurfaceError::Lost => AcquireFailure::Reconfigure,
            _ => AcquireFailure::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses_reconfigure() {
        for err in [
            wgpu::SurfaceError::Timeout,
            wgpu::SurfaceError::Outdated,
            wgpu::SurfaceError::Lost,
        ] {
            assert_eq!(AcquireFailure::classify(&err), AcquireFailure::Reconfigure);
        }
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(
            AcquireFailure::classify(&wgpu::SurfaceError::OutOfMemory),
            AcquireFailure::Fatal
        );
        assert_eq!(AcquireFailure::classify(&wgpu::SurfaceError::Other), AcquireFailure::Fatal);
    }
}
