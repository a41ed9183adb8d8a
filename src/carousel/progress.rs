//! Per-slide progress markers for the active group.

use super::autoplay::AutoplayState;

/// Display state of one marker in the progress row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMarker {
    /// Not reached yet.
    Neutral,
    /// The slide on screen. The fill animates over `duration_ms`.
    Current {
        duration_ms: u64,
        elapsed_ms: u64,
        paused: bool,
    },
    /// Already seen.
    Completed,
}

impl ProgressMarker {
    /// Fill fraction in `0.0..=1.0`.
    pub fn fill(&self) -> f64 {
        match *self {
            ProgressMarker::Neutral => 0.0,
            ProgressMarker::Completed => 1.0,
            ProgressMarker::Current {
                duration_ms,
                elapsed_ms,
                ..
            } => {
                if duration_ms == 0 {
                    0.0
                } else {
                    (elapsed_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
                }
            }
        }
    }
}

/// Markers for a group of `slots` slides with `index` on screen.
pub fn progress_markers(
    slots: usize,
    index: usize,
    autoplay: &AutoplayState,
) -> Vec<ProgressMarker> {
    (0..slots)
        .map(|i| {
            if i < index {
                ProgressMarker::Completed
            } else if i == index {
                ProgressMarker::Current {
                    duration_ms: autoplay.interval_ms(),
                    elapsed_ms: autoplay.elapsed_ms(),
                    paused: autoplay.is_paused(),
                }
            } else {
                ProgressMarker::Neutral
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_around_current() {
        let autoplay = AutoplayState::new(3000);
        let markers = progress_markers(4, 2, &autoplay);
        assert_eq!(markers[0], ProgressMarker::Completed);
        assert_eq!(markers[1], ProgressMarker::Completed);
        assert_eq!(
            markers[2],
            ProgressMarker::Current {
                duration_ms: 3000,
                elapsed_ms: 0,
                paused: false
            }
        );
        assert_eq!(markers[3], ProgressMarker::Neutral);
    }

    #[test]
    fn current_reflects_pause_and_elapsed() {
        let mut autoplay = AutoplayState::new(4000);
        autoplay.tick();
        autoplay.pause();
        let markers = progress_markers(1, 0, &autoplay);
        assert_eq!(
            markers[0],
            ProgressMarker::Current {
                duration_ms: 4000,
                elapsed_ms: 1000,
                paused: true
            }
        );
        assert!((markers[0].fill() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn fill_bounds() {
        assert_eq!(ProgressMarker::Neutral.fill(), 0.0);
        assert_eq!(ProgressMarker::Completed.fill(), 1.0);
        let degenerate = ProgressMarker::Current {
            duration_ms: 0,
            elapsed_ms: 0,
            paused: false,
        };
        assert_eq!(degenerate.fill(), 0.0);
    }
}
