//! The interactive compute scheduler.
//!
//! Slider edits arrive faster than the pipe can recompute. The scheduler
//! keeps at most one compute task in flight per pipe and coalesces edits
//! that arrive mid-run: pending parameters are merged per node
//! (last-write-wins for the same node, distinct nodes kept), and one
//! follow-up task drains whatever accumulated. Completed previews are
//! handed back over a channel; the caller never blocks on compute.

use crate::core::error::HdrPipeResult;
use crate::core::image::Image;
use crate::core::params::Params;
use crate::pipe::pipe::ProcessPipe;
use crossbeam::channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// A settled compute result, published once per task.
#[derive(Debug, Clone)]
pub enum PreviewEvent {
    /// Tone-mapped preview reflecting all parameters the task drained.
    Frame(Image),
    /// The task failed; the message is the settled error.
    Failed(String),
}

#[derive(Default)]
struct SchedulerState {
    /// Edits not yet applied, keyed by node index.
    pending: IndexMap<usize, Params>,
    /// A task is currently draining/computing.
    running: bool,
    /// Edits arrived while running; relaunch on completion.
    waiting: bool,
}

struct Inner {
    pipe: Mutex<ProcessPipe>,
    state: Mutex<SchedulerState>,
    tx: Sender<PreviewEvent>,
}

/// Serializes compute over one pipe, coalescing interactive edits.
#[derive(Clone)]
pub struct ComputeScheduler {
    inner: Arc<Inner>,
}

impl ComputeScheduler {
    /// Wrap a pipe; the receiver yields one event per executed task.
    pub fn new(pipe: ProcessPipe) -> (Self, Receiver<PreviewEvent>) {
        let (tx, rx) = unbounded();
        let scheduler = Self {
            inner: Arc::new(Inner {
                pipe: Mutex::new(pipe),
                state: Mutex::new(SchedulerState::default()),
                tx,
            }),
        };
        (scheduler, rx)
    }

    /// Queue a parameter edit for one node and make sure a task will pick
    /// it up. Never blocks on compute.
    pub fn request_compute(&self, node_index: usize, params: Params) {
        let launch = {
            let mut state = self.inner.state.lock();
            state.pending.insert(node_index, params);
            if state.running {
                state.waiting = true;
                false
            } else {
                state.running = true;
                true
            }
        };
        if launch {
            let inner = self.inner.clone();
            rayon::spawn(move || Self::task(inner));
        }
    }

    /// Run a closure against the pipe. Blocks while a task is computing;
    /// meant for idle-time access (serialization, image swap).
    pub fn with_pipe<R>(&self, f: impl FnOnce(&mut ProcessPipe) -> R) -> R {
        f(&mut self.inner.pipe.lock())
    }

    fn task(inner: Arc<Inner>) {
        let pending: Vec<(usize, Params)> = inner.state.lock().pending.drain(..).collect();

        if !pending.is_empty() {
            let result = Self::apply_and_compute(&inner, pending);
            let event = match result {
                Ok(image) => PreviewEvent::Frame(image),
                Err(e) => {
                    log::warn!("compute task failed: {}", e);
                    PreviewEvent::Failed(e.to_string())
                }
            };
            // receiver may be gone during shutdown
            let _ = inner.tx.send(event);
        }

        let relaunch = {
            let mut state = inner.state.lock();
            if state.waiting {
                state.waiting = false;
                true
            } else {
                state.running = false;
                false
            }
        };
        if relaunch {
            let inner = inner.clone();
            rayon::spawn(move || Self::task(inner));
        }
    }

    fn apply_and_compute(
        inner: &Inner,
        pending: Vec<(usize, Params)>,
    ) -> HdrPipeResult<Image> {
        let mut pipe = inner.pipe.lock();
        for (index, params) in pending {
            pipe.set_parameters(index, params)?;
        }
        pipe.compute()?;
        pipe.get_image(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colorspace::ColorSpace;
    use crate::core::error::{ComputeError, ComputeResult};
    use crate::core::params::{bool_or, float_or, params_from};
    use crate::pipe::node::Transform;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_image() -> Image {
        Image::from_data(vec![0.25; 2 * 2 * 3], 2, 2, ColorSpace::Srgb, true).unwrap()
    }

    /// Counts computes; blocks on a gate channel when one is installed.
    #[derive(Clone)]
    struct Probe {
        calls: Arc<AtomicUsize>,
        gate: Option<(Sender<()>, Receiver<()>)>,
    }

    impl Probe {
        fn counting(calls: Arc<AtomicUsize>) -> Self {
            Self { calls, gate: None }
        }
        fn gated(
            calls: Arc<AtomicUsize>,
            started: Sender<()>,
            release: Receiver<()>,
        ) -> Self {
            Self {
                calls,
                gate: Some((started, release)),
            }
        }
    }

    impl Transform for Probe {
        fn name(&self) -> &str {
            "probe"
        }
        fn default_params(&self) -> Params {
            params_from([("amount", 0.0f64)])
        }
        fn validate_params(&self, _params: &Params) -> Result<(), String> {
            // "fail" is accepted here so the error surfaces at compute time
            Ok(())
        }
        fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((started, release)) = &self.gate {
                let _ = started.send(());
                let _ = release.recv_timeout(Duration::from_secs(5));
            }
            if bool_or(params, "fail", false) {
                return Err(ComputeError::Transform {
                    node: "probe".into(),
                    reason: "requested failure".into(),
                });
            }
            let amount = float_or(params, "amount", 0.0) as f32;
            let mut out = input.clone();
            for v in out.data_mut() {
                *v += amount;
            }
            Ok(out)
        }
        fn clone_box(&self) -> Box<dyn Transform> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_single_request_produces_one_frame() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipe = ProcessPipe::new();
        pipe.set_image(test_image());
        pipe.append(
            Box::new(Probe::counting(calls.clone())),
            params_from([("amount", 0.0f64)]),
            "a",
        )
        .unwrap();

        let (scheduler, rx) = ComputeScheduler::new(pipe);
        scheduler.request_compute(0, params_from([("amount", 0.1f64)]));

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            PreviewEvent::Frame(img) => {
                assert!((img.data()[0] - crate::core::colorspace::srgb_cctf_encode(0.35)).abs() < 1e-4);
                assert!(!img.linear);
            }
            PreviewEvent::Failed(e) => panic!("unexpected failure: {}", e),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // idle again: no extra events
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_coalescing_merges_pending_edits() {
        let calls_a = Arc::new(AtomicUsize::new(0));
        let calls_b = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();

        let mut pipe = ProcessPipe::new();
        pipe.set_image(test_image());
        pipe.append(
            Box::new(Probe::gated(calls_a.clone(), started_tx, release_rx)),
            params_from([("amount", 0.0f64)]),
            "a",
        )
        .unwrap();
        pipe.append(
            Box::new(Probe::counting(calls_b.clone())),
            params_from([("amount", 0.0f64)]),
            "b",
        )
        .unwrap();

        let (scheduler, rx) = ComputeScheduler::new(pipe);

        // R1 edits node 0; its task blocks inside the gated transform
        scheduler.request_compute(0, params_from([("amount", 0.1f64)]));
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // R2 and R3 arrive mid-run: same node twice (last wins) plus a
        // distinct node
        scheduler.request_compute(1, params_from([("amount", 0.2f64)]));
        scheduler.request_compute(1, params_from([("amount", 0.3f64)]));
        release_tx.send(()).unwrap();

        // exactly two frames: R1's task and one merged follow-up
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            PreviewEvent::Frame(_)
        ));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            PreviewEvent::Frame(_)
        ));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        // node 0 computed once (follow-up resumed after it), node 1 twice
        assert_eq!(calls_a.load(Ordering::SeqCst), 1);
        assert_eq!(calls_b.load(Ordering::SeqCst), 2);

        // settled parameters reflect the latest values per node
        scheduler.with_pipe(|pipe| {
            assert_eq!(float_or(pipe.get_parameters(0).unwrap(), "amount", -1.0), 0.1);
            assert_eq!(float_or(pipe.get_parameters(1).unwrap(), "amount", -1.0), 0.3);
        });
    }

    #[test]
    fn test_error_releases_busy_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipe = ProcessPipe::new();
        pipe.set_image(test_image());
        pipe.append(
            Box::new(Probe::counting(calls.clone())),
            params_from([("amount", 0.0f64)]),
            "a",
        )
        .unwrap();

        let (scheduler, rx) = ComputeScheduler::new(pipe);
        scheduler.request_compute(0, params_from([("fail", true)]));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            PreviewEvent::Failed(_)
        ));

        // scheduler is idle again and accepts new work
        scheduler.request_compute(0, params_from([("amount", 0.05f64)]));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            PreviewEvent::Frame(_)
        ));
    }
}
