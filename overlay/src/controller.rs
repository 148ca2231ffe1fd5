//! Overlay lifecycle controller.
//!
//! The host UI sees exactly two entry points: [`OverlayController::start`]
//! and [`OverlayController::request_terminate`], plus the running flag it
//! polls to enable/disable its controls. One overlay may run at a time.
//!
//! # Threading model
//!
//! Platform window handles are thread-affine (Win32 HWNDs must be used from
//! the thread that created them), so the overlay is created INSIDE its
//! dedicated thread via a factory, with a confirmation channel reporting
//! whether creation succeeded. Lifecycle commands travel over a channel
//! rather than shared flags, and the thread is joined (never detached) so
//! teardown completes before process exit.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{info, warn};

use easymetrics_core::{HardwareProvider, MetricsProvider, OverlayStyle, SelectionSet};

use crate::platform::{NativeOverlay, OverlayPlatform, PlatformError};
use crate::runtime::OverlayRuntime;

/// Lifecycle state as observed by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// No overlay; `start` is enabled.
    Idle,
    /// An overlay thread is live; `request_terminate` is enabled.
    Running,
    /// Shutdown has been requested but teardown has not finished yet.
    /// `start` stays disabled until the thread publishes `Idle` by exiting.
    Terminating,
}

/// Why a `start` call did not start an overlay.
#[derive(Debug)]
pub enum StartError {
    /// Empty selection; the host surfaces this as a disabled control.
    NothingSelected,
    /// An overlay is already `Running` or `Terminating`.
    AlreadyRunning,
    /// Window or session construction failed; fatal to this instance only.
    Platform(PlatformError),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::NothingSelected => write!(f, "no metrics selected"),
            StartError::AlreadyRunning => write!(f, "an overlay is already running"),
            StartError::Platform(e) => write!(f, "overlay creation failed: {}", e),
        }
    }
}

impl std::error::Error for StartError {}

/// Commands sent to the overlay thread.
enum OverlayCommand {
    Shutdown,
}

/// Handle to the running overlay thread.
struct ActiveOverlay {
    tx: mpsc::Sender<OverlayCommand>,
    handle: JoinHandle<()>,
    shutdown_sent: bool,
}

type ProviderFactory = Arc<dyn Fn() -> Box<dyn MetricsProvider + Send> + Send + Sync>;

/// The overlay lifecycle state machine.
///
/// Generic over the platform backend so the full start/terminate cycle is
/// testable against the windowless fake; production code uses the default
/// [`NativeOverlay`].
pub struct OverlayController<P: OverlayPlatform + 'static = NativeOverlay> {
    provider_factory: ProviderFactory,
    active: Option<ActiveOverlay>,
    _platform: std::marker::PhantomData<fn() -> P>,
}

impl OverlayController<NativeOverlay> {
    /// Controller backed by the native window and the hardware provider.
    pub fn new() -> Self {
        Self::with_provider(|| Box::new(HardwareProvider::connect()))
    }
}

impl Default for OverlayController<NativeOverlay> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OverlayPlatform + 'static> OverlayController<P> {
    /// Controller with a custom provider factory. The factory runs inside
    /// the overlay thread, once per `start`, so each overlay owns a fresh
    /// session for its whole lifetime.
    pub fn with_provider<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn MetricsProvider + Send> + Send + Sync + 'static,
    {
        Self {
            provider_factory: Arc::new(factory),
            active: None,
            _platform: std::marker::PhantomData,
        }
    }

    /// Current lifecycle state. `Idle` is published only once the overlay
    /// thread has finished its teardown.
    pub fn state(&self) -> OverlayState {
        match &self.active {
            None => OverlayState::Idle,
            Some(a) if a.handle.is_finished() => OverlayState::Idle,
            Some(a) if a.shutdown_sent => OverlayState::Terminating,
            Some(_) => OverlayState::Running,
        }
    }

    /// The flag the host UI polls to enable/disable its controls.
    pub fn is_running(&self) -> bool {
        self.state() != OverlayState::Idle
    }

    /// Start an overlay for `selection` with `style`, both captured by
    /// value. Valid only from `Idle` with a non-empty selection; rejected
    /// synchronously otherwise.
    pub fn start(
        &mut self,
        selection: SelectionSet,
        style: OverlayStyle,
    ) -> Result<(), StartError> {
        if selection.is_empty() {
            return Err(StartError::NothingSelected);
        }

        // Reap a finished thread (window closed from the window manager) so
        // the controller is genuinely Idle again.
        match self.active.take() {
            Some(active) if active.handle.is_finished() => {
                let _ = active.handle.join();
            }
            Some(active) => {
                self.active = Some(active);
                return Err(StartError::AlreadyRunning);
            }
            None => {}
        }

        let (tx, mut rx) = mpsc::channel::<OverlayCommand>(8);
        let (confirm_tx, confirm_rx) = std::sync::mpsc::channel::<Result<(), PlatformError>>();
        let factory = Arc::clone(&self.provider_factory);

        let handle = thread::spawn(move || {
            // Window and session are created inside this thread; the handle
            // never crosses a thread boundary.
            let provider = factory();
            let mut runtime = match OverlayRuntime::<P>::create(selection, style, provider) {
                Ok(runtime) => {
                    let _ = confirm_tx.send(Ok(()));
                    runtime
                }
                Err(e) => {
                    let _ = confirm_tx.send(Err(e));
                    return;
                }
            };

            'run: loop {
                loop {
                    match rx.try_recv() {
                        Ok(OverlayCommand::Shutdown) => break 'run,
                        // Controller gone: treat as shutdown rather than
                        // running orphaned.
                        Err(TryRecvError::Disconnected) => break 'run,
                        Err(TryRecvError::Empty) => break,
                    }
                }

                // The tick pumps events, runs the metric cadence when due,
                // and redraws; false means the window was closed.
                if !runtime.tick(Instant::now()) {
                    break;
                }

                thread::sleep(runtime.frame_budget(Instant::now()));
            }

            runtime.shutdown();
        });

        match confirm_rx.recv() {
            Ok(Ok(())) => {
                info!(selection = selection.bits(), "overlay started");
                self.active = Some(ActiveOverlay { tx, handle, shutdown_sent: false });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                warn!(error = %e, "overlay failed to start");
                Err(StartError::Platform(e))
            }
            Err(_) => {
                let _ = handle.join();
                Err(StartError::Platform(PlatformError::Other(
                    "overlay thread exited before confirming creation".to_string(),
                )))
            }
        }
    }

    /// Ask the running overlay to shut down. The cancellation is observed at
    /// the next presentation tick; the state reads `Terminating` until
    /// teardown finishes. No-op when already `Idle` or `Terminating`.
    pub fn request_terminate(&mut self) {
        let Some(active) = &mut self.active else {
            return;
        };
        if active.shutdown_sent || active.handle.is_finished() {
            return;
        }

        // Capacity is never exhausted: shutdown is the only command and it
        // is sent at most once.
        if active.tx.try_send(OverlayCommand::Shutdown).is_ok() {
            active.shutdown_sent = true;
            info!("overlay terminate requested");
        }
    }

    /// Wait (bounded) for the overlay thread to finish its teardown.
    /// Returns true once the controller is `Idle`.
    pub fn join(&mut self, timeout: Duration) -> bool {
        let Some(active) = self.active.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !active.handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("overlay thread still tearing down after {:?}", timeout);
                self.active = Some(active);
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }

        let _ = active.handle.join();
        true
    }
}

impl<P: OverlayPlatform + 'static> Drop for OverlayController<P> {
    fn drop(&mut self) {
        if self.active.is_some() {
            self.request_terminate();
            self.join(Duration::from_secs(2));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use easymetrics_core::MetricKind;

    use super::*;
    use crate::platform::fake::{FakeOverlay, guard, recorded};

    fn controller() -> OverlayController<FakeOverlay> {
        OverlayController::with_provider(|| Box::new(|_: MetricKind| Some(1.0)))
    }

    /// Poll until `pred` holds or the timeout expires.
    fn wait_for(pred: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if pred() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn start_rejects_empty_selection() {
        let _guard = guard();
        let mut ctl = controller();

        let result = ctl.start(SelectionSet::empty(), OverlayStyle::default());
        assert!(matches!(result, Err(StartError::NothingSelected)));
        assert_eq!(ctl.state(), OverlayState::Idle);
        // Rejection is synchronous: no window was ever attempted.
        assert_eq!(recorded().created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_enforces_single_instance() {
        let _guard = guard();
        let mut ctl = controller();

        ctl.start(SelectionSet::from_bits(0b1), OverlayStyle::default())
            .expect("first start");
        assert_eq!(ctl.state(), OverlayState::Running);

        let second = ctl.start(SelectionSet::from_bits(0b10), OverlayStyle::default());
        assert!(matches!(second, Err(StartError::AlreadyRunning)));
        assert_eq!(recorded().created.load(Ordering::SeqCst), 1);

        ctl.request_terminate();
        assert!(ctl.join(Duration::from_secs(2)));
    }

    #[test]
    fn terminate_reaches_idle_and_is_idempotent() {
        let _guard = guard();
        let mut ctl = controller();

        // Terminate while Idle is a no-op.
        ctl.request_terminate();
        assert_eq!(ctl.state(), OverlayState::Idle);

        ctl.start(SelectionSet::full(), OverlayStyle::default())
            .expect("start");

        ctl.request_terminate();
        ctl.request_terminate(); // second request is a no-op
        assert_ne!(ctl.state(), OverlayState::Running);

        assert!(ctl.join(Duration::from_secs(2)));
        assert_eq!(ctl.state(), OverlayState::Idle);
        assert!(!ctl.is_running());
        // Teardown destroyed the window before Idle was published.
        assert!(!recorded().alive.load(Ordering::SeqCst));
    }

    #[test]
    fn window_close_is_equivalent_to_terminate() {
        let _guard = guard();
        let mut ctl = controller();

        ctl.start(SelectionSet::from_bits(0b1), OverlayStyle::default())
            .expect("start");

        // The user closes the overlay window directly.
        recorded().close_requested.store(true, Ordering::SeqCst);
        assert!(wait_for(|| !ctl.is_running()), "controller never returned to Idle");

        // A fresh start succeeds after the close.
        recorded().close_requested.store(false, Ordering::SeqCst);
        ctl.start(SelectionSet::from_bits(0b1), OverlayStyle::default())
            .expect("restart after close");
        assert_eq!(recorded().created.load(Ordering::SeqCst), 2);

        ctl.request_terminate();
        assert!(ctl.join(Duration::from_secs(2)));
    }

    #[test]
    fn creation_failure_is_fatal_to_the_instance_only() {
        let _guard = guard();
        let mut ctl = controller();

        recorded().fail_creation.store(true, Ordering::SeqCst);
        let result = ctl.start(SelectionSet::from_bits(0b1), OverlayStyle::default());
        assert!(matches!(result, Err(StartError::Platform(_))));
        assert_eq!(ctl.state(), OverlayState::Idle);

        // The controller recovers once the platform does.
        recorded().fail_creation.store(false, Ordering::SeqCst);
        ctl.start(SelectionSet::from_bits(0b1), OverlayStyle::default())
            .expect("start after platform recovery");

        ctl.request_terminate();
        assert!(ctl.join(Duration::from_secs(2)));
    }

    #[test]
    fn dropping_the_controller_stops_the_overlay() {
        let _guard = guard();
        let mut ctl = controller();

        ctl.start(SelectionSet::from_bits(0b1), OverlayStyle::default())
            .expect("start");
        drop(ctl);

        assert!(!recorded().alive.load(Ordering::SeqCst));
    }
}
