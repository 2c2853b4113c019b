use std::collections::VecDeque;
use std::sync::Mutex;

// ---

use tokio::sync::mpsc;

// ---

use netwatch_domain::{
    // ---
    MeasurementStatus,
    NetWatchError,
    RangingChangeReason,
    RangingEvent,
    RangingMeasurement,
    RangingParams,
    RangingReport,
    Result,
    SessionHandle,
    UwbAdapter,
};

// ---------------------------------------------------------------------------
// AdapterCall
// ---------------------------------------------------------------------------

/// One command received by [`SimUwbAdapter`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterCall {
    // ---
    Open(RangingParams),
    Start(SessionHandle, RangingParams),
    Reconfigure(SessionHandle, RangingParams),
    Stop(SessionHandle),
    Close(SessionHandle),
}

// ---------------------------------------------------------------------------
// SimUwbAdapter
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct AdapterState {
    // ---
    /// Handles returned by upcoming `open_ranging` calls, front first.
    scripted: VecDeque<SessionHandle>,

    /// Next auto-assigned handle once `scripted` is empty.
    next_handle: i32,

    /// If set, the next `open_ranging` fails with this message.
    fail_next_open: Option<String>,

    calls: Vec<AdapterCall>,
}

// ---

/// In-process ranging adapter.
///
/// Records every command. Handles come from a scripted queue, then from an
/// auto-incrementing counter starting at 1. When built with
/// [`with_events`](Self::with_events), it also pushes the events a real
/// adapter would send back (opened, started plus reports, stopped, ...).
pub struct SimUwbAdapter {
    // ---
    state: Mutex<AdapterState>,
    events: Option<mpsc::UnboundedSender<RangingEvent>>,
    reports_per_start: usize,
}

// ---

impl Default for SimUwbAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ---

impl SimUwbAdapter {
    // ---
    /// Silent adapter: records calls, pushes nothing.
    pub fn new() -> Self {
        // ---
        Self {
            state: Mutex::new(AdapterState {
                scripted: VecDeque::new(),
                next_handle: 1,
                fail_next_open: None,
                calls: Vec::new(),
            }),
            events: None,
            reports_per_start: 0,
        }
    }

    // ---

    /// Push adapter events into `tx`; each successful start is followed by
    /// `reports_per_start` ranging reports.
    pub fn with_events(
        mut self,
        tx: mpsc::UnboundedSender<RangingEvent>,
        reports_per_start: usize,
    ) -> Self {
        self.events = Some(tx);
        self.reports_per_start = reports_per_start;
        self
    }

    // ---

    /// Queue handles to return from the next `open_ranging` calls.
    pub fn script_handles(&self, handles: impl IntoIterator<Item = SessionHandle>) {
        self.lock().scripted.extend(handles);
    }

    /// Make the next `open_ranging` fail with a remote error.
    pub fn fail_next_open(&self, message: impl Into<String>) {
        self.lock().fail_next_open = Some(message.into());
    }

    pub fn calls(&self) -> Vec<AdapterCall> {
        self.lock().calls.clone()
    }

    pub fn open_count(&self) -> usize {
        // ---
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, AdapterCall::Open(_)))
            .count()
    }

    // ---

    fn lock(&self) -> std::sync::MutexGuard<'_, AdapterState> {
        // A panicking test thread must not hide later assertions.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, event: RangingEvent) {
        // ---
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("ranging event receiver gone, dropping event");
            }
        }
    }

    fn report_for(&self, handle: SessionHandle, seq: usize) -> RangingReport {
        // ---
        let peer = (handle.0 as u16).wrapping_mul(0x0101);
        RangingReport {
            measurements: vec![RangingMeasurement {
                peer,
                status: MeasurementStatus::Success,
                distance_m: Some(1.0 + seq as f64 * 0.25),
                azimuth_deg: Some(-10.0 + seq as f64),
                elevation_deg: None,
                elapsed_realtime_nanos: (seq as u64 + 1) * 200_000_000,
            }],
        }
    }
}

// ---

impl UwbAdapter for SimUwbAdapter {
    // ---
    fn open_ranging(&self, params: &RangingParams) -> Result<SessionHandle> {
        // ---
        let handle = {
            let mut st = self.lock();
            st.calls.push(AdapterCall::Open(params.clone()));

            if let Some(msg) = st.fail_next_open.take() {
                return Err(NetWatchError::Remote(msg));
            }

            match st.scripted.pop_front() {
                Some(h) => h,
                None => {
                    let h = SessionHandle(st.next_handle);
                    st.next_handle += 1;
                    h
                }
            }
        };

        tracing::debug!(%handle, "sim adapter: open_ranging");
        self.push(RangingEvent::Opened { handle });
        Ok(handle)
    }

    // ---

    fn start_ranging(&self, handle: SessionHandle, params: &RangingParams) -> Result<()> {
        // ---
        self.lock()
            .calls
            .push(AdapterCall::Start(handle, params.clone()));

        tracing::debug!(%handle, "sim adapter: start_ranging");
        self.push(RangingEvent::Started {
            handle,
            params: params.clone(),
        });
        for seq in 0..self.reports_per_start {
            self.push(RangingEvent::Result {
                handle,
                report: self.report_for(handle, seq),
            });
        }
        Ok(())
    }

    // ---

    fn reconfigure_ranging(&self, handle: SessionHandle, params: &RangingParams) -> Result<()> {
        // ---
        self.lock()
            .calls
            .push(AdapterCall::Reconfigure(handle, params.clone()));

        self.push(RangingEvent::Reconfigured {
            handle,
            params: params.clone(),
        });
        Ok(())
    }

    // ---

    fn stop_ranging(&self, handle: SessionHandle) -> Result<()> {
        // ---
        self.lock().calls.push(AdapterCall::Stop(handle));
        self.push(RangingEvent::Stopped { handle });
        Ok(())
    }

    // ---

    fn close_ranging(&self, handle: SessionHandle) -> Result<()> {
        // ---
        self.lock().calls.push(AdapterCall::Close(handle));
        self.push(RangingEvent::Closed {
            handle,
            reason: RangingChangeReason::LocalApi.as_raw(),
            params: RangingParams::new(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
