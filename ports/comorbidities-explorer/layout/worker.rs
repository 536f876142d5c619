/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layout worker thread for non-blocking runs.

use super::force::{ForceLayout, LayoutJob};
use super::{LayoutConfig, LayoutEngine};
use crate::graph::GraphStore;
use crate::view_state::Parameters;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use euclid::default::Point2D;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Command to send to the layout worker
pub enum LayoutCommand {
    /// Lay out a job, tagged with its run number
    Run(u64, LayoutJob),

    /// Shutdown the worker
    Shutdown,
}

/// Response from the layout worker
#[derive(Debug)]
pub enum LayoutResponse {
    /// Final positions of a finished (not superseded) run
    Positions(u64, HashMap<String, Point2D<f32>>),
}

/// `ForceLayout` running on a background thread.
///
/// Every `run` or `stop` bumps a shared run counter; the worker abandons a
/// simulation as soon as the counter moves past the run it is working on.
pub struct LayoutWorker {
    command_tx: Sender<LayoutCommand>,
    response_rx: Receiver<LayoutResponse>,
    config: LayoutConfig,
    latest: Arc<AtomicU64>,
    positions: HashMap<String, Point2D<f32>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LayoutWorker {
    /// Create and start a new layout worker
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_engine(ForceLayout::new(config))
    }

    pub fn with_engine(engine: ForceLayout) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let config = engine.config.clone();

        let worker_latest = latest.clone();
        let handle = thread::spawn(move || {
            run_layout_worker(engine, command_rx, response_tx, worker_latest);
        });

        Self {
            command_tx,
            response_rx,
            config,
            latest,
            positions: HashMap::new(),
            handle: Some(handle),
        }
    }

    /// Pull finished results into the local cache (non-blocking)
    pub fn poll(&mut self) -> bool {
        let mut updated = false;
        while let Ok(response) = self.response_rx.try_recv() {
            updated |= self.accept(response);
        }
        updated
    }

    /// Block until the most recent run has produced positions
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(response) => {
                    if self.accept(response) {
                        return true;
                    }
                },
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Layout worker exited");
                    return false;
                },
            }
        }
    }

    fn accept(&mut self, response: LayoutResponse) -> bool {
        match response {
            LayoutResponse::Positions(run, positions) => {
                if run != self.latest.load(Ordering::SeqCst) {
                    debug!("Dropping positions of superseded layout run {run}");
                    return false;
                }
                self.positions = positions;
                true
            },
        }
    }
}

impl LayoutEngine for LayoutWorker {
    fn stop(&mut self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    fn run(&mut self, store: &GraphStore, params: &Parameters, randomize: bool) {
        let job = LayoutJob::from_store(store, params, &self.config, randomize);
        let run = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if self.command_tx.send(LayoutCommand::Run(run, job)).is_err() {
            warn!("Layout worker is gone, run {run} dropped");
        }
    }

    fn positions(&self) -> HashMap<String, Point2D<f32>> {
        self.positions.clone()
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        let _ = self.command_tx.send(LayoutCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Serve layout commands until shutdown
fn run_layout_worker(
    mut engine: ForceLayout,
    command_rx: Receiver<LayoutCommand>,
    response_tx: Sender<LayoutResponse>,
    latest: Arc<AtomicU64>,
) {
    while let Ok(command) = command_rx.recv() {
        match command {
            LayoutCommand::Run(run, job) => {
                if run != latest.load(Ordering::SeqCst) {
                    continue;
                }
                engine.simulate(&job, || latest.load(Ordering::SeqCst) != run);
                if run == latest.load(Ordering::SeqCst) {
                    let _ = response_tx.send(LayoutResponse::Positions(run, engine.positions()));
                }
            },
            LayoutCommand::Shutdown => return,
        }
    }
}
