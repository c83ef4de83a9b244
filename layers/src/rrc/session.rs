//! Per-UE Session Registry
//!
//! Maps each C-RNTI to the SRB handles bound for that UE. Lookups run
//! concurrently; setup and removal of one RNTI are serialized by the shard lock
//! of its entry, so unrelated UEs never wait on each other.
//!
//! Each session also carries a delivery gate. A send holds a [`Delivery`] for
//! the whole time it is delivering, and `remove` closes the gate and waits for
//! those deliveries to finish before the session disappears. A handler that
//! removes the session it is currently receiving on gets `SessionBusy`, since
//! waiting for itself would never return.

use super::enb_sap::{CompleteSetupUeParameters, SetupUeParameters};
use crate::SapError;
use common::types::Rnti;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tracing::{debug, info};

/// Transport handles bound to one UE
#[derive(Debug, Clone)]
pub struct Session {
    pub rnti: Rnti,
    /// Handles supplied by the eNB RRC at setup
    pub setup: SetupUeParameters,
    /// Receive-side handles, once the setup has been completed
    pub complete: Option<CompleteSetupUeParameters>,
    gate: Arc<DeliveryGate>,
}

#[derive(Debug, Default)]
struct GateState {
    closed: bool,
    /// Threads currently delivering, one entry per nested delivery
    in_flight: Vec<ThreadId>,
}

#[derive(Debug, Default)]
struct DeliveryGate {
    state: Mutex<GateState>,
    idle: Condvar,
}

impl DeliveryGate {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(self: &Arc<Self>, rnti: Rnti) -> Result<Delivery, SapError> {
        let mut state = self.lock();
        if state.closed {
            return Err(SapError::UnknownSession(rnti));
        }
        state.in_flight.push(thread::current().id());
        Ok(Delivery {
            gate: self.clone(),
            _thread_bound: PhantomData,
        })
    }

    /// Close the gate and wait until no delivery is in flight
    fn close(&self, rnti: Rnti) -> Result<(), SapError> {
        let mut state = self.lock();
        if state.closed {
            return Err(SapError::UnknownSession(rnti));
        }
        if state.in_flight.contains(&thread::current().id()) {
            return Err(SapError::SessionBusy(rnti));
        }
        state.closed = true;
        while !state.in_flight.is_empty() {
            debug!("RNTI {}: waiting for {} deliveries before removal", rnti, state.in_flight.len());
            state = self.idle.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        Ok(())
    }
}

/// Keeps a session alive while a message is being delivered to it
///
/// Bound to the thread that entered, which is the thread it is tracked under.
#[derive(Debug)]
pub struct Delivery {
    gate: Arc<DeliveryGate>,
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for Delivery {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        let current = thread::current().id();
        if let Some(pos) = state.in_flight.iter().rposition(|id| *id == current) {
            state.in_flight.swap_remove(pos);
        }
        if state.in_flight.is_empty() {
            self.gate.idle.notify_all();
        }
    }
}

/// Registry of live sessions keyed by RNTI
pub struct SessionRegistry {
    sessions: DashMap<Rnti, Session>,
    live: AtomicUsize,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            live: AtomicUsize::new(0),
            max_sessions,
        }
    }

    /// Open a session for `rnti`
    pub fn setup(&self, rnti: Rnti, params: SetupUeParameters) -> Result<(), SapError> {
        match self.sessions.entry(rnti) {
            Entry::Occupied(_) => Err(SapError::SessionExists(rnti)),
            Entry::Vacant(slot) => {
                // Reserve a slot while the entry is held; len() would need every shard
                let max = self.max_sessions;
                self.live
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                        (n < max).then_some(n + 1)
                    })
                    .map_err(|_| SapError::SessionLimitReached(max))?;

                slot.insert(Session {
                    rnti,
                    setup: params,
                    complete: None,
                    gate: Arc::default(),
                });
                info!("Session set up for RNTI {}", rnti);
                Ok(())
            }
        }
    }

    /// Store the receive-side handles of an existing session
    pub fn complete(&self, rnti: Rnti, params: CompleteSetupUeParameters) -> Result<(), SapError> {
        let mut session = self
            .sessions
            .get_mut(&rnti)
            .ok_or(SapError::UnknownSession(rnti))?;
        session.complete = Some(params);
        debug!("Session setup completed for RNTI {}", rnti);
        Ok(())
    }

    /// Start a delivery to `rnti`
    ///
    /// The session cannot be removed until the returned guard is dropped. No
    /// registry lock is held by the guard, so handlers may re-enter the registry.
    pub fn enter(&self, rnti: Rnti) -> Result<Delivery, SapError> {
        let gate = self
            .sessions
            .get(&rnti)
            .map(|session| session.gate.clone())
            .ok_or(SapError::UnknownSession(rnti))?;
        gate.enter(rnti)
    }

    /// Close the session for `rnti`, returning its handles
    ///
    /// Blocks until deliveries already in flight to `rnti` have returned; new
    /// deliveries fail with `UnknownSession` from the moment removal starts.
    pub fn remove(&self, rnti: Rnti) -> Result<Session, SapError> {
        let gate = self
            .sessions
            .get(&rnti)
            .map(|session| session.gate.clone())
            .ok_or(SapError::UnknownSession(rnti))?;
        gate.close(rnti)?;

        let (_, session) = self
            .sessions
            .remove(&rnti)
            .ok_or(SapError::UnknownSession(rnti))?;
        self.live.fetch_sub(1, Ordering::AcqRel);
        info!("Session removed for RNTI {}", rnti);
        Ok(session)
    }

    /// Snapshot of a session's handles
    ///
    /// The shard lock is released on return, so callers may deliver through the
    /// handles and re-enter the registry without deadlocking.
    pub fn get(&self, rnti: Rnti) -> Result<Session, SapError> {
        self.sessions
            .get(&rnti)
            .map(|session| session.value().clone())
            .ok_or(SapError::UnknownSession(rnti))
    }

    pub fn contains(&self, rnti: Rnti) -> bool {
        self.sessions.contains_key(&rnti)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// RNTIs of all live sessions, in ascending order
    pub fn rntis(&self) -> Vec<Rnti> {
        let mut rntis: Vec<Rnti> = self.sessions.iter().map(|entry| *entry.key()).collect();
        rntis.sort();
        rntis
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(usize::from(u16::MAX))
    }
}
