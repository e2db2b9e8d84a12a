//! Single-flight guard for map-load requests.

/// Whether a map-load request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    /// No request outstanding; a new one may be issued.
    #[default]
    Idle,
    /// A request has been issued and has not completed.
    InFlight,
}

impl FlightState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightState::Idle => "idle",
            FlightState::InFlight => "in-flight",
        }
    }
}

/// Admits at most one request at a time.
///
/// Never blocks and never queues: a second `try_acquire` while busy simply
/// returns `false`.
///
/// # Example
///
/// ```
/// use levelswitch::switch::SingleFlightGuard;
///
/// let mut guard = SingleFlightGuard::new();
/// assert!(guard.try_acquire());
/// assert!(!guard.try_acquire());
/// guard.release();
/// assert!(guard.try_acquire());
/// ```
#[derive(Debug, Default)]
pub struct SingleFlightGuard {
    state: FlightState,
}

impl SingleFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a request as outstanding.
    ///
    /// Returns `true` iff the guard was idle.
    pub fn try_acquire(&mut self) -> bool {
        match self.state {
            FlightState::Idle => {
                self.state = FlightState::InFlight;
                true
            }
            FlightState::InFlight => false,
        }
    }

    /// Mark the guard idle, whatever its current state.
    pub fn release(&mut self) {
        self.state = FlightState::Idle;
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == FlightState::InFlight
    }
}
