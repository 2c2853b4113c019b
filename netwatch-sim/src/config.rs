use netwatch_domain::Network;

// ---------------------------------------------------------------------------
// ScenarioConfig
// ---------------------------------------------------------------------------

/// Shape of a generated network event sequence.
///
/// All fields default to a short, quiet scenario: the network comes up,
/// nothing flaps, and it stays up.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    // ---
    /// Network the events describe.
    pub network: Network,

    /// Interface name reported in the initial link properties.
    pub interface: String,

    /// Number of events after the initial bring-up burst.
    pub steps: usize,

    /// Probability `[0.0, 1.0]` that a step repeats the previous
    /// capabilities verbatim (exercises deduplication).
    pub duplicate_percent: f64,

    /// Probability `[0.0, 1.0]` that a step toggles suspend / resume.
    pub suspend_percent: f64,

    /// Probability `[0.0, 1.0]` that a step flips the blocked status.
    pub blocked_percent: f64,

    /// End the sequence with a loss of the network.
    pub lose_at_end: bool,

    /// RNG seed for reproducible sequences. `None` = random.
    pub seed: Option<u64>,
}

// ---

impl Default for ScenarioConfig {
    fn default() -> Self {
        // ---
        Self {
            network: Network(100),
            interface: "rmnet0".into(),
            steps: 0,
            duplicate_percent: 0.0,
            suspend_percent: 0.0,
            blocked_percent: 0.0,
            lose_at_end: false,
            seed: None,
        }
    }
}

// ---

impl ScenarioConfig {
    // ---
    /// Bring-up only.
    pub fn steady() -> Self {
        Self::default()
    }

    // ---

    /// Busy cellular link: frequent duplicates, suspends, and blocked flips,
    /// lost at the end.
    pub fn flapping(steps: usize) -> Self {
        // ---
        Self {
            steps,
            duplicate_percent: 0.25,
            suspend_percent: 0.15,
            blocked_percent: 0.10,
            lose_at_end: true,
            ..Default::default()
        }
    }
}
