//! Per-product probe outcome and the knobs that bound a probe.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

/// How a size's availability is decided when other attributes (colour, cut,
/// ...) must also be selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityMode {
    /// A size counts as available if any probed combination of the other
    /// attributes makes it purchasable.
    #[default]
    Union,
    /// Other attributes are set to their first option once; each size is
    /// judged only under that combination.
    Simple,
}

impl fmt::Display for AvailabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityMode::Union => write!(f, "union"),
            AvailabilityMode::Simple => write!(f, "simple"),
        }
    }
}

impl FromStr for AvailabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "union" => Ok(AvailabilityMode::Union),
            "simple" => Ok(AvailabilityMode::Simple),
            other => Err(format!(
                "unknown availability mode {other:?} (expected \"union\" or \"simple\")"
            )),
        }
    }
}

/// Bounds and timings for a single product probe.
///
/// The search bounds (`max_options_per_group`, `max_pair_attempts`) keep the
/// interactive probe tractable: every trial is a real page interaction
/// followed by a settle wait.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub mode: AvailabilityMode,
    /// Cap on options enumerated per non-size attribute group.
    pub max_options_per_group: usize,
    /// Pairwise combinations tried across the whole size-group probe.
    pub max_pair_attempts: usize,
    /// Option captions longer than this (in chars) are not treated as options.
    pub max_option_chars: usize,
    /// Elements inspected after a fallback size heading.
    pub fallback_option_limit: usize,
    /// Wait after a selection before the page state is judged.
    pub settle: Duration,
    /// Wait after navigation for storefront components to initialise.
    pub page_init_wait: Duration,
    /// How long to wait for a variant widget to appear after navigation.
    pub variant_wait: Duration,
    pub interaction_timeout: Duration,
    pub consent_timeout: Duration,
    pub consent_settle: Duration,
    pub navigation_timeout: Duration,
    /// Pause between products.
    pub inter_product_delay: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            mode: AvailabilityMode::Union,
            max_options_per_group: 8,
            max_pair_attempts: 40,
            max_option_chars: 18,
            fallback_option_limit: 20,
            settle: Duration::from_millis(300),
            page_init_wait: Duration::from_millis(500),
            variant_wait: Duration::from_secs(5),
            interaction_timeout: Duration::from_secs(2),
            consent_timeout: Duration::from_millis(1500),
            consent_settle: Duration::from_millis(200),
            navigation_timeout: Duration::from_secs(30),
            inter_product_delay: Duration::from_millis(700),
        }
    }
}

/// Terminal state of a product probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ProbeStatus {
    Ok,
    /// No variant group labelled as size was found on the page.
    NoSizeGroup,
    /// The probe was aborted; carries the fault category (e.g. `"timeout"`).
    Error(String),
}

impl ProbeStatus {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, ProbeStatus::Error(_))
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Ok => write!(f, "ok"),
            ProbeStatus::NoSizeGroup => write!(f, "no_size_group"),
            ProbeStatus::Error(cause) => write!(f, "error:{cause}"),
        }
    }
}

impl From<ProbeStatus> for String {
    fn from(status: ProbeStatus) -> Self {
        status.to_string()
    }
}

/// Ordered, de-duplicated size labels with their availability.
///
/// Labels keep first-seen order. Recording a label twice ORs the
/// availability, so a size proven purchasable once stays purchasable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeTally {
    entries: Vec<(String, bool)>,
}

impl SizeTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `label` (trimmed). Blank labels are ignored.
    pub fn record(&mut self, label: &str, available: bool) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, seen_available)) => *seen_available |= available,
            None => self.entries.push((label.to_string(), available)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_available(&self, label: &str) -> bool {
        self.entries
            .iter()
            .any(|(l, available)| l == label.trim() && *available)
    }

    /// Split into `(sizes_all, sizes_avail)`, both in first-seen order.
    #[must_use]
    pub fn into_lists(self) -> (Vec<String>, Vec<String>) {
        let avail = self
            .entries
            .iter()
            .filter(|(_, available)| *available)
            .map(|(label, _)| label.clone())
            .collect();
        let all = self.entries.into_iter().map(|(label, _)| label).collect();
        (all, avail)
    }
}

/// One output row per product per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductProbeResult {
    /// Numeric product identifier, empty when unresolved.
    pub product_id: String,
    pub url: String,
    /// Product title, empty when unresolved.
    pub name: String,
    pub sizes_all: Vec<String>,
    pub sizes_avail: Vec<String>,
    /// Number of available sizes; `None` when the probe failed outright.
    pub size_count: Option<usize>,
    pub status: ProbeStatus,
}

impl ProductProbeResult {
    #[must_use]
    pub fn ok(product_id: String, url: &str, name: String, tally: SizeTally) -> Self {
        let (sizes_all, sizes_avail) = tally.into_lists();
        Self {
            product_id,
            url: url.to_string(),
            name,
            size_count: Some(sizes_avail.len()),
            sizes_all,
            sizes_avail,
            status: ProbeStatus::Ok,
        }
    }

    #[must_use]
    pub fn no_size_group(product_id: String, url: &str, name: String) -> Self {
        Self {
            product_id,
            url: url.to_string(),
            name,
            sizes_all: Vec::new(),
            sizes_avail: Vec::new(),
            size_count: Some(0),
            status: ProbeStatus::NoSizeGroup,
        }
    }

    /// A probe that was aborted by a fault. Identity and name resolved before
    /// the fault are kept.
    #[must_use]
    pub fn failed(product_id: String, url: &str, name: String, cause: &str) -> Self {
        Self {
            product_id,
            url: url.to_string(),
            name,
            sizes_all: Vec::new(),
            sizes_avail: Vec::new(),
            size_count: None,
            status: ProbeStatus::Error(cause.to_string()),
        }
    }
}
