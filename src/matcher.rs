// 🔍 Event Matcher - decide whether two listings are the same event
// Exact date + approximate (edit distance) city and venue.

use crate::normalize::normalize;
use crate::record::Record;

/// Default edit-distance tolerance for city and venue comparison keys.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

// ============================================================================
// MATCH OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// Comparison keys are identical
    Exact,

    /// Keys differ but are within the edit-distance tolerance
    Approximate { distance: usize },

    /// Keys are further apart than the tolerance
    Mismatch { distance: usize },
}

impl FieldMatch {
    pub fn is_match(&self) -> bool {
        !matches!(self, FieldMatch::Mismatch { .. })
    }
}

/// Per-field breakdown of a match decision (used for debug logging).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub same_date: bool,
    pub city: FieldMatch,
    pub venue: FieldMatch,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        self.same_date && self.city.is_match() && self.venue.is_match()
    }

    pub fn reason(&self) -> String {
        format!(
            "date {} | city {:?} | venue {:?}",
            if self.same_date { "equal" } else { "differs" },
            self.city,
            self.venue
        )
    }
}

// ============================================================================
// EVENT MATCHER
// ============================================================================

#[derive(Debug, Clone)]
pub struct EventMatcher {
    /// Largest Levenshtein distance still accepted for city/venue (default: 2)
    pub max_edit_distance: usize,
}

impl EventMatcher {
    pub fn new() -> Self {
        EventMatcher {
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
        }
    }

    pub fn with_max_edit_distance(max_edit_distance: usize) -> Self {
        EventMatcher { max_edit_distance }
    }

    /// True iff both records are on the same date and their city and venue
    /// keys are equal or within `max_edit_distance` edits.
    ///
    /// Reflexive and symmetric, NOT transitive: A~B and B~C does not imply A~C.
    pub fn same_event(&self, a: &Record, b: &Record) -> bool {
        // Cheap rejection before any distance work
        if a.date != b.date {
            return false;
        }
        self.explain(a, b).is_match()
    }

    pub fn explain(&self, a: &Record, b: &Record) -> MatchOutcome {
        MatchOutcome {
            same_date: a.date == b.date,
            city: self.compare_field(&a.city, &b.city),
            venue: self.compare_field(&a.venue, &b.venue),
        }
    }

    fn compare_field(&self, a: &str, b: &str) -> FieldMatch {
        let key_a = normalize(a);
        let key_b = normalize(b);

        if key_a == key_b {
            return FieldMatch::Exact;
        }

        let distance = levenshtein(&key_a, &key_b);
        if distance <= self.max_edit_distance {
            FieldMatch::Approximate { distance }
        } else {
            FieldMatch::Mismatch { distance }
        }
    }
}

impl Default for EventMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// `same_event` with the default tolerance.
pub fn same_event(a: &Record, b: &Record) -> bool {
    EventMatcher::new().same_event(a, b)
}

/// Classic Levenshtein distance (unit insert/delete/substitute) over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ============================================================================
// TESTS
// ============================================================================
