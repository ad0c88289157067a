//! Pure transition-to-intent classification

use serde::{Deserialize, Serialize};
use std::fmt;
use sync_status::StatusCategory;
use tracing::debug;

/// What kind of notification a confirmed transition calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// A new (or newly distinguishable) incident
    Incident,
    /// The previous incident is over
    Resolved,
    /// Light-weight notice that the client is busy syncing
    Transient,
    /// Soft all-clear (caught up, or healthy at startup)
    Ok,
    /// A restart could not be taken or did not stick; operator attention
    /// needed. Emitted by the remediation path, never by the classifier.
    RemediationError,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Incident => "INCIDENT",
            Intent::Resolved => "RESOLVED",
            Intent::Transient => "TRANSIENT",
            Intent::Ok => "OK",
            Intent::RemediationError => "REMEDIATION_ERROR",
        };
        f.write_str(s)
    }
}

/// Classify one confirmed-state transition. Rules are evaluated in order,
/// first match wins; an empty vec means no notification.
///
/// `transient_predecessor` carries the category that preceded the current
/// run of SYNCING so the INCIDENT → SYNCING → OK/INCIDENT bridge stays
/// observable; with resolution emitted on entry to SYNCING it never has to
/// re-fire on exit.
pub fn classify(
    prev: Option<StatusCategory>,
    curr: StatusCategory,
    first_evaluation: bool,
    transient_predecessor: Option<StatusCategory>,
) -> Vec<Intent> {
    use sync_status::StatusCategory::Syncing;

    // Still syncing: nothing to say, the stuck-sync escalation is handled
    // by remediation, not here.
    if prev == Some(Syncing) && curr == Syncing {
        return Vec::new();
    }

    // Entering any incident category is announced. The classifier only runs
    // on confirmed change, so a streak that merely persists yields exactly
    // one of these.
    if curr.is_incident() {
        return vec![Intent::Incident];
    }

    let prev_incident = prev.map_or(false, StatusCategory::is_incident);

    // Incident over, but the client is now catching up
    if prev_incident && curr == Syncing {
        return vec![Intent::Resolved, Intent::Transient];
    }

    if prev_incident && curr == StatusCategory::Ok {
        return vec![Intent::Resolved];
    }

    // Caught up after a syncing run
    if prev == Some(Syncing) && curr == StatusCategory::Ok {
        if let Some(predecessor) = transient_predecessor {
            debug!(predecessor = %predecessor, "syncing run ended in OK");
        }
        return vec![Intent::Ok];
    }

    // Startup confirmation
    if first_evaluation && curr == StatusCategory::Ok {
        return vec![Intent::Ok];
    }

    // Everything else, including OK -> SYNCING: deliberately silent to keep
    // ordinary sync activity from flapping the channels.
    Vec::new()
}
