//! Mapping from adapter reason codes to the reasons reported to session
//! callbacks.
//!
//! This is the only place that interprets the adapter's raw codes. Codes
//! added on the adapter side after this build map to
//! [`CloseReason::Unknown`].

use netwatch_domain::{CloseReason, RangingChangeReason};

// ---

/// Map a raw adapter reason code to the public reason.
pub fn close_reason_from_code(code: i32) -> CloseReason {
    // ---
    match RangingChangeReason::from_raw(code) {
        Some(reason) => close_reason(reason),
        None => {
            tracing::debug!(code, "unrecognized ranging reason code");
            CloseReason::Unknown
        }
    }
}

// ---

pub fn close_reason(reason: RangingChangeReason) -> CloseReason {
    // ---
    match reason {
        RangingChangeReason::LocalApi => CloseReason::LocalRequest,
        RangingChangeReason::MaxSessionsReached => CloseReason::MaxSessionsReached,
        RangingChangeReason::ProtocolSpecific => CloseReason::ProtocolSpecificError,
        RangingChangeReason::RemoteRequest => CloseReason::RemoteRequest,
        RangingChangeReason::SystemPolicy => CloseReason::SystemPolicy,
        RangingChangeReason::BadParameters => CloseReason::BadParameters,
        RangingChangeReason::Unknown => CloseReason::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn documented_codes_map_exactly() {
        // ---
        let table = [
            (RangingChangeReason::LocalApi, CloseReason::LocalRequest),
            (
                RangingChangeReason::MaxSessionsReached,
                CloseReason::MaxSessionsReached,
            ),
            (
                RangingChangeReason::ProtocolSpecific,
                CloseReason::ProtocolSpecificError,
            ),
            (RangingChangeReason::RemoteRequest, CloseReason::RemoteRequest),
            (RangingChangeReason::SystemPolicy, CloseReason::SystemPolicy),
            (RangingChangeReason::BadParameters, CloseReason::BadParameters),
            (RangingChangeReason::Unknown, CloseReason::Unknown),
        ];

        for (input, expected) in table {
            assert_eq!(close_reason_from_code(input.as_raw()), expected, "{input:?}");
        }
    }

    // ---

    #[test]
    fn unmapped_codes_fall_back_to_unknown() {
        for code in [-1, 7, 42, i32::MAX] {
            assert_eq!(close_reason_from_code(code), CloseReason::Unknown);
        }
    }
}
