//! Property tests for request validation and provider naming.

use proptest::prelude::*;
use relay_core::{ProviderKind, RelayError, RequestedProvider, TrackingRequest};

proptest! {
    /// Whitespace-only tracking ids never produce a request.
    #[test]
    fn whitespace_tracking_ids_rejected(raw in "[ \t\r\n]{0,16}") {
        prop_assert!(matches!(TrackingRequest::new(&raw), Err(RelayError::MissingTrackingId)));
    }

    /// Accepted tracking ids are exactly the trimmed input.
    #[test]
    fn accepted_tracking_ids_are_trimmed(
        pad_left in "[ \t]{0,4}",
        code in "[A-Z0-9]{1,24}",
        pad_right in "[ \t]{0,4}",
    ) {
        let raw = format!("{pad_left}{code}{pad_right}");
        let request = TrackingRequest::new(&raw).unwrap();
        prop_assert_eq!(request.tracking_id, code);
    }

    /// Every provider name survives a display/parse cycle in any casing.
    #[test]
    fn provider_names_parse_case_insensitively(index in 0usize..4, upper in any::<bool>()) {
        let kind = ProviderKind::ALL[index];
        let name = if upper { kind.as_str().to_ascii_uppercase() } else { kind.to_string() };
        prop_assert_eq!(name.parse::<ProviderKind>().unwrap(), kind);
        prop_assert_eq!(
            name.parse::<RequestedProvider>().unwrap(),
            RequestedProvider::Explicit(kind)
        );
    }
}
