//! Property tests for provider selection.

use proptest::prelude::*;
use relay_core::{Credentials, ProviderConfig, ProviderKind, RelayError, RequestedProvider};
use relay_providers::{select_order, SelectionMode};

fn configs(credentialed: [bool; 4], reversed: bool) -> Vec<ProviderConfig> {
    let mut configs: Vec<ProviderConfig> = ProviderKind::ALL
        .iter()
        .zip(credentialed)
        .map(|(kind, has_key)| {
            let credentials = has_key.then(|| match kind {
                ProviderKind::Ups => Credentials::Ups {
                    access_key: "a".into(),
                    user_id: "u".into(),
                    password: "p".into(),
                },
                _ => Credentials::ApiKey("k".into()),
            });
            ProviderConfig::new(*kind, "http://provider.test", credentials)
        })
        .collect();
    if reversed {
        configs.reverse();
    }
    configs
}

proptest! {
    #[test]
    fn auto_order_is_sorted_subset_of_credentialed(
        credentialed in prop::array::uniform4(any::<bool>()),
        reversed in any::<bool>(),
    ) {
        let configs = configs(credentialed, reversed);

        match select_order(&configs, RequestedProvider::Auto) {
            Ok(selection) => {
                prop_assert_eq!(selection.mode, SelectionMode::Auto);
                let priorities: Vec<u8> = selection.order.iter().map(|c| c.priority).collect();
                let mut sorted = priorities.clone();
                sorted.sort_unstable();
                prop_assert_eq!(&priorities, &sorted);

                for config in &selection.order {
                    prop_assert!(config.credentials_present());
                }
                let expected = credentialed.iter().filter(|c| **c).count();
                prop_assert_eq!(selection.order.len(), expected);
            },
            Err(err) => {
                prop_assert!(matches!(err, RelayError::NoProviderConfigured));
                prop_assert!(credentialed.iter().all(|c| !c));
            },
        }
    }

    #[test]
    fn explicit_order_has_exactly_the_requested_provider(
        credentialed in prop::array::uniform4(any::<bool>()),
        index in 0usize..4,
    ) {
        let configs = configs(credentialed, false);
        let kind = ProviderKind::ALL[index];

        match select_order(&configs, RequestedProvider::Explicit(kind)) {
            Ok(selection) => {
                prop_assert!(credentialed[index]);
                prop_assert_eq!(selection.order.len(), 1);
                prop_assert_eq!(selection.order[0].kind, kind);
            },
            Err(err) => {
                prop_assert!(!credentialed[index]);
                let not_configured = matches!(
                    err,
                    RelayError::ProviderNotConfigured { provider } if provider == kind
                );
                prop_assert!(not_configured);
            },
        }
    }
}
