//! Terminal state classification for streamed preview responses.

use crate::types::PreviewResponse;

/// True once the backend reports the evaluation finished (`Done`) or failed (`Error`).
///
/// This is the only signal used to stop observing a preview stream; the payload is ignored.
pub fn is_terminal(response: &PreviewResponse) -> bool {
    response.state.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PreviewState;
    use proptest::prelude::*;

    fn any_payload() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            ".{0,16}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|m| {
                    serde_json::Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    #[test]
    fn classifies_each_state() {
        assert!(!is_terminal(&PreviewResponse::running(serde_json::Value::Null)));
        assert!(is_terminal(&PreviewResponse::done(serde_json::Value::Null)));
        assert!(is_terminal(&PreviewResponse::error(serde_json::Value::Null)));
    }

    proptest! {
        #[test]
        fn payload_never_affects_the_result(payload in any_payload()) {
            prop_assert!(!is_terminal(&PreviewResponse::new(PreviewState::Running, payload.clone())));
            prop_assert!(is_terminal(&PreviewResponse::new(PreviewState::Done, payload.clone())));
            prop_assert!(is_terminal(&PreviewResponse::new(PreviewState::Error, payload)));
        }
    }
}
