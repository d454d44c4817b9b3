use veilcount_common::crypto::to_hex_prefixed;

use crate::state::CounterState;

// Actions the user can trigger in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Decrypt,
    ChooseValue,
    Encrypt,
    // Only offered once a pending encryption exists
    SubmitIncrement,
}

pub fn available_actions(state: &CounterState) -> Vec<Action> {
    let mut actions = vec![Action::Decrypt, Action::ChooseValue, Action::Encrypt];
    if state.pending.is_some() {
        actions.push(Action::SubmitIncrement);
    }
    actions
}

// Render the component state as display lines, the textual equivalent
// of the rendered surface
pub fn render(state: &CounterState) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Current encrypted counter value: {}",
        state.handle
    ));
    lines.push(format!("Decrypted counter value is: {}", state.decrypted));
    lines.push(format!("You chose: {}", state.chosen_value));

    if let Some(pending) = &state.pending {
        lines.push(format!("This is an encryption of {}:", state.chosen_value));
        let handle_hex = pending
            .primary_handle()
            .map(|h| h.to_hex())
            .unwrap_or_default();
        lines.push(format!("  Handle: {}", handle_hex));
        lines.push(format!(
            "  Input Proof: {}",
            to_hex_prefixed(&pending.input_proof)
        ));
        lines.push("[Increment Counter by Encrypted Amount]".to_owned());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CounterEvent, Decrypted};
    use veilcount_common::{
        api::EncryptedInput,
        crypto::{CiphertextHandle, HANDLE_SIZE},
    };

    #[test]
    fn test_placeholder_until_decrypted() {
        let state = CounterState::new();
        let lines = render(&state);
        assert!(lines.contains(&"Decrypted counter value is: ???".to_owned()));
    }

    #[test]
    fn test_handle_rendered_as_decimal() {
        let mut state = CounterState::new();
        state.apply(CounterEvent::HandleFetched(
            CiphertextHandle::from_dec_str("42").unwrap(),
        ));
        let lines = render(&state);
        assert!(lines.contains(&"Current encrypted counter value: 42".to_owned()));
    }

    #[test]
    fn test_submit_action_gated_on_pending_encryption() {
        let mut state = CounterState::new();
        assert!(!available_actions(&state).contains(&Action::SubmitIncrement));
        assert!(!render(&state)
            .iter()
            .any(|l| l.contains("Increment Counter")));

        state.apply(CounterEvent::EncryptionReady(EncryptedInput {
            handles: vec![CiphertextHandle::new([5; HANDLE_SIZE])],
            input_proof: vec![0xaa, 0xbb],
        }));
        assert!(available_actions(&state).contains(&Action::SubmitIncrement));

        let lines = render(&state);
        assert!(lines.iter().any(|l| l.contains("Increment Counter")));
        assert!(lines.iter().any(|l| l.contains("Input Proof: 0xaabb")));
    }

    #[test]
    fn test_decrypted_value_rendered() {
        let mut state = CounterState::new();
        state.apply(CounterEvent::DecryptSucceeded(7));
        assert_eq!(state.decrypted, Decrypted::Value(7));
        let lines = render(&state);
        assert!(lines.contains(&"Decrypted counter value is: 7".to_owned()));
    }
}
