use std::fmt::{Display, Error, Formatter};
use veilcount_common::{
    api::EncryptedInput,
    crypto::{Address, CiphertextHandle},
};

// Decrypted counter value as shown to the user.
// Unknown until a decrypt action succeeds, and reset to Unknown the
// instant a new handle is observed: handle and plaintext are never
// guaranteed consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decrypted {
    #[default]
    Unknown,
    Value(u8),
    Error,
}

impl Display for Decrypted {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Decrypted::Unknown => write!(f, "???"),
            Decrypted::Value(v) => write!(f, "{}", v),
            Decrypted::Error => write!(f, "Error"),
        }
    }
}

// Whole component state behind one reducer.
// Every mutation goes through apply(); independent async flows never
// write fields directly.
#[derive(Debug, Clone, Default)]
pub struct CounterState {
    // Zero until the deployment manifest resolves
    pub contract_address: Address,
    // Current encrypted handle mirrored from the chain
    pub handle: CiphertextHandle,
    pub decrypted: Decrypted,
    // Value confirmed from the numeric input
    pub chosen_value: u8,
    // Encryption produced locally, awaiting submission
    pub pending: Option<EncryptedInput>,
    // Submit guard: a second submission while set is silently dropped
    pub in_flight: bool,
}

#[derive(Debug, Clone)]
pub enum CounterEvent {
    ContractResolved(Address),
    HandleFetched(CiphertextHandle),
    ValueChosen(u8),
    EncryptionReady(EncryptedInput),
    DecryptSucceeded(u8),
    DecryptFailed,
    SubmitStarted,
    // Clears the in-flight guard on any completion branch.
    // The pending encryption is intentionally kept: the source behavior
    // leaves the submit action available with the same payload.
    SubmitSettled,
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    // Apply one event, returning whether a transition happened.
    // The only rejected event is SubmitStarted while already in flight.
    pub fn apply(&mut self, event: CounterEvent) -> bool {
        match event {
            CounterEvent::ContractResolved(address) => {
                self.contract_address = address;
            }
            CounterEvent::HandleFetched(handle) => {
                self.handle = handle;
                // Any prior decryption is stale now
                self.decrypted = Decrypted::Unknown;
            }
            CounterEvent::ValueChosen(value) => {
                self.chosen_value = value;
            }
            CounterEvent::EncryptionReady(input) => {
                self.pending = Some(input);
            }
            CounterEvent::DecryptSucceeded(value) => {
                self.decrypted = Decrypted::Value(value);
            }
            CounterEvent::DecryptFailed => {
                self.decrypted = Decrypted::Error;
            }
            CounterEvent::SubmitStarted => {
                if self.in_flight {
                    return false;
                }
                self.in_flight = true;
            }
            CounterEvent::SubmitSettled => {
                self.in_flight = false;
            }
        }
        true
    }

    // The component is not ready while the address is the zero sentinel
    pub fn is_ready(&self) -> bool {
        !self.contract_address.is_zero()
    }

    pub fn can_submit(&self) -> bool {
        self.pending.is_some() && !self.in_flight
    }
}
