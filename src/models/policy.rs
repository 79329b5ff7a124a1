use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    Deposit,
    Cancellation,
    Rescheduling,
    NoShow,
}

/// Which policies to generate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    #[default]
    All,
    Deposit,
    Cancellation,
    Rescheduling,
    NoShow,
}

impl PolicyScope {
    pub fn includes(&self, policy: PolicyType) -> bool {
        match self {
            PolicyScope::All => true,
            PolicyScope::Deposit => policy == PolicyType::Deposit,
            PolicyScope::Cancellation => policy == PolicyType::Cancellation,
            PolicyScope::Rescheduling => policy == PolicyType::Rescheduling,
            PolicyScope::NoShow => policy == PolicyType::NoShow,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    #[serde(rename = "type")]
    pub kind: PolicyType,
    pub policy: String,
}
