use thiserror::Error;

/// Rejected creature topology.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CreatureError {
    #[error("no chain named '{name}'")]
    UnknownChain { name: String },

    #[error("chain '{name}' is declared twice")]
    DuplicateChain { name: String },

    #[error("chain '{chain}' attaches to '{parent}', which is not declared before it")]
    UnknownParentChain { chain: String, parent: String },

    #[error("chain '{name}' has no joints")]
    EmptyChain { name: String },

    #[error("joint {index} of chain '{chain}' has invalid length {length}")]
    InvalidLength {
        chain: String,
        index: usize,
        length: f32,
    },

    #[error("chain '{name}' cannot be its own gait partner")]
    SelfPartner { name: String },
}
