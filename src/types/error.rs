use thiserror::Error;

/// Error raised when one of the domain value grammars rejects its input.
#[derive(Error, Debug)]
pub enum GrammarError {
    /// A virtual function descriptor string could not be parsed
    #[error("invalid VF descriptor: {details}")]
    Vf {
        /// What was wrong with the descriptor
        details: String,
    },

    /// A qdisc or tfilter string could not be parsed
    #[error("invalid traffic control spec: {details}")]
    Tc {
        /// What was wrong with the spec
        details: String,
    },
}

impl GrammarError {
    pub(crate) fn vf(details: impl Into<String>) -> Self {
        GrammarError::Vf {
            details: details.into(),
        }
    }

    pub(crate) fn tc(details: impl Into<String>) -> Self {
        GrammarError::Tc {
            details: details.into(),
        }
    }
}
