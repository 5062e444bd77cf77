//! benefits-chat library exports

use std::fmt;
use std::str::FromStr;

pub mod core;
pub mod inference;
pub mod store;

#[cfg(test)]
pub mod test_support;

/// The closed set of inference backends the adapter knows how to shape
/// payloads for. Each variant owns one request/response layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    Claude,
    Titan,
    Llama,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Claude, Provider::Titan, Provider::Llama];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::Titan => "titan",
            Provider::Llama => "llama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = inference::AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(Provider::Claude),
            "titan" => Ok(Provider::Titan),
            "llama" => Ok(Provider::Llama),
            other => Err(inference::AdapterError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_unknown_provider_str_is_unsupported() {
        let err = "mistral".parse::<Provider>().unwrap_err();
        assert!(matches!(err, inference::AdapterError::UnsupportedProvider(ref id) if id == "mistral"));
    }
}
