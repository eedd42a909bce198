//! Versão da biblioteca, exposta para os consumidores do pipeline.

use serde::{Deserialize, Serialize};

/// Versão semântica do crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// A versão corrente, extraída dos metadados do pacote.
    pub fn current() -> Self {
        let mut parts = env!("CARGO_PKG_VERSION").split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .unwrap_or(0u32)
        };
        Self {
            major: next(),
            minor: next(),
            patch: next(),
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versao_corrente() {
        let v = Version::current();
        assert_eq!(v.to_string(), env!("CARGO_PKG_VERSION"));
    }
}
