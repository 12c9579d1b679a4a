// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Chains circuits can be deployed to.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    pub id: u64,
    pub name: &'static str,
}

const KNOWN_CHAINS: &[Chain] = &[
    Chain { id: 1, name: "Ethereum" },
    Chain { id: 10, name: "OP Mainnet" },
    Chain { id: 56, name: "BNB Smart Chain" },
    Chain { id: 100, name: "Gnosis" },
    Chain { id: 137, name: "Polygon" },
    Chain { id: 250, name: "Fantom" },
    Chain { id: 324, name: "zkSync Era" },
    Chain { id: 1101, name: "Polygon zkEVM" },
    Chain { id: 8453, name: "Base" },
    Chain { id: 17000, name: "Holesky" },
    Chain { id: 42161, name: "Arbitrum One" },
    Chain { id: 42220, name: "Celo" },
    Chain { id: 43114, name: "Avalanche" },
    Chain { id: 59144, name: "Linea" },
    Chain { id: 80002, name: "Polygon Amoy" },
    Chain { id: 84532, name: "Base Sepolia" },
    Chain { id: 421614, name: "Arbitrum Sepolia" },
    Chain { id: 534352, name: "Scroll" },
    Chain { id: 11155111, name: "Sepolia" },
    Chain { id: 11155420, name: "OP Sepolia" },
];

pub fn find_chain(id: u64) -> Option<&'static Chain> {
    KNOWN_CHAINS.iter().find(|chain| chain.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_chains() {
        assert_eq!(find_chain(1).map(|c| c.name), Some("Ethereum"));
        assert_eq!(find_chain(11155111).map(|c| c.name), Some("Sepolia"));
    }

    #[test]
    fn test_unknown_chain() {
        assert_eq!(find_chain(0), None);
        assert_eq!(find_chain(999_999_999), None);
    }

    #[test]
    fn test_chain_ids_are_unique() {
        for (i, chain) in KNOWN_CHAINS.iter().enumerate() {
            assert!(KNOWN_CHAINS[i + 1..].iter().all(|other| other.id != chain.id));
        }
    }
}
