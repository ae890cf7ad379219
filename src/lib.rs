pub mod chain;
pub mod client;
pub mod deployment;
pub mod state;
pub mod test_helpers;
pub mod ui;
pub mod wallets;

pub mod token_types {
    use fuels::macros::abigen;

    abigen!(Contract(
        name = "DevToken",
        abi = "sway-projects/dev-token/out/release/dev-token-abi.json"
    ));
}

pub mod nft_types {
    use fuels::macros::abigen;

    abigen!(Contract(
        name = "DevsNft",
        abi = "sway-projects/devs-nft/out/release/devs-nft-abi.json"
    ));
}

/// Chain id of the one network this build talks to (the public test network).
pub const SUPPORTED_CHAIN_ID: u64 = 0;

/// Sub-units per whole token (Fuel's 9-decimal convention).
pub const TOKEN_SUB_UNITS: u128 = 1_000_000_000;

/// Price of one whole token in base-asset sub-units: 0.001 units.
pub const TOKEN_PRICE: u64 = 1_000_000;

/// Whole tokens granted per unclaimed NFT.
pub const TOKENS_PER_NFT: u64 = 10;

/// Hard cap on whole tokens ever minted, pre-scaling.
pub const TOKEN_CAPACITY: u64 = 10_000;

pub const TOKEN_BIN_CANDIDATES: [&str; 1] =
    ["./sway-projects/dev-token/out/release/dev-token.bin"];
