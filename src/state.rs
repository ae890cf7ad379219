use crate::{
    TOKEN_PRICE,
    TOKEN_SUB_UNITS,
    TOKENS_PER_NFT,
    chain::WalletSession,
};

/// The single state-mutating operation currently awaiting confirmation.
/// At most one is ever in flight; the controller refuses to start another
/// until this returns to `None`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PendingAction {
    #[default]
    None,
    Minting,
    Claiming,
    Withdrawing,
}

impl PendingAction {
    pub fn label(self) -> &'static str {
        match self {
            PendingAction::None => "idle",
            PendingAction::Minting => "minting",
            PendingAction::Claiming => "claiming",
            PendingAction::Withdrawing => "withdrawing",
        }
    }
}

/// Read-only mirror of on-chain token state, in sub-units. Always treated
/// as stale until the next refresh.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TokenAccounting {
    pub balance: u128,
    pub total_minted: u128,
}

/// The one action the UI offers in the current render state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Affordance {
    Connect,
    InProgress(PendingAction),
    Withdraw,
    Claim { claimable: u64 },
    Mint,
}

/// Derive the single affordance to present. Precedence: an in-flight
/// action suppresses everything; the contract owner always sees withdraw,
/// even with claimable tokens outstanding; holders with unclaimed NFTs see
/// claim; everyone else sees the mint form. Disconnected sessions only get
/// the connect affordance.
pub fn select_affordance(
    session: Option<&WalletSession>,
    pending: PendingAction,
    claimable: u64,
) -> Affordance {
    let Some(session) = session else {
        return Affordance::Connect;
    };
    if pending != PendingAction::None {
        return Affordance::InProgress(pending);
    }
    if session.is_owner {
        return Affordance::Withdraw;
    }
    if claimable > 0 {
        return Affordance::Claim { claimable };
    }
    Affordance::Mint
}

/// Whole token units the claim affordance is labelled with.
pub fn claim_units(claimable: u64) -> u64 {
    claimable.saturating_mul(TOKENS_PER_NFT)
}

/// Parse the mint form input. The affordance is enabled only when the
/// input is a positive integer.
pub fn parse_mint_amount(input: &str) -> Option<u64> {
    match input.trim().parse::<u64>() {
        Ok(amount) if amount > 0 => Some(amount),
        _ => None,
    }
}

/// Payment forwarded with a mint, in base-asset sub-units. Exact integer
/// scaling; `None` means the request overflows and must not be submitted.
pub fn mint_payment(amount: u64) -> Option<u64> {
    amount.checked_mul(TOKEN_PRICE)
}

/// Render a sub-unit amount as whole tokens with up to three decimals.
pub fn format_whole_tokens(sub_units: u128) -> String {
    let whole = sub_units / TOKEN_SUB_UNITS;
    let millis = (sub_units % TOKEN_SUB_UNITS) / (TOKEN_SUB_UNITS / 1_000);
    if millis == 0 {
        format!("{whole}")
    } else {
        format!("{whole}.{millis:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_input_rejects_zero_and_garbage() {
        assert_eq!(parse_mint_amount("0"), None);
        assert_eq!(parse_mint_amount(""), None);
        assert_eq!(parse_mint_amount("-3"), None);
        assert_eq!(parse_mint_amount("ten"), None);
        assert_eq!(parse_mint_amount("1"), Some(1));
        assert_eq!(parse_mint_amount(" 42 "), Some(42));
    }

    #[test]
    fn payment_scales_exactly_and_checks_overflow() {
        assert_eq!(mint_payment(1), Some(TOKEN_PRICE));
        assert_eq!(mint_payment(10_000), Some(10_000 * TOKEN_PRICE));
        assert_eq!(mint_payment(u64::MAX), None);
    }

    #[test]
    fn whole_token_formatting() {
        assert_eq!(format_whole_tokens(0), "0");
        assert_eq!(format_whole_tokens(TOKEN_SUB_UNITS), "1");
        assert_eq!(format_whole_tokens(TOKEN_SUB_UNITS / 2), "0.500");
        assert_eq!(format_whole_tokens(10 * TOKEN_SUB_UNITS + 1_000_000), "10.001");
    }
}
