use anyhow::{anyhow, Result};
use ethers::types::U256;

/// Format a base-unit quantity as a whole-token decimal string.
pub fn format_tokens(base_units: U256) -> String {
    ethers::utils::format_units(base_units, "ether").unwrap_or_else(|_| "0.0".to_string())
}

/// Convert an ETH amount (as f64) to wei.
///
/// # Errors
/// Returns an error if the conversion fails (e.g., negative values, overflow)
pub fn eth_to_wei(eth: f64) -> Result<U256> {
    if eth < 0.0 {
        return Err(anyhow!("ETH amount cannot be negative: {}", eth));
    }
    ethers::utils::parse_units(eth, "ether")
        .map(|pu| pu.into())
        .map_err(|e| anyhow!("Failed to convert {} ETH to wei: {}", eth, e))
}

/// Parse the mint-amount input field. `None` until the text is a positive
/// integer number of whole tokens; the mint button stays disabled until
/// this returns `Some`.
pub fn parse_mint_amount(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<u64>() {
        Ok(amount) if amount > 0 => Some(amount),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== format_tokens tests ====================

    #[test]
    fn test_format_tokens_zero() {
        assert_eq!(format_tokens(U256::zero()), "0.000000000000000000");
    }

    #[test]
    fn test_format_tokens_one() {
        let one = U256::from(10u64.pow(18));
        assert_eq!(format_tokens(one), "1.000000000000000000");
    }

    #[test]
    fn test_format_tokens_fractional() {
        let half = U256::from(5u64) * U256::from(10u64.pow(17));
        assert_eq!(format_tokens(half), "0.500000000000000000");
    }

    // ==================== eth_to_wei tests ====================

    #[test]
    fn test_eth_to_wei_zero() {
        assert_eq!(eth_to_wei(0.0).unwrap(), U256::zero());
    }

    #[test]
    fn test_eth_to_wei_one_eth() {
        assert_eq!(eth_to_wei(1.0).unwrap(), U256::from(10u64.pow(18)));
    }

    #[test]
    fn test_eth_to_wei_unit_price() {
        // 0.001 ETH, the fixed per-token mint price.
        assert_eq!(eth_to_wei(0.001).unwrap(), U256::from(10u64.pow(15)));
    }

    #[test]
    fn test_eth_to_wei_negative_fails() {
        let result = eth_to_wei(-1.0);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("negative"));
    }

    // ==================== parse_mint_amount tests ====================

    #[test]
    fn test_parse_mint_amount_positive() {
        assert_eq!(parse_mint_amount("5"), Some(5));
        assert_eq!(parse_mint_amount("  12  "), Some(12));
    }

    #[test]
    fn test_parse_mint_amount_rejects_zero_and_negative() {
        assert_eq!(parse_mint_amount("0"), None);
        assert_eq!(parse_mint_amount("-3"), None);
    }

    #[test]
    fn test_parse_mint_amount_rejects_non_integers() {
        assert_eq!(parse_mint_amount(""), None);
        assert_eq!(parse_mint_amount("1.5"), None);
        assert_eq!(parse_mint_amount("abc"), None);
    }
}
