use anyhow::{Result, bail};

/// Parse seed tokens: decimal, negative decimal or `0x` hex. Duplicates are dropped in order.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            match u64::from_str_radix(hex, 16) {
                Ok(value) => value,
                Err(_) => bail!("Unrecognized seed token: {token}"),
            }
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        bail!("No seeds provided");
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_decimal_hex_and_negative_seeds() {
        let seeds = resolve_seed_inputs(&tokens(&["1337", "0xff", "-7"])).unwrap();
        assert_eq!(seeds, vec![1337, 255, 7]);
    }

    #[test]
    fn deduplicates_preserving_order() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "3", "5", "0x3"])).unwrap();
        assert_eq!(seeds, vec![5, 3]);
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0xzz"])).is_err());
        assert!(resolve_seed_inputs(&[]).is_err());
    }
}
