use std::collections::HashSet;

/// Trims and upper-cases symbols, dropping blanks and repeats while keeping order.
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_in_order() {
        let input: Vec<String> = [" btcusdt", "ETHUSDT", "BTCUSDT ", "", "solusdt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(normalize_symbols(&input), vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    }
}
