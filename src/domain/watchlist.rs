//! Watchlist parsing: the set of stocks an evaluation run covers.
//!
//! Codes come in as a comma-separated list; each token is either a bare code
//! (`600519`) or a code with a display name (`600519:Kweichow Moutai`).

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchlistError {
    #[error("empty token in watchlist")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_watchlist(input: &str) -> Result<Vec<WatchEntry>, WatchlistError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WatchlistError::EmptyToken);
        }
        let (code, name) = match trimmed.split_once(':') {
            Some((code, name)) => (code.trim(), name.trim()),
            None => (trimmed, ""),
        };
        if code.is_empty() {
            return Err(WatchlistError::EmptyToken);
        }
        let code = code.to_uppercase();
        if seen.contains(&code) {
            return Err(WatchlistError::DuplicateCode(code));
        }
        seen.insert(code.clone());
        let name = if name.is_empty() {
            code.clone()
        } else {
            name.to_string()
        };
        entries.push(WatchEntry { code, name });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watchlist_basic() {
        let result = parse_watchlist("600519,000001,300750").unwrap();
        let codes: Vec<&str> = result.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["600519", "000001", "300750"]);
    }

    #[test]
    fn test_parse_watchlist_with_names() {
        let result = parse_watchlist("600519:Kweichow Moutai, 000001:Ping An Bank").unwrap();
        assert_eq!(
            result[0],
            WatchEntry {
                code: "600519".to_string(),
                name: "Kweichow Moutai".to_string(),
            }
        );
        assert_eq!(result[1].name, "Ping An Bank");
    }

    #[test]
    fn test_parse_watchlist_bare_code_uses_code_as_name() {
        let result = parse_watchlist("600519").unwrap();
        assert_eq!(result[0].name, "600519");
    }

    #[test]
    fn test_parse_watchlist_with_whitespace() {
        let result = parse_watchlist("  600519 , 000001  ").unwrap();
        let codes: Vec<&str> = result.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["600519", "000001"]);
    }

    #[test]
    fn test_parse_watchlist_uppercases_codes() {
        let result = parse_watchlist("hk00700:Tencent").unwrap();
        assert_eq!(result[0].code, "HK00700");
        assert_eq!(result[0].name, "Tencent");
    }

    #[test]
    fn test_parse_watchlist_empty_token() {
        let result = parse_watchlist("600519,,000001");
        assert!(matches!(result, Err(WatchlistError::EmptyToken)));
    }

    #[test]
    fn test_parse_watchlist_name_without_code() {
        let result = parse_watchlist(":Nameless");
        assert!(matches!(result, Err(WatchlistError::EmptyToken)));
    }

    #[test]
    fn test_parse_watchlist_duplicate() {
        let result = parse_watchlist("600519,000001,600519");
        assert!(matches!(result, Err(WatchlistError::DuplicateCode(s)) if s == "600519"));
    }
}
