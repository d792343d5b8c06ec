//! Private key loading.
//!
//! Keys come from a comma-separated environment variable when it is set, or
//! from a newline-delimited file otherwise. Entries that do not carry the
//! expected prefix or are too short are dropped silently; only the count of
//! accepted keys is logged.

use std::fs;
use std::path::Path;

use crate::config::WalletSourceConfig;
use crate::wallet::types::WalletResult;

/// Load private keys according to `source`.
pub fn load_private_keys(source: &WalletSourceConfig) -> WalletResult<Vec<String>> {
    if !source.env_var.is_empty() {
        if let Ok(raw) = std::env::var(&source.env_var) {
            let keys = filter_keys(raw.split(','), source);
            tracing::info!(count = keys.len(), var = %source.env_var, "Loaded keys from environment");
            return Ok(keys);
        }
    }

    load_key_file(Path::new(&source.file), source)
}

/// Read keys from `path`, creating an empty file when it does not exist.
pub fn load_key_file(path: &Path, source: &WalletSourceConfig) -> WalletResult<Vec<String>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Key file not found, creating an empty one");
        fs::write(path, "")?;
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let keys = filter_keys(content.lines(), source);
    if keys.is_empty() {
        tracing::warn!(
            path = %path.display(),
            prefix = %source.key_prefix,
            "No usable private keys found; add one {}-prefixed key per line",
            source.key_prefix
        );
    } else {
        tracing::info!(count = keys.len(), path = %path.display(), "Loaded keys from file");
    }
    Ok(keys)
}

/// Trim entries and keep those with the expected prefix and length.
pub fn filter_keys<'a, I>(entries: I, source: &WalletSourceConfig) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    entries
        .into_iter()
        .map(str::trim)
        .filter(|k| k.starts_with(source.key_prefix.as_str()) && k.len() >= source.min_key_len)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_B: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn test_filter_keys() {
        let source = WalletSourceConfig::default();
        let lines = vec![
            format!("  {}  ", KEY_A),
            String::new(),
            "# comment".to_string(),
            "0x1234".to_string(),
            KEY_B.trim_start_matches("0x").to_string(),
            KEY_B.to_string(),
        ];
        let keys = filter_keys(lines.iter().map(String::as_str), &source);
        assert_eq!(keys, vec![KEY_A.to_string(), KEY_B.to_string()]);
    }

    #[test]
    fn test_load_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.txt");
        fs::write(&path, format!("{}\r\n\n{}\n", KEY_A, KEY_B)).unwrap();

        let keys = load_key_file(&path, &WalletSourceConfig::default()).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], KEY_A);
    }

    #[test]
    fn test_missing_key_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.txt");

        let keys = load_key_file(&path, &WalletSourceConfig::default()).unwrap();
        assert!(keys.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_env_var_takes_precedence() {
        let var = "CAMPHAVEN_TEST_KEYS_PRECEDENCE";
        std::env::set_var(var, format!("{}, ,{}", KEY_A, KEY_B));

        let source = WalletSourceConfig {
            env_var: var.to_string(),
            file: "/nonexistent/dir/wallets.txt".to_string(),
            ..WalletSourceConfig::default()
        };
        let keys = load_private_keys(&source).unwrap();
        std::env::remove_var(var);

        assert_eq!(keys, vec![KEY_A.to_string(), KEY_B.to_string()]);
    }
}
