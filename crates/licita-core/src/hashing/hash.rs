//! Helpers de hash. O algoritmo é sha-256: o contrato de auditoria expõe
//! o prefixo de 16 hex do digest.

use sha2::{Digest, Sha256};

use super::to_canonical_json;

/// Hasheia uma string e devolve o digest em hex (64 chars).
pub fn hash_str(input: &str) -> String {
    let mut h = Sha256::new();
    h.update(input.as_bytes());
    format!("{:x}", h.finalize())
}

/// Hasheia um valor JSON via forma canônica.
pub fn hash_value(value: &serde_json::Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Prefixo de 16 hex usado em eventos de auditoria.
pub fn prefixo16(hash: &str) -> String {
    hash.chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_e_estavel_sobre_canonicalizacoes_repetidas() {
        let a = json!({"b": 1, "a": {"y": [1, 2], "x": "á"}});
        let b = json!({"a": {"x": "á", "y": [1, 2]}, "b": 1});
        assert_eq!(hash_value(&a), hash_value(&b));
        assert_eq!(hash_value(&a), hash_value(&a));
    }

    #[test]
    fn prefixo16_corta_em_16_hex() {
        let h = hash_str("abc");
        assert_eq!(prefixo16(&h).len(), 16);
        assert!(h.starts_with(&prefixo16(&h)));
    }
}
