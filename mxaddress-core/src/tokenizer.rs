//! # Tokenizador de Endereços
//!
//! Divide o texto bruto de um endereço em tokens léxicos com uma única
//! varredura de expressão regular. Cada token preserva sua posição original
//! no texto (offset) e a pontuação final que interessa aos estágios seguintes.
//!
//! ## Regras de Tokenização
//!
//! - Separa por espaços, vírgulas, ponto e vírgula e parênteses.
//! - Mantém `.`, `,`, `;` e `)` finais presos ao token (ex: `"222,"`, `"Col."`).
//! - `&` e `#` são sempre tokens isolados de um caractere.
//! - Um `(` inicial é aceito como parte do token (ex: `"(Cuauhtémoc)"`).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use mxaddress_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Calle Reforma 222, Col. Juárez");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Calle", "Reforma", "222,", "Col.", "Juárez"]);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Um token extraído do texto original.
///
/// O `Token` é a unidade atômica do pipeline. A ordem dos tokens é
/// significativa e preservada em todos os estágios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token, com a pontuação final capturada (ex: "Reforma,").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Texto sem os espaços, vírgulas e ponto e vírgula das bordas.
    pub fn trimmed(&self) -> &str {
        trim_separators(&self.text)
    }

    /// `true` se o token só contém espaços em branco.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Remove espaços, vírgulas e ponto e vírgula do início e do fim.
pub fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c == ' ' || c == ',' || c == ';')
}

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(*\b[^\s,;#&()]+[.,;)\n]*|[#&]").expect("token pattern must compile")
});

/// Tokeniza um endereço. Entrada vazia ou só com espaços gera lista vazia.
pub fn tokenize(text: &str) -> Vec<Token> {
    let tokens: Vec<Token> = TOKEN_PATTERN
        .find_iter(text)
        .enumerate()
        .map(|(index, m)| Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index,
        })
        .collect();

    let token_texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    trace!(raw_string = text, tokens = ?token_texts, "tokenized");
    tokens
}

/// Tokeniza bytes crus.
///
/// Tenta decodificar como UTF-8; se falhar, faz uma conversão com perdas
/// (caracteres inválidos viram `U+FFFD`). Nunca falha por causa da codificação.
pub fn tokenize_bytes(bytes: &[u8]) -> Vec<Token> {
    match std::str::from_utf8(bytes) {
        Ok(text) => tokenize(text),
        Err(err) => {
            trace!(error = %err, "input is not valid UTF-8, decoding lossily");
            tokenize(&String::from_utf8_lossy(bytes))
        }
    }
}
