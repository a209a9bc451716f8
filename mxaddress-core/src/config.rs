//! Configuração do parser de endereços.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::MODEL_FILE;

/// Variável de ambiente com o caminho do modelo CRFsuite.
pub const MODEL_ENV: &str = "MXADDRESS_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Caminho do arquivo de modelo treinado.
    pub model_path: PathBuf,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(MODEL_FILE),
        }
    }
}

impl ParserConfig {
    /// Lê a configuração do ambiente, caindo no padrão quando a variável não existe.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(MODEL_ENV).filter(|p| !p.trim().is_empty()) {
            config.model_path = PathBuf::from(path);
        }
        config
    }

    /// Nome do modelo usado nas mensagens de erro (o nome do arquivo).
    pub fn model_name(&self) -> String {
        self.model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| MODEL_FILE.to_string())
    }
}
