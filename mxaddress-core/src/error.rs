//! # Erros do Pipeline de Endereços
//!
//! Problemas locais (codificação, entrada vazia) são absorvidos pelos próprios
//! estágios. Já a ausência do modelo nunca é absorvida: qualquer chamada que
//! precise rotular tokens falha com [`AddressError::MissingModel`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddressError {
    /// Nenhum rotulador foi carregado. A mensagem nomeia o arquivo de modelo esperado.
    #[error(
        "MISSING MODEL FILE: {model}\nYou must train the model before you can use the parse and tag methods"
    )]
    MissingModel { model: String },

    #[error("failed to load model {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sequence labeler failed: {0}")]
    Labeling(String),

    #[error("unknown label returned by the model: {0}")]
    UnknownLabel(String),

    #[error("labeler returned {actual} labels for {expected} tokens")]
    LabelCountMismatch { expected: usize, actual: usize },
}

impl AddressError {
    /// `true` quando o erro indica que o modelo não está disponível.
    pub fn is_missing_model(&self) -> bool {
        matches!(self, AddressError::MissingModel { .. })
    }
}
