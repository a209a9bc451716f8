//! # Rotulador de Sequências
//!
//! O modelo estatístico é um colaborador externo: o pipeline só depende do
//! contrato "dada uma sequência ordenada de conjuntos de features, devolva um
//! rótulo por token". Qualquer rotulador que cumpra [`SequenceLabeler`] serve.
//!
//! A implementação concreta, [`CrfSuiteLabeler`], lê um arquivo de modelo
//! CRFsuite (linear-chain CRF) através do crate `crfs`. O formato do arquivo
//! é opaco para o restante do sistema.
//!
//! ## Concorrência
//!
//! O rotulador é construído uma vez e usado somente para leitura. O bound
//! `Send + Sync` do trait é a pré-condição para chamadas concorrentes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crfs::{Attribute, Model};
use tracing::debug;

use crate::error::AddressError;
use crate::features::FeatureSet;
use crate::tagger::Label;

/// Nome padrão do arquivo de modelo treinado.
pub const MODEL_FILE: &str = "learned_settings.crfsuite";

/// Contrato do rotulador de sequências.
///
/// Implementações devem devolver exatamente um rótulo por conjunto de
/// features, na mesma ordem, e ser determinísticas para um mesmo modelo.
pub trait SequenceLabeler: Send + Sync {
    fn label(&self, features: &[FeatureSet]) -> Result<Vec<Label>, AddressError>;
}

impl<L: SequenceLabeler + ?Sized> SequenceLabeler for Box<L> {
    fn label(&self, features: &[FeatureSet]) -> Result<Vec<Label>, AddressError> {
        (**self).label(features)
    }
}

impl<L: SequenceLabeler + ?Sized> SequenceLabeler for Arc<L> {
    fn label(&self, features: &[FeatureSet]) -> Result<Vec<Label>, AddressError> {
        (**self).label(features)
    }
}

/// Rotulador baseado em um modelo CRFsuite.
///
/// Guarda os bytes do modelo e valida o cabeçalho na carga. O `Model` do
/// `crfs` empresta o buffer, então um tagger novo é montado a cada chamada
/// sobre os mesmos bytes (só leitura de cabeçalho e offsets).
pub struct CrfSuiteLabeler {
    data: Vec<u8>,
    path: PathBuf,
}

impl CrfSuiteLabeler {
    /// Carrega e valida um modelo a partir do disco.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AddressError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|source| AddressError::ModelLoad {
            path: path.clone(),
            source,
        })?;
        Self::from_bytes(data, path)
    }

    /// Valida um modelo já em memória. `path` só identifica o modelo nos erros.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self, AddressError> {
        let path = path.into();
        {
            let model = Model::new(&data).map_err(|source| AddressError::ModelLoad {
                path: path.clone(),
                source,
            })?;
            model.tagger().map_err(|source| AddressError::ModelLoad {
                path: path.clone(),
                source,
            })?;
        }
        debug!(path = %path.display(), bytes = data.len(), "loaded CRFsuite model");
        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SequenceLabeler for CrfSuiteLabeler {
    fn label(&self, features: &[FeatureSet]) -> Result<Vec<Label>, AddressError> {
        if features.is_empty() {
            return Ok(vec![]);
        }

        let xseq: Vec<Vec<Attribute>> = features
            .iter()
            .map(|fs| {
                fs.attributes()
                    .into_iter()
                    .map(|(name, value)| Attribute::new(name, value))
                    .collect()
            })
            .collect();

        let model = Model::new(&self.data).map_err(|e| AddressError::Labeling(e.to_string()))?;
        let mut tagger = model
            .tagger()
            .map_err(|e| AddressError::Labeling(e.to_string()))?;
        let names = tagger
            .tag(&xseq)
            .map_err(|e| AddressError::Labeling(e.to_string()))?;

        let labels = names
            .iter()
            .map(|name| Label::from_name(name).ok_or_else(|| AddressError::UnknownLabel(name.to_string())))
            .collect::<Result<Vec<Label>, AddressError>>()?;

        if labels.len() != features.len() {
            return Err(AddressError::LabelCountMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        Ok(labels)
    }
}
