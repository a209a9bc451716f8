//! # Pipeline de Endereços — Orquestrador
//!
//! Conecta os estágios:
//!
//! ```text
//! texto bruto → tokenizer → features → rotulador → reconciliação → TaggedAddress
//! ```
//!
//! O rotulador é uma instância explícita, injetada na construção do
//! [`AddressParser`]. Se nenhum modelo foi carregado, o parser continua
//! existindo, mas toda chamada que precisa rotular falha com
//! [`AddressError::MissingModel`].
//!
//! Além da API síncrona, [`AddressParser::tag_streaming`] emite eventos por um
//! canal `mpsc` a cada passo, para interfaces que mostram o progresso.

use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::AddressError;
use crate::features::extract_features;
use crate::model::{CrfSuiteLabeler, SequenceLabeler, MODEL_FILE};
use crate::reconcile::{reconcile, Reconciler, TaggedAddress};
use crate::tagger::LabeledToken;
use crate::tokenizer::{tokenize, Token};

/// Eventos emitidos durante [`AddressParser::tag_streaming`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: tokens gerados.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: atributos ativos (peso diferente de zero) de um token.
    FeaturesComputed {
        token_index: usize,
        token_text: String,
        attributes: Vec<(String, f64)>,
    },
    /// **Passo 3**: rótulo do token. `label` é o rótulo efetivo, já com a
    /// renomeação de papéis repetidos; `raw_label` é a saída do rotulador.
    LabelAssigned {
        token_index: usize,
        token_text: String,
        raw_label: String,
        label: String,
    },
    /// **Conclusão**: endereço reconciliado.
    Done {
        address: TaggedAddress,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// **Falha**: modelo ausente ou erro do rotulador.
    Error { message: String },
}

/// O parser de endereços.
///
/// Chamadas concorrentes (ex: [`AddressParser::tag_many`]) são seguras porque
/// o rotulador injetado é `Send + Sync` e usado somente para leitura.
pub struct AddressParser {
    labeler: Option<Box<dyn SequenceLabeler>>,
    model_name: String,
}

impl AddressParser {
    /// Cria o parser com um rotulador já pronto.
    pub fn with_labeler(labeler: impl SequenceLabeler + 'static) -> Self {
        Self {
            labeler: Some(Box::new(labeler)),
            model_name: MODEL_FILE.to_string(),
        }
    }

    /// Cria um parser sem modelo: `parse`/`tag` sempre falham com `MissingModel`.
    pub fn unloaded(model_name: impl Into<String>) -> Self {
        Self {
            labeler: None,
            model_name: model_name.into(),
        }
    }

    /// Carrega o modelo CRFsuite do disco.
    ///
    /// Falhas de carga não abortam: geram um aviso e o parser fica sem modelo.
    pub fn from_model_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let model_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| MODEL_FILE.to_string());

        match CrfSuiteLabeler::load(path) {
            Ok(labeler) => Self {
                labeler: Some(Box::new(labeler)),
                model_name,
            },
            Err(err) => {
                warn!(
                    error = %err,
                    "You must train the model to create the {model_name} file before you can use the parse and tag methods"
                );
                Self::unloaded(model_name)
            }
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::from_model_file(&config.model_path)
    }

    pub fn is_loaded(&self) -> bool {
        self.labeler.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn labeler(&self) -> Result<&dyn SequenceLabeler, AddressError> {
        self.labeler
            .as_deref()
            .ok_or_else(|| AddressError::MissingModel {
                model: self.model_name.clone(),
            })
    }

    /// Tokeniza, extrai features e rotula, sem reconciliar.
    ///
    /// Entrada sem tokens devolve lista vazia. Sem modelo, falha sempre.
    pub fn parse(&self, raw: &str) -> Result<Vec<LabeledToken>, AddressError> {
        let labeler = self.labeler()?;
        let tokens = tokenize(raw);
        if tokens.is_empty() {
            return Ok(vec![]);
        }
        label_tokens(labeler, tokens)
    }

    /// Executa o pipeline completo e devolve o endereço reconciliado.
    pub fn tag(&self, raw: &str) -> Result<TaggedAddress, AddressError> {
        let cleaned = strip_hidden_chars(raw);
        let labeled = self.parse(&cleaned)?;
        Ok(reconcile(&cleaned, &labeled))
    }

    /// Processa vários endereços em paralelo. A ordem da saída segue a da entrada.
    pub fn tag_many(&self, raws: &[&str]) -> Vec<Result<TaggedAddress, AddressError>> {
        raws.par_iter().map(|raw| self.tag(raw)).collect()
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `FeaturesComputed` (um por token)
    /// 3. `LabelAssigned` (um por token, com o rótulo efetivo)
    /// 4. `Done`, ou `Error` se o modelo faltar ou o rotulador falhar.
    pub fn tag_streaming(&self, raw: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();

        let labeler = match self.labeler() {
            Ok(labeler) => labeler,
            Err(err) => {
                let _ = tx.send(PipelineEvent::Error { message: err.to_string() });
                return;
            }
        };

        // === Passo 1: Tokenização ===
        let cleaned = strip_hidden_chars(raw);
        let tokens = tokenize(&cleaned);
        let total = tokens.len();
        let _ = tx.send(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total,
        });

        if tokens.is_empty() {
            let _ = tx.send(PipelineEvent::Done {
                address: reconcile(&cleaned, &[]),
                total_tokens: 0,
                processing_ms: start.elapsed().as_millis() as u64,
            });
            return;
        }

        // === Passo 2: Features ===
        let features = extract_features(&tokens);
        for (i, fs) in features.iter().enumerate() {
            let attributes = fs
                .attributes()
                .into_iter()
                .filter(|(_, weight)| *weight != 0.0)
                .collect();
            let _ = tx.send(PipelineEvent::FeaturesComputed {
                token_index: i,
                token_text: tokens[i].text.clone(),
                attributes,
            });
        }

        // === Passo 3: Rotulação ===
        let labels = match labeler.label(&features) {
            Ok(labels) if labels.len() == tokens.len() => labels,
            Ok(labels) => {
                let err = AddressError::LabelCountMismatch {
                    expected: tokens.len(),
                    actual: labels.len(),
                };
                let _ = tx.send(PipelineEvent::Error { message: err.to_string() });
                return;
            }
            Err(err) => {
                let _ = tx.send(PipelineEvent::Error { message: err.to_string() });
                return;
            }
        };

        // === Passo 4: Reconciliação, token a token ===
        let mut reconciler = Reconciler::new();
        for (token, label) in tokens.into_iter().zip(labels) {
            let item = LabeledToken { token, label };
            let effective = reconciler.push(&item).unwrap_or_else(|| label.into());
            let _ = tx.send(PipelineEvent::LabelAssigned {
                token_index: item.token.index,
                token_text: item.token.text,
                raw_label: label.name().to_string(),
                label: effective.to_string(),
            });
        }
        let address = reconciler.finish(&cleaned);
        let _ = tx.send(PipelineEvent::Done {
            address,
            total_tokens: total,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }
}

fn label_tokens(
    labeler: &dyn SequenceLabeler,
    tokens: Vec<Token>,
) -> Result<Vec<LabeledToken>, AddressError> {
    let features = extract_features(&tokens);
    let labels = labeler.label(&features)?;
    if labels.len() != tokens.len() {
        return Err(AddressError::LabelCountMismatch {
            expected: tokens.len(),
            actual: labels.len(),
        });
    }
    debug!(tokens = tokens.len(), "labeled address tokens");
    Ok(tokens
        .into_iter()
        .zip(labels)
        .map(|(token, label)| LabeledToken { token, label })
        .collect())
}

/// Remove caracteres de controle e de formatação invisíveis (zero-width, BOM,
/// hífen suave). Espaços em branco são mantidos para não colar tokens, e letras
/// acentuadas ficam intactas.
pub fn strip_hidden_chars(raw: &str) -> String {
    raw.chars()
        .filter(|&c| (!c.is_control() || c.is_whitespace()) && !is_invisible_format(c))
        .collect()
}

fn is_invisible_format(c: char) -> bool {
    matches!(c, '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}')
}
