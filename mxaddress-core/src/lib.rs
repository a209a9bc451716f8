//! # mxaddress-core — Extração de Componentes de Endereços
//!
//! Este crate transforma endereços latino-americanos (mexicanos) em texto livre
//! em registros estruturados: rua, número, colônia, cidade, unidade etc.
//!
//! ## Arquitetura do Sistema
//!
//! O sistema segue uma arquitetura de pipeline linear:
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Tokenização** ([`tokenizer`]): Varredura por regex que preserva a pontuação final.
//! 3.  **Extração de Features** ([`features`]): Conjunto fixo de características por token,
//!     com snapshots dos vizinhos e marcadores de borda. Consulta os [`gazetteer`]s.
//! 4.  **Rotulação** ([`model`]): Um rotulador de sequências externo (ex: modelo CRFsuite)
//!     atribui um [`Label`] a cada token.
//! 5.  **Reconciliação** ([`reconcile`]): Renomeia papéis repetidos (segunda rua de um
//!     cruzamento, segunda unidade), funde tokens adjacentes e remove duplicatas.
//! 6.  **Saída**: [`TaggedAddress`], um mapa ordenado `rótulo → texto`.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use mxaddress_core::{AddressParser, ParserConfig};
//!
//! // 1. Carrega o modelo (um aviso é emitido se o arquivo não existir)
//! let parser = AddressParser::from_config(&ParserConfig::from_env());
//!
//! // 2. Extrai os componentes
//! match parser.tag("Calle Reforma 222, Col. Juárez, CDMX") {
//!     Ok(address) => {
//!         for (label, value) in address.iter() {
//!             println!("{label}: {value}");
//!         }
//!     }
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta todos os estágios.
//! - [`reconcile`]: Máquina de estados de reconciliação de rótulos.
//! - [`corpus`]: Endereços de demonstração.

pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod gazetteer;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod tagger;
pub mod tokenizer;

pub use config::ParserConfig;
pub use error::AddressError;
pub use features::{FeatureSet, TokenFeatures};
pub use model::{CrfSuiteLabeler, SequenceLabeler};
pub use pipeline::{AddressParser, PipelineEvent};
pub use reconcile::TaggedAddress;
pub use tagger::{EffectiveLabel, Label, LabeledToken, Occurrence};
pub use tokenizer::Token;
