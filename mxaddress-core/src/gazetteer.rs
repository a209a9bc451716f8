//! # Gazetteers de Endereços
//!
//! Tabelas estáticas de vocabulário consultadas pela extração de features e
//! pela varredura do texto completo. São dados de configuração, definidos uma
//! única vez e compartilhados somente para leitura entre todas as chamadas.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Abreviações e tipos de via (comparação sensível a maiúsculas).
pub const STREET_NAMES: &[&str] = &[
    "calle", "avenida", "av", "ave", "blvd", "cerrada", "privada", "priv", "circuito", "cto",
    "prolng", "ret", "fcc",
];

/// Tipos de subendereço: manzana, lote, interior (sensível a maiúsculas).
pub const SUBADDRESS_TYPES: &[&str] = &["MZA", "MZ", "LT", "LOTE", "INT"];

pub const DISTRICT_TYPES: &[&str] = &["col", "colonia", "fracc.", "fraccionamiento"];

pub const INTERSECTION_INDICATORS: &[&str] = &["entre"];

pub const INTERSECTIONS: &[&str] = &["&", "y", "esquina con", "esq.con", "esq", "casi"];

pub const CITY_PREFIXES: &[&str] = &["mpo.", "deleg."];

pub const ARTICLES: &[&str] = &["la", "las", "el", "los", "un", "uno", "una", "unas"];

pub const CONTRACTIONS: &[&str] = &["de", "del", "al", "por", "para"];

/// Variantes textuais da Cidade do México (antigo Distrito Federal), já em minúsculas.
pub const METRO_AREA_ALIASES: &[&str] = &[
    "distrito federal",
    "ciudad de mexico",
    "ciudad de méxico",
    "cdmx",
];

/// Identifica cada tabela de vocabulário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gazetteer {
    StreetNames,
    SubaddressTypes,
    DistrictTypes,
    IntersectionIndicators,
    Intersections,
    CityPrefixes,
    Articles,
    Contractions,
}

impl Gazetteer {
    pub const ALL: [Gazetteer; 8] = [
        Gazetteer::StreetNames,
        Gazetteer::SubaddressTypes,
        Gazetteer::DistrictTypes,
        Gazetteer::IntersectionIndicators,
        Gazetteer::Intersections,
        Gazetteer::CityPrefixes,
        Gazetteer::Articles,
        Gazetteer::Contractions,
    ];

    pub fn entries(&self) -> &'static [&'static str] {
        match self {
            Gazetteer::StreetNames => STREET_NAMES,
            Gazetteer::SubaddressTypes => SUBADDRESS_TYPES,
            Gazetteer::DistrictTypes => DISTRICT_TYPES,
            Gazetteer::IntersectionIndicators => INTERSECTION_INDICATORS,
            Gazetteer::Intersections => INTERSECTIONS,
            Gazetteer::CityPrefixes => CITY_PREFIXES,
            Gazetteer::Articles => ARTICLES,
            Gazetteer::Contractions => CONTRACTIONS,
        }
    }

    /// Tipos de via e de subendereço são comparados exatamente como escritos;
    /// as demais tabelas comparam o token em minúsculas.
    pub fn is_case_sensitive(&self) -> bool {
        matches!(self, Gazetteer::StreetNames | Gazetteer::SubaddressTypes)
    }

    /// Verifica se o token pertence à tabela, respeitando a política de caixa.
    pub fn contains(&self, token: &str) -> bool {
        let set = &INDEX[*self as usize];
        if self.is_case_sensitive() {
            set.contains(token)
        } else {
            set.contains(token.to_lowercase().as_str())
        }
    }
}

static INDEX: LazyLock<Vec<HashSet<&'static str>>> = LazyLock::new(|| {
    Gazetteer::ALL
        .iter()
        .map(|g| g.entries().iter().copied().collect())
        .collect()
});

/// Procura a primeira variante da Cidade do México contida no texto.
///
/// A busca é feita sobre o texto em minúsculas e para no primeiro acerto.
pub fn find_metro_alias(raw: &str) -> Option<&'static str> {
    let lower = raw.to_lowercase();
    METRO_AREA_ALIASES
        .iter()
        .copied()
        .find(|alias| lower.contains(alias))
}
