//! # Engenharia de Features para Endereços
//!
//! Para cada token, calcula um conjunto fixo de características (tamanho,
//! capitalização, dígitos e pertença aos gazetteers) e depois encadeia o
//! contexto da sequência: cada token recebe uma *cópia congelada* das features
//! do vizinho anterior e do seguinte, além dos marcadores de início e fim.
//!
//! ## Por que um struct e não um mapa?
//!
//! O esquema de features é fechado. Representá-lo como struct deixa explícito
//! que `previous`/`next` são snapshots ([`TokenFeatures`]) e não referências
//! vivas para o [`FeatureSet`] vizinho: um snapshot não carrega vizinhos, então
//! o encadeamento transitivo nem é representável.
//!
//! ## Formato para o rotulador
//!
//! [`FeatureSet::attributes`] achata o conjunto em pares `(nome, peso)`, no mesmo
//! formato que modelos CRFsuite treinados para este domínio esperam:
//!
//! | Feature            | Atributo gerado                |
//! |--------------------|--------------------------------|
//! | `length = 7`       | `("length", 7.0)`              |
//! | `case = title`     | `("case=title", 1.0)`          |
//! | `case = none`      | `("case", 0.0)`                |
//! | `article = true`   | `("article", 1.0)`             |
//! | vizinho anterior   | prefixo `previous:`            |

use serde::{Deserialize, Serialize};

use crate::gazetteer::Gazetteer;
use crate::tokenizer::Token;

/// Classe de capitalização de um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    Upper,
    Lower,
    Title,
    Mixed,
    /// Sem letras com caixa (pontuação, dígitos) ou mistura com não-letras.
    None,
}

impl Casing {
    pub fn name(&self) -> &'static str {
        match self {
            Casing::Upper => "upper",
            Casing::Lower => "lower",
            Casing::Title => "title",
            Casing::Mixed => "mixed",
            Casing::None => "none",
        }
    }
}

/// Classe de dígitos de um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitClass {
    AllDigits,
    SomeDigits,
    NoDigits,
}

impl DigitClass {
    pub fn name(&self) -> &'static str {
        match self {
            DigitClass::AllDigits => "all_digits",
            DigitClass::SomeDigits => "some_digits",
            DigitClass::NoDigits => "no_digits",
        }
    }
}

/// Features de um único token, sem contexto.
///
/// É também o tipo dos snapshots embutidos em `previous`/`next`; por isso
/// carrega os marcadores `rawstring_start`/`rawstring_end`, que podem ser
/// gravados no snapshot do vizinho.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenFeatures {
    /// Número de caracteres (não bytes).
    pub length: usize,
    pub case: Casing,
    pub digits: DigitClass,
    pub contraction: bool,
    pub article: bool,
    pub street_abbrev: bool,
    pub sub_address: bool,
    pub district_type: bool,
    pub intersection_indication: bool,
    pub intersection: bool,
    pub city_prefix: bool,
    pub rawstring_start: bool,
    pub rawstring_end: bool,
}

impl TokenFeatures {
    fn push_attributes(&self, prefix: &str, out: &mut Vec<(String, f64)>) {
        out.push((format!("{prefix}length"), self.length as f64));
        match self.case {
            Casing::None => out.push((format!("{prefix}case"), 0.0)),
            case => out.push((format!("{prefix}case={}", case.name()), 1.0)),
        }
        out.push((format!("{prefix}digits={}", self.digits.name()), 1.0));

        let flags = [
            ("contraction", self.contraction),
            ("article", self.article),
            ("street_abbrev", self.street_abbrev),
            ("sub_address", self.sub_address),
            ("district_type", self.district_type),
            ("intersection_indication", self.intersection_indication),
            ("intersection", self.intersection),
            ("city_prefix", self.city_prefix),
        ];
        for (name, value) in flags {
            out.push((format!("{prefix}{name}"), bool_weight(value)));
        }
        if self.rawstring_start {
            out.push((format!("{prefix}rawstring.start"), 1.0));
        }
        if self.rawstring_end {
            out.push((format!("{prefix}rawstring.end"), 1.0));
        }
    }
}

/// Features de um token dentro da sequência.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub token: TokenFeatures,
    /// Snapshot das features do token anterior (antes do encadeamento).
    pub previous: Option<TokenFeatures>,
    /// Snapshot das features do token seguinte (antes do encadeamento).
    pub next: Option<TokenFeatures>,
    pub address_start: bool,
    pub address_end: bool,
    pub singleton: bool,
}

impl FeatureSet {
    fn new(token: TokenFeatures) -> Self {
        Self {
            token,
            previous: None,
            next: None,
            address_start: false,
            address_end: false,
            singleton: false,
        }
    }

    /// Achata o conjunto em atributos ponderados para o rotulador.
    pub fn attributes(&self) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(48);
        self.token.push_attributes("", &mut out);
        if let Some(prev) = &self.previous {
            prev.push_attributes("previous:", &mut out);
        }
        if let Some(next) = &self.next {
            next.push_attributes("next:", &mut out);
        }
        if self.address_start {
            out.push(("address.start".to_string(), 1.0));
        }
        if self.address_end {
            out.push(("address.end".to_string(), 1.0));
        }
        if self.singleton {
            out.push(("singleton".to_string(), 1.0));
        }
        out
    }
}

fn bool_weight(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Classifica a capitalização do token.
///
/// - `upper`: tem letras com caixa e nenhuma minúscula (ex: "MZA", "A1").
/// - `lower`: tem letras com caixa e nenhuma maiúscula.
/// - `title`: primeira letra maiúscula e nenhuma maiúscula depois ("Reforma,",
///   "(Cuauhtémoc)").
/// - `mixed`: só letras, mas nenhum dos casos acima ("McAllen").
/// - `none`: o resto (ex: "222", "#", "aB1").
pub fn casing(token: &str) -> Casing {
    let has_upper = token.chars().any(char::is_uppercase);
    let has_lower = token.chars().any(char::is_lowercase);

    if has_upper && !has_lower {
        return Casing::Upper;
    }
    if has_lower && !has_upper {
        return Casing::Lower;
    }

    // pontuação inicial não conta: "(Frente" é title
    let mut cased = token.chars().filter(|c| c.is_uppercase() || c.is_lowercase());
    let first_upper = cased.next().map(char::is_uppercase).unwrap_or(false);
    if first_upper && !cased.any(char::is_uppercase) {
        return Casing::Title;
    }

    if !token.is_empty() && token.chars().all(char::is_alphabetic) {
        Casing::Mixed
    } else {
        Casing::None
    }
}

/// Classifica a presença de dígitos no token.
pub fn digits(token: &str) -> DigitClass {
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        DigitClass::AllDigits
    } else if token.chars().any(|c| c.is_ascii_digit()) {
        DigitClass::SomeDigits
    } else {
        DigitClass::NoDigits
    }
}

/// Extrai as features de um token isolado.
pub fn token_features(token: &str) -> TokenFeatures {
    TokenFeatures {
        length: token.chars().count(),
        case: casing(token),
        digits: digits(token),
        contraction: Gazetteer::Contractions.contains(token),
        article: Gazetteer::Articles.contains(token),
        street_abbrev: Gazetteer::StreetNames.contains(token),
        sub_address: Gazetteer::SubaddressTypes.contains(token),
        district_type: Gazetteer::DistrictTypes.contains(token),
        intersection_indication: Gazetteer::IntersectionIndicators.contains(token),
        intersection: Gazetteer::Intersections.contains(token),
        city_prefix: Gazetteer::CityPrefixes.contains(token),
        rawstring_start: false,
        rawstring_end: false,
    }
}

/// Gera os conjuntos de features para toda a sequência de tokens.
///
/// # Retorno
/// Um `Vec<FeatureSet>` alinhado com os tokens: o índice `i` do retorno
/// corresponde ao token `i` da entrada.
///
/// # Marcadores de borda
/// - O primeiro recebe `address_start`, o último `address_end`.
/// - Com mais de um token, o primeiro e o último recebem também
///   `rawstring_start`/`rawstring_end`, e o mesmo marcador é gravado no
///   snapshot `previous` do segundo token e no `next` do penúltimo.
/// - Com um único token: `singleton = true` e nenhum vizinho.
pub fn extract_features(tokens: &[Token]) -> Vec<FeatureSet> {
    if tokens.is_empty() {
        return vec![];
    }

    // Snapshots tirados antes de qualquer encadeamento
    let snapshots: Vec<TokenFeatures> = tokens.iter().map(|t| token_features(&t.text)).collect();
    let mut sequence: Vec<FeatureSet> = snapshots.iter().cloned().map(FeatureSet::new).collect();

    for i in 0..sequence.len().saturating_sub(1) {
        sequence[i].next = Some(snapshots[i + 1].clone());
        sequence[i + 1].previous = Some(snapshots[i].clone());
    }

    let n = sequence.len();
    sequence[0].address_start = true;
    sequence[n - 1].address_end = true;

    if n > 1 {
        sequence[0].token.rawstring_start = true;
        sequence[n - 1].token.rawstring_end = true;
        if let Some(prev) = sequence[1].previous.as_mut() {
            prev.rawstring_start = true;
        }
        if let Some(next) = sequence[n - 2].next.as_mut() {
            next.rawstring_end = true;
        }
    } else {
        sequence[0].singleton = true;
    }

    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_casing_classes() {
        assert_eq!(casing("CALLE"), Casing::Upper);
        assert_eq!(casing("A1"), Casing::Upper);
        assert_eq!(casing("calle"), Casing::Lower);
        assert_eq!(casing("Reforma,"), Casing::Title);
        assert_eq!(casing("Av."), Casing::Title);
        assert_eq!(casing("McAllen"), Casing::Mixed);
        assert_eq!(casing("222"), Casing::None);
        assert_eq!(casing("#"), Casing::None);
        assert_eq!(casing("aB1"), Casing::None);
        assert_eq!(casing("(Cuauhtémoc)"), Casing::Title);
        assert_eq!(casing("(Frente"), Casing::Title);
        assert_eq!(casing("Mz.14A"), Casing::None);
    }

    #[test]
    fn test_digit_classes() {
        assert_eq!(digits("222"), DigitClass::AllDigits);
        assert_eq!(digits("222,"), DigitClass::SomeDigits);
        assert_eq!(digits("A-3"), DigitClass::SomeDigits);
        assert_eq!(digits("Reforma"), DigitClass::NoDigits);
        assert_eq!(digits("½"), DigitClass::NoDigits);
        assert_eq!(digits("Ⅳ"), DigitClass::NoDigits);
    }

    #[test]
    fn test_gazetteer_flags_case_policy() {
        let f = token_features("Calle");
        // tipos de via são sensíveis a maiúsculas
        assert!(!f.street_abbrev);
        assert!(token_features("calle").street_abbrev);

        assert!(token_features("MZA").sub_address);
        assert!(!token_features("Mza").sub_address);

        assert!(token_features("DEL").contraction);
        assert!(token_features("Las").article);
        assert!(token_features("Col").district_type);
        assert!(token_features("Entre").intersection_indication);
        assert!(token_features("&").intersection);
        assert!(token_features("Deleg.").city_prefix);
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(token_features("Juárez").length, 6);
    }

    #[test]
    fn test_feature_sequence_length() {
        for text in ["Reforma", "Calle Reforma", "Calle Reforma 222, Col. Juárez, CDMX"] {
            let tokens = tokenize(text);
            assert_eq!(extract_features(&tokens).len(), tokens.len());
        }
        assert!(extract_features(&[]).is_empty());
    }

    #[test]
    fn test_singleton_has_no_links() {
        let features = extract_features(&tokenize("Reforma"));
        let only = &features[0];
        assert!(only.singleton);
        assert!(only.address_start);
        assert!(only.address_end);
        assert!(only.previous.is_none());
        assert!(only.next.is_none());
        assert!(!only.token.rawstring_start);
        assert!(!only.token.rawstring_end);
    }

    #[test]
    fn test_boundary_markers() {
        let features = extract_features(&tokenize("Calle Reforma 222 Centro"));
        let n = features.len();
        assert_eq!(n, 4);

        assert!(features[0].address_start && features[0].token.rawstring_start);
        assert!(features[n - 1].address_end && features[n - 1].token.rawstring_end);
        assert!(features.iter().all(|f| !f.singleton));

        assert!(features[0].previous.is_none());
        assert!(features[n - 1].next.is_none());

        assert!(features[1].previous.as_ref().unwrap().rawstring_start);
        assert!(features[n - 2].next.as_ref().unwrap().rawstring_end);
        // Os demais snapshots não carregam marcadores
        assert!(!features[2].previous.as_ref().unwrap().rawstring_start);
        assert!(!features[1].next.as_ref().unwrap().rawstring_end);
    }

    #[test]
    fn test_neighbour_snapshots_are_pre_linking() {
        let features = extract_features(&tokenize("Calle Reforma 222"));
        let next = features[0].next.as_ref().unwrap();
        assert_eq!(next.length, "Reforma".len());
        assert_eq!(next.case, Casing::Title);

        let prev = features[2].previous.as_ref().unwrap();
        assert_eq!(prev, &token_features("Reforma"));
    }

    #[test]
    fn test_two_tokens_markers() {
        let features = extract_features(&tokenize("Reforma 222"));
        assert!(features[1].previous.as_ref().unwrap().rawstring_start);
        assert!(features[0].next.as_ref().unwrap().rawstring_end);
    }

    #[test]
    fn test_attributes_encoding() {
        let features = extract_features(&tokenize("Calle 222"));
        let attrs = features[0].attributes();
        let get = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| *v);

        assert_eq!(get("length"), Some(5.0));
        assert_eq!(get("case=title"), Some(1.0));
        assert_eq!(get("digits=no_digits"), Some(1.0));
        assert_eq!(get("street_abbrev"), Some(0.0));
        assert_eq!(get("address.start"), Some(1.0));
        assert_eq!(get("rawstring.start"), Some(1.0));
        assert_eq!(get("next:digits=all_digits"), Some(1.0));
        assert_eq!(get("next:case"), Some(0.0));
        assert_eq!(get("next:rawstring.end"), Some(1.0));
        assert_eq!(get("previous:length"), None);
        assert_eq!(get("singleton"), None);
    }
}
