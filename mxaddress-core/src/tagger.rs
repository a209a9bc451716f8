//! # Vocabulário de Rótulos de Endereço
//!
//! Define o vocabulário fechado de papéis semânticos que o rotulador atribui a
//! cada token, e os rótulos *efetivos* usados na saída final.
//!
//! ## Ocorrências repetidas
//!
//! O vocabulário tem um único rótulo por papel estrutural (uma rua, uma
//! unidade). Endereços com cruzamentos ("entre Reforma y Juárez") ou com
//! unidades compostas ("Torre A Depto 301") repetem o mesmo papel. Em vez de
//! inflar o vocabulário do modelo, a reconciliação renomeia a segunda e a
//! terceira ocorrência:
//!
//! | Rótulo efetivo              | Nome                          |
//! |-----------------------------|-------------------------------|
//! | `(First, StreetName)`       | `StreetName`                  |
//! | `(Second, StreetName)`      | `SecondStreetName`            |
//! | `(Third, OccupancyIdentifier)` | `ThirdOccupancyIdentifier` |

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

macro_rules! labels {
    ($($variant:ident),+ $(,)?) => {
        /// Papéis semânticos reconhecidos pelo rotulador.
        ///
        /// O nome canônico de cada variante é o próprio identificador
        /// (ex: `Label::StreetName` ↔ `"StreetName"`), que é também o nome
        /// emitido pelo modelo.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Label {
            $($variant),+
        }

        impl Label {
            /// Todos os rótulos, na ordem do vocabulário.
            pub const ALL: &'static [Label] = &[$(Label::$variant),+];

            /// Nome canônico (ex: "StreetName").
            pub fn name(&self) -> &'static str {
                match self {
                    $(Label::$variant => stringify!($variant)),+
                }
            }

            /// Parseia o nome canônico emitido pelo modelo.
            pub fn from_name(s: &str) -> Option<Self> {
                match s {
                    $(stringify!($variant) => Some(Label::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

labels! {
    AddressNumberPrefix,
    AddressNumber,
    AddressNumberUndefined,
    AddressNumberSuffix,
    StreetNamePreModifier,
    StreetNamePreDirectional,
    StreetNamePreType,
    StreetName,
    StreetNamePostType,
    StreetNamePostDirectional,
    SubaddressType,
    SubaddressIdentifier,
    DistrictSuffix,
    District,
    DistrictUndefined,
    DistrictType,
    BuildingName,
    OccupancyType,
    OccupancyIdentifier,
    CornerOf,
    LandmarkName,
    PlaceName,
    StateName,
    ZipCodePrefix,
    ZipCode,
    USPSBoxType,
    USPSBoxID,
    USPSBoxGroupType,
    USPSBoxGroupID,
    IntersectionHintStart,
    IntersectionSeparator,
    Recipient,
    NotAddress,
    CityPrefix,
    City,
    State,
}

impl Label {
    /// Número total de rótulos do vocabulário.
    pub const COUNT: usize = 36;

    /// Rótulos da família de nome de rua (tipo, modificador, direção e o nome).
    pub fn is_street_name(&self) -> bool {
        self.name().contains("StreetName")
    }

    /// Rótulos da família de identificador de unidade.
    pub fn is_occupancy_identifier(&self) -> bool {
        self.name().contains("OccupancyIdentifier")
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Qual ocorrência de um papel repetido este rótulo representa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occurrence {
    First,
    Second,
    Third,
}

impl Occurrence {
    fn prefix(&self) -> &'static str {
        match self {
            Occurrence::First => "",
            Occurrence::Second => "Second",
            Occurrence::Third => "Third",
        }
    }
}

/// Rótulo após a reconciliação: o rótulo original ou uma variante renomeada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectiveLabel {
    pub occurrence: Occurrence,
    pub label: Label,
}

impl EffectiveLabel {
    pub fn first(label: Label) -> Self {
        Self { occurrence: Occurrence::First, label }
    }

    pub fn second(label: Label) -> Self {
        Self { occurrence: Occurrence::Second, label }
    }

    pub fn third(label: Label) -> Self {
        Self { occurrence: Occurrence::Third, label }
    }

    /// Nome do rótulo efetivo (ex: "SecondOccupancyType").
    pub fn name(&self) -> String {
        format!("{}{}", self.occurrence.prefix(), self.label.name())
    }

    /// Parseia um nome com prefixo opcional `Second`/`Third`.
    pub fn from_name(s: &str) -> Option<Self> {
        if let Some(rest) = s.strip_prefix("Second") {
            return Label::from_name(rest).map(Self::second);
        }
        if let Some(rest) = s.strip_prefix("Third") {
            return Label::from_name(rest).map(Self::third);
        }
        Label::from_name(s).map(Self::first)
    }
}

impl From<Label> for EffectiveLabel {
    fn from(label: Label) -> Self {
        Self::first(label)
    }
}

impl std::fmt::Display for EffectiveLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.occurrence.prefix(), self.label.name())
    }
}

/// Um token com o rótulo atribuído pelo rotulador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledToken {
    pub token: Token,
    pub label: Label,
}
