//! # Reconciliação de Rótulos
//!
//! Percorre o fluxo `(token, rótulo)` produzido pelo rotulador e monta o
//! endereço final: um mapa ordenado `rótulo efetivo → texto`.
//!
//! ## Máquina de estados
//!
//! Quatro flags independentes guiam a renomeação de papéis repetidos:
//!
//! | Rótulo observado              | Efeito                                                   |
//! |-------------------------------|----------------------------------------------------------|
//! | `IntersectionHintStart`       | `in_intersection = true`                                 |
//! | `IntersectionSeparator`       | `intersection_ending = true`                             |
//! | `OccupancyType`               | se `in_occupancy`: vira `Second…` e `occupancy_ending = true`; sempre `in_occupancy = true` |
//! | `OccupancyIdentifier` (família) com `in_occupancy` | `Third…` se `occupancy_ending`, senão `Second…` |
//! | `StreetName*` (família) com `in_intersection` | `Third…` se `intersection_ending`, senão `Second…` |
//!
//! As regras são avaliadas nessa ordem sobre o rótulo original e no máximo uma
//! renomeação vale por token. As flags de unidade e de cruzamento podem estar
//! ligadas ao mesmo tempo (um cruzamento com número interior), por isso o estado
//! é um conjunto de booleanos e não um único enum.
//!
//! ## Montagem
//!
//! - Tokens só com espaços são ignorados.
//! - Se o rótulo efetivo já existe e o texto do token (sem ` ,;` nas bordas) já
//!   está contido no valor guardado, o token é descartado.
//! - Rótulo igual ao do token processado anterior: o texto é anexado ao mesmo
//!   fragmento. Caso contrário abre-se um fragmento novo; se o rótulo já existia
//!   (repetição não adjacente), o fragmento entra na mesma chave, em ordem.
//! - No fim, os fragmentos são unidos por espaço e aparados de ` ,;`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::gazetteer::find_metro_alias;
use crate::tagger::{EffectiveLabel, Label, LabeledToken};
use crate::tokenizer::trim_separators;

/// Chave sintética que indica um endereço na Cidade do México.
pub const METRO_AREA_KEY: &str = "cdmx";

/// Endereço reconciliado: componentes em ordem de primeira aparição.
///
/// Cada rótulo efetivo aparece no máximo uma vez.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedAddress {
    metro_area: bool,
    components: Vec<(EffectiveLabel, String)>,
}

impl TaggedAddress {
    /// `true` se o texto bruto menciona alguma variante da Cidade do México.
    pub fn is_metro_area(&self) -> bool {
        self.metro_area
    }

    pub fn get(&self, label: impl Into<EffectiveLabel>) -> Option<&str> {
        let label = label.into();
        self.components
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Busca pelo nome do rótulo efetivo (ex: "SecondStreetName").
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        EffectiveLabel::from_name(name).and_then(|label| self.get(label))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectiveLabel, &str)> {
        self.components.iter().map(|(l, v)| (l, v.as_str()))
    }

    pub fn labels(&self) -> Vec<EffectiveLabel> {
        self.components.iter().map(|(l, _)| *l).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && !self.metro_area
    }

    /// Pares `(nome, valor)` na ordem de saída, incluindo a chave `cdmx`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.components.len() + 1);
        if self.metro_area {
            pairs.push((METRO_AREA_KEY.to_string(), "1".to_string()));
        }
        pairs.extend(self.components.iter().map(|(l, v)| (l.name(), v.clone())));
        pairs
    }
}

impl Serialize for TaggedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.metro_area);
        let mut map = serializer.serialize_map(Some(self.components.len() + extra))?;
        if self.metro_area {
            map.serialize_entry(METRO_AREA_KEY, "1")?;
        }
        for (label, value) in &self.components {
            map.serialize_entry(&label.name(), value)?;
        }
        map.end()
    }
}

/// Estado corrente da varredura.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileState {
    pub in_occupancy: bool,
    pub occupancy_ending: bool,
    pub in_intersection: bool,
    pub intersection_ending: bool,
    /// Rótulo efetivo do último token processado (não descartado).
    pub previous: Option<EffectiveLabel>,
}

impl ReconcileState {
    /// Atualiza as flags com o rótulo observado e devolve o rótulo efetivo.
    pub fn observe(&mut self, label: Label) -> EffectiveLabel {
        match label {
            Label::IntersectionHintStart => self.in_intersection = true,
            Label::IntersectionSeparator => self.intersection_ending = true,
            _ => {}
        }

        if label == Label::OccupancyType {
            let effective = if self.in_occupancy {
                self.occupancy_ending = true;
                EffectiveLabel::second(label)
            } else {
                EffectiveLabel::first(label)
            };
            self.in_occupancy = true;
            return effective;
        }

        if label.is_occupancy_identifier() && self.in_occupancy {
            return if self.occupancy_ending {
                EffectiveLabel::third(label)
            } else {
                EffectiveLabel::second(label)
            };
        }

        if label.is_street_name() && self.in_intersection {
            return if self.intersection_ending {
                EffectiveLabel::third(label)
            } else {
                EffectiveLabel::second(label)
            };
        }

        EffectiveLabel::first(label)
    }
}

/// Acumula fragmentos de texto por rótulo efetivo, em ordem de chegada.
#[derive(Debug, Default)]
struct Components {
    entries: Vec<(EffectiveLabel, Vec<String>)>,
}

impl Components {
    fn fragments_mut(&mut self, label: EffectiveLabel) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(l, _)| *l == label)
            .map(|(_, f)| f)
    }

    /// O conteúdo guardado para o rótulo já contém o texto?
    fn holds(&self, label: EffectiveLabel, text: &str) -> bool {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, fragments)| fragments.join(" ").contains(text))
            .unwrap_or(false)
    }

    fn extend_last(&mut self, label: EffectiveLabel, text: &str) {
        match self.fragments_mut(label).and_then(|f| f.last_mut()) {
            Some(last) => {
                last.push(' ');
                last.push_str(text);
            }
            None => self.push_fragment(label, text),
        }
    }

    fn push_fragment(&mut self, label: EffectiveLabel, text: &str) {
        match self.fragments_mut(label) {
            Some(fragments) => fragments.push(text.to_string()),
            None => self.entries.push((label, vec![text.to_string()])),
        }
    }

    fn finish(self, metro_area: bool) -> TaggedAddress {
        let components = self
            .entries
            .into_iter()
            .map(|(label, fragments)| (label, trim_separators(&fragments.join(" ")).to_string()))
            .collect();
        TaggedAddress {
            metro_area,
            components,
        }
    }
}

/// Reconciliação incremental: recebe um token rotulado por vez.
///
/// [`reconcile`] é o atalho para uma sequência inteira; a versão incremental
/// serve a quem precisa do rótulo efetivo de cada token à medida que chega.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: ReconcileState,
    components: Components,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorpora um token e devolve o seu rótulo efetivo.
    ///
    /// Tokens só com espaços não passam pela máquina de estados e devolvem
    /// `None`. Um token descartado como duplicata ainda devolve o rótulo
    /// efetivo com que foi avaliado.
    pub fn push(&mut self, item: &LabeledToken) -> Option<EffectiveLabel> {
        let token = &item.token;
        if token.is_blank() {
            return None;
        }

        let effective = self.state.observe(item.label);

        if self.components.holds(effective, token.trimmed()) {
            debug!(label = %effective, token = %token.text, "skipping duplicated token");
            return Some(effective);
        }

        if self.state.previous == Some(effective) {
            debug!(label = %effective, token = %token.text, "label sequence detected");
            self.components.extend_last(effective, &token.text);
        } else {
            self.components.push_fragment(effective, &token.text);
        }
        self.state.previous = Some(effective);
        Some(effective)
    }

    /// Fecha a varredura. `raw` é o texto original, usado apenas na busca
    /// pela Cidade do México.
    pub fn finish(self, raw: &str) -> TaggedAddress {
        self.components.finish(find_metro_alias(raw).is_some())
    }
}

/// Reconcilia o fluxo `(token, rótulo)` em um [`TaggedAddress`].
pub fn reconcile(raw: &str, labeled: &[LabeledToken]) -> TaggedAddress {
    let mut reconciler = Reconciler::new();
    for item in labeled {
        reconciler.push(item);
    }
    reconciler.finish(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Token;

    fn stream(items: &[(&str, Label)]) -> Vec<LabeledToken> {
        let mut offset = 0;
        items
            .iter()
            .enumerate()
            .map(|(index, (text, label))| {
                let start = offset;
                offset += text.len() + 1;
                LabeledToken {
                    token: Token {
                        text: text.to_string(),
                        start,
                        end: start + text.len(),
                        index,
                    },
                    label: *label,
                }
            })
            .collect()
    }

    fn raw(items: &[(&str, Label)]) -> String {
        items.iter().map(|(t, _)| *t).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_non_repeating_labels_map_directly() {
        let items = [
            ("Calle", Label::StreetNamePreType),
            ("Reforma", Label::StreetName),
            ("222,", Label::AddressNumber),
            ("Juárez,", Label::District),
            ("Cuauhtémoc", Label::City),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));

        assert_eq!(tagged.len(), 5);
        assert_eq!(tagged.get(Label::StreetNamePreType), Some("Calle"));
        assert_eq!(tagged.get(Label::StreetName), Some("Reforma"));
        assert_eq!(tagged.get(Label::AddressNumber), Some("222"));
        assert_eq!(tagged.get(Label::District), Some("Juárez"));
        assert_eq!(tagged.get(Label::City), Some("Cuauhtémoc"));
        assert!(!tagged.is_metro_area());
    }

    #[test]
    fn test_adjacent_tokens_merge() {
        let items = [
            ("Paseo", Label::StreetName),
            ("de", Label::StreetName),
            ("la", Label::StreetName),
            ("Reforma,", Label::StreetName),
            ("505", Label::AddressNumber),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::StreetName), Some("Paseo de la Reforma"));
        assert_eq!(tagged.labels(), vec![
            EffectiveLabel::first(Label::StreetName),
            EffectiveLabel::first(Label::AddressNumber),
        ]);
    }

    #[test]
    fn test_occupancy_renaming() {
        let items = [
            ("TORRE", Label::OccupancyType),
            ("A", Label::OccupancyIdentifier),
            ("DEPTO", Label::OccupancyType),
            ("301", Label::OccupancyIdentifier),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));

        assert_eq!(tagged.get_by_name("OccupancyType"), Some("TORRE"));
        assert_eq!(tagged.get_by_name("SecondOccupancyIdentifier"), Some("A"));
        assert_eq!(tagged.get_by_name("SecondOccupancyType"), Some("DEPTO"));
        assert_eq!(tagged.get_by_name("ThirdOccupancyIdentifier"), Some("301"));
        assert_eq!(tagged.get_by_name("OccupancyIdentifier"), None);
    }

    #[test]
    fn test_intersection_renaming() {
        let items = [
            ("Calle", Label::StreetNamePreType),
            ("Bucareli", Label::StreetName),
            ("entre", Label::IntersectionHintStart),
            ("Reforma", Label::StreetName),
            ("y", Label::IntersectionSeparator),
            ("Juarez", Label::StreetName),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));

        assert_eq!(tagged.get_by_name("StreetName"), Some("Bucareli"));
        assert_eq!(tagged.get_by_name("SecondStreetName"), Some("Reforma"));
        assert_eq!(tagged.get_by_name("ThirdStreetName"), Some("Juarez"));
        assert_eq!(tagged.get(Label::IntersectionSeparator), Some("y"));
        assert_eq!(tagged.get(Label::IntersectionHintStart), Some("entre"));
    }

    #[test]
    fn test_street_family_renamed_inside_intersection() {
        let items = [
            ("entre", Label::IntersectionHintStart),
            ("Av.", Label::StreetNamePreType),
            ("Reforma", Label::StreetName),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get_by_name("SecondStreetNamePreType"), Some("Av."));
        assert_eq!(tagged.get_by_name("SecondStreetName"), Some("Reforma"));
    }

    #[test]
    fn test_occupancy_identifier_without_type_keeps_name() {
        let items = [("Reforma", Label::StreetName), ("301", Label::OccupancyIdentifier)];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::OccupancyIdentifier), Some("301"));
    }

    #[test]
    fn test_occupancy_and_intersection_flags_combine() {
        let items = [
            ("entre", Label::IntersectionHintStart),
            ("Reforma", Label::StreetName),
            ("Int.", Label::OccupancyType),
            ("4", Label::OccupancyIdentifier),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get_by_name("SecondStreetName"), Some("Reforma"));
        assert_eq!(tagged.get_by_name("OccupancyType"), Some("Int."));
        assert_eq!(tagged.get_by_name("SecondOccupancyIdentifier"), Some("4"));
    }

    #[test]
    fn test_duplicate_tokens_are_suppressed() {
        let items = [
            ("Reforma,", Label::StreetName),
            ("222", Label::AddressNumber),
            ("Reforma", Label::StreetName),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::StreetName), Some("Reforma"));
        assert_eq!(tagged.len(), 2);
    }

    #[test]
    fn test_duplicate_does_not_reset_previous_label() {
        // O segundo "Roma" é descartado e "Norte" ainda funde com o primeiro
        let items = [
            ("Roma", Label::District),
            ("Roma", Label::District),
            ("Norte", Label::District),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::District), Some("Roma Norte"));
    }

    #[test]
    fn test_non_adjacent_repeat_appends_in_order() {
        let items = [
            ("Juárez", Label::City),
            ("Centro", Label::District),
            ("Chihuahua", Label::City),
        ];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::City), Some("Juárez Chihuahua"));
        assert_eq!(tagged.labels(), vec![
            EffectiveLabel::first(Label::City),
            EffectiveLabel::first(Label::District),
        ]);
    }

    #[test]
    fn test_blank_tokens_are_skipped() {
        let items = [(" ", Label::NotAddress), ("Reforma", Label::StreetName)];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::NotAddress), None);
        assert_eq!(tagged.len(), 1);
    }

    #[test]
    fn test_values_are_trimmed() {
        let items = [("Coyoacán,;", Label::City), ("04000,", Label::ZipCode)];
        let tagged = reconcile(&raw(&items), &stream(&items));
        assert_eq!(tagged.get(Label::City), Some("Coyoacán"));
        assert_eq!(tagged.get(Label::ZipCode), Some("04000"));
    }

    #[test]
    fn test_metro_area_flag_set_once() {
        let items = [
            ("Ciudad", Label::City),
            ("de", Label::City),
            ("Mexico,", Label::City),
            ("CDMX", Label::State),
        ];
        let raw_text = "Ciudad de Mexico, CDMX, Distrito Federal";
        let tagged = reconcile(raw_text, &stream(&items));

        assert!(tagged.is_metro_area());
        let pairs = tagged.to_pairs();
        assert_eq!(pairs[0], ("cdmx".to_string(), "1".to_string()));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "cdmx").count(), 1);
    }

    #[test]
    fn test_serializes_in_order_with_metro_flag_first() {
        let items = [("Roma", Label::District), ("CDMX", Label::City)];
        let tagged = reconcile("Roma CDMX", &stream(&items));
        let json = serde_json::to_string(&tagged).unwrap();
        assert_eq!(json, r#"{"cdmx":"1","District":"Roma","City":"CDMX"}"#);
    }

    #[test]
    fn test_empty_stream() {
        let tagged = reconcile("", &[]);
        assert!(tagged.is_empty());
        assert_eq!(serde_json::to_string(&tagged).unwrap(), "{}");
    }

    #[test]
    fn test_reconciler_reports_effective_labels() {
        let items = [
            ("entre", Label::IntersectionHintStart),
            ("Reforma", Label::StreetName),
            ("y", Label::IntersectionSeparator),
            ("Juarez", Label::StreetName),
            ("Juarez", Label::StreetName),
        ];
        let mut reconciler = Reconciler::new();
        let effective: Vec<String> = stream(&items)
            .iter()
            .filter_map(|item| reconciler.push(item))
            .map(|label| label.to_string())
            .collect();

        assert_eq!(
            effective,
            [
                "IntersectionHintStart",
                "SecondStreetName",
                "IntersectionSeparator",
                "ThirdStreetName",
                "ThirdStreetName",
            ]
        );
        let tagged = reconciler.finish(&raw(&items));
        assert_eq!(tagged.get_by_name("ThirdStreetName"), Some("Juarez"));
    }
}
