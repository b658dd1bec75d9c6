//! # Estatísticas da Saída e Casos Especiais
//!
//! Medidas que não dependem do padrão-ouro: diversidade do vocabulário,
//! proporção de palavras raras e comprimento médio dos tokens. Servem para
//! comparar segmentadores também nos corpora de comentários, que não têm ouro.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Frequência máxima para que uma palavra seja considerada rara.
pub const RARE_FREQUENCY: usize = 2;

/// Pontuação que conta como caso especial quando aparece sozinha.
pub const ISOLATED_PUNCTUATION: &[char] = &['！', '？', '，', '。', '；'];

/// Estatísticas descritivas de uma sequência de tokens.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Tokens distintos / total de tokens.
    pub vocabulary_diversity: f64,
    /// Tokens distintos com frequência ≤ 2 / tokens distintos.
    pub rare_word_ratio: f64,
    /// Caracteres / total de tokens.
    pub average_token_length: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl StatisticsReport {
    /// Arredondamento de exibição: 4, 4 e 2 casas decimais.
    pub fn rounded(&self) -> Self {
        Self {
            vocabulary_diversity: round_to(self.vocabulary_diversity, 4),
            rare_word_ratio: round_to(self.rare_word_ratio, 4),
            average_token_length: round_to(self.average_token_length, 2),
        }
    }
}

/// Calcula as estatísticas; tudo 0 para entrada vazia.
pub fn evaluate_statistics<S: AsRef<str>>(tokens: &[S]) -> StatisticsReport {
    if tokens.is_empty() {
        return StatisticsReport::default();
    }

    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    let mut total_chars = 0usize;
    for token in tokens.iter().map(AsRef::as_ref) {
        *frequencies.entry(token).or_insert(0) += 1;
        total_chars += token.chars().count();
    }

    let distinct = frequencies.len();
    let rare = frequencies.values().filter(|&&f| f <= RARE_FREQUENCY).count();
    let total = tokens.len() as f64;

    StatisticsReport {
        vocabulary_diversity: distinct as f64 / total,
        rare_word_ratio: rare as f64 / distinct as f64,
        average_token_length: total_chars as f64 / total,
    }
}

/// Contadores de casos especiais, separados por tipo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecialCaseReport {
    /// Tokens de um caractere que são pontuação de fim de oração.
    pub isolated_punctuation: usize,
    /// Tokens com ao menos um dígito e uma letra.
    pub mixed_alphanumeric: usize,
}

impl SpecialCaseReport {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut report = Self::default();
        for token in tokens.iter().map(AsRef::as_ref) {
            if is_isolated_punctuation(token) {
                report.isolated_punctuation += 1;
            }
            if is_mixed_alphanumeric(token) {
                report.mixed_alphanumeric += 1;
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.isolated_punctuation + self.mixed_alphanumeric
    }
}

fn is_isolated_punctuation(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if ISOLATED_PUNCTUATION.contains(&c))
}

/// Dígito: numérico sem ser letra. Números-letra (`〇`, `Ⅻ`) não contam.
fn is_digit_char(c: char) -> bool {
    c.is_numeric() && !c.is_alphabetic()
}

/// Letra: alfabético sem ser numérico. Ideogramas CJK contam como letra.
fn is_letter_char(c: char) -> bool {
    c.is_alphabetic() && !c.is_numeric()
}

/// `2024年` conta como misto; `二〇〇四年` não tem dígito.
fn is_mixed_alphanumeric(token: &str) -> bool {
    token.chars().any(is_digit_char) && token.chars().any(is_letter_char)
}

/// Total de casos especiais na sequência.
pub fn check_special_cases<S: AsRef<str>>(tokens: &[S]) -> usize {
    SpecialCaseReport::from_tokens(tokens).total()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ratios_in_unit_interval(tokens in prop::collection::vec("[a-c北京。]{1,3}", 0..20)) {
            let stats = evaluate_statistics(&tokens);
            prop_assert!((0.0..=1.0).contains(&stats.vocabulary_diversity));
            prop_assert!((0.0..=1.0).contains(&stats.rare_word_ratio));
            prop_assert!(stats.average_token_length >= 0.0);
        }

        #[test]
        fn special_cases_bounded_by_token_count(tokens in prop::collection::vec("[a1。，]{1,2}", 0..20)) {
            prop_assert!(check_special_cases(&tokens) <= tokens.len());
        }
    }
}
