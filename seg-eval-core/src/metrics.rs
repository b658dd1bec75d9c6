//! # Métricas de Segmentação
//!
//! Compara a sequência prevista por um segmentador com o padrão-ouro em dois níveis:
//!
//! - **Palavra**: acerto exato vale 1.0; se o token previsto for substring de
//!   um token do ouro, vale `len(previsto)/len(ouro)` (crédito parcial).
//! - **Caractere**: as duas sequências são explodidas em caracteres e
//!   comparadas posição a posição.
//!
//! Além disso: diferença de granularidade (comprimento médio dos tokens) e
//! diferença de comprimento (número de tokens).
//!
//! ## Limitações conhecidas
//!
//! - O crédito parcial usa o **primeiro** token do ouro que contém o previsto,
//!   não o melhor. Trocar por "melhor casamento" mudaria todos os números
//!   históricos, então a regra é mantida.
//! - O alinhamento por caractere é puramente posicional: um caractere a mais
//!   ou a menos desloca todas as comparações seguintes. Não há distância de edição.
//! - O recall por palavra não é limitado a 1: `correct` é limitado pelo tamanho
//!   da previsão, não do ouro.
//!
//! Comprimentos são sempre contados em caracteres (code points), nunca em bytes.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seg_eval_core::metrics::calculate_metrics;
//!
//! let scores = calculate_metrics(&["北京", "大学"], &["北京大学"]);
//! assert_eq!(scores.precision, 0.5);
//! assert_eq!(scores.recall, 1.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Precisão, revocação, F1 e acurácia de um nível de comparação.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelScores {
    pub precision: f64,
    pub recall: f64,
    pub f_score: f64,
    pub accuracy: f64,
}

/// Relatório completo de uma comparação previsão × ouro.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    pub word_level: LevelScores,
    pub char_level: LevelScores,
    /// Diferença absoluta do comprimento médio dos tokens, em caracteres.
    pub granularity_difference: f64,
    /// Diferença absoluta do número de tokens.
    pub length_difference: usize,
}

/// Divisão com denominador zero resolvida como 0.
pub fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// Média harmônica; 0 quando `precision + recall == 0`.
pub fn f_score(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum > 0.0 {
        2.0 * precision * recall / sum
    } else {
        0.0
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Crédito de um token previsto que não existe no ouro: primeiro token do
/// ouro que o contém, na ordem do ouro.
fn partial_credit<S: AsRef<str>>(word: &str, gold: &[S]) -> f64 {
    gold.iter()
        .map(AsRef::as_ref)
        .find(|gold_word| gold_word.contains(word))
        .map_or(0.0, |gold_word| ratio(char_len(word) as f64, char_len(gold_word)))
}

/// Métricas por palavra, com crédito parcial.
///
/// `accuracy` conta apenas os acertos exatos.
pub fn calculate_metrics<P, G>(pred: &[P], gold: &[G]) -> LevelScores
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    let gold_set: HashSet<&str> = gold.iter().map(AsRef::as_ref).collect();

    let mut correct = 0.0;
    let mut exact = 0usize;
    for word in pred.iter().map(AsRef::as_ref) {
        if gold_set.contains(word) {
            correct += 1.0;
            exact += 1;
        } else {
            correct += partial_credit(word, gold);
        }
    }

    let precision = ratio(correct, pred.len());
    let recall = ratio(correct, gold.len());
    LevelScores {
        precision,
        recall,
        f_score: f_score(precision, recall),
        accuracy: ratio(exact as f64, pred.len()),
    }
}

/// Métricas por caractere, com pareamento posicional.
///
/// `accuracy` é igual a `precision` por construção.
pub fn calculate_char_level_metrics<P, G>(pred: &[P], gold: &[G]) -> LevelScores
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    let pred_chars: Vec<char> = pred.iter().flat_map(|w| w.as_ref().chars()).collect();
    let gold_chars: Vec<char> = gold.iter().flat_map(|w| w.as_ref().chars()).collect();

    let correct = pred_chars
        .iter()
        .zip(&gold_chars)
        .filter(|(p, g)| p == g)
        .count() as f64;

    let precision = ratio(correct, pred_chars.len());
    let recall = ratio(correct, gold_chars.len());
    LevelScores {
        precision,
        recall,
        f_score: f_score(precision, recall),
        accuracy: precision,
    }
}

/// Nome histórico de [`calculate_char_level_metrics`]; apesar do nome, o nível é caractere.
pub fn calculate_word_level_metrics<P, G>(pred: &[P], gold: &[G]) -> LevelScores
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    calculate_char_level_metrics(pred, gold)
}

/// Comprimento médio dos tokens em caracteres (0 para sequência vazia).
pub fn average_token_length<S: AsRef<str>>(tokens: &[S]) -> f64 {
    let total: usize = tokens.iter().map(|t| char_len(t.as_ref())).sum();
    ratio(total as f64, tokens.len())
}

/// Diferença absoluta entre os comprimentos médios.
pub fn calculate_granularity_metrics<P, G>(pred: &[P], gold: &[G]) -> f64
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    (average_token_length(pred) - average_token_length(gold)).abs()
}

/// Avaliação completa. Não altera as entradas.
pub fn evaluate_segmentation<P, G>(pred: &[P], gold: &[G]) -> MetricsReport
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    MetricsReport {
        word_level: calculate_metrics(pred, gold),
        char_level: calculate_char_level_metrics(pred, gold),
        granularity_difference: calculate_granularity_metrics(pred, gold),
        length_difference: pred.len().abs_diff(gold.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_partial_credit_example() {
        let scores = calculate_metrics(&["北京", "大学"], &["北京大学"]);
        assert!((scores.precision - 0.5).abs() < EPS);
        assert!((scores.recall - 1.0).abs() < EPS);
        assert!((scores.f_score - 2.0 / 3.0).abs() < EPS);
        // Nenhum acerto exato
        assert_eq!(scores.accuracy, 0.0);
    }

    #[test]
    fn test_first_match_not_best_match() {
        // "大" está em "大学生" (1/3) e em "大学" (1/2); vale o primeiro
        let scores = calculate_metrics(&["大"], &["大学生", "大学"]);
        assert!((scores.precision - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_exact_match_ignores_order() {
        let scores = calculate_metrics(&["大学", "北京"], &["北京", "大学"]);
        assert_eq!(scores.precision, 1.0);
        assert_eq!(scores.accuracy, 1.0);
    }

    #[test]
    fn test_no_match_gets_zero() {
        let scores = calculate_metrics(&["上海"], &["北京", "大学"]);
        assert_eq!(scores, LevelScores::default());
    }

    #[test]
    fn test_recall_not_clamped() {
        let scores = calculate_metrics(&["好", "好", "好"], &["好"]);
        assert_eq!(scores.precision, 1.0);
        assert_eq!(scores.recall, 3.0);
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        let empty: [&str; 0] = [];
        let report = evaluate_segmentation(&empty, &empty);
        assert_eq!(report, MetricsReport::default());

        let report = evaluate_segmentation(&["北京"], &empty);
        assert_eq!(report.word_level, LevelScores::default());
        assert_eq!(report.char_level, LevelScores::default());
        assert_eq!(report.length_difference, 1);
        assert_eq!(report.granularity_difference, 2.0);
    }

    #[test]
    fn test_char_level_positional() {
        let scores = calculate_char_level_metrics(&["北京", "大学"], &["北京大学"]);
        assert_eq!(scores.precision, 1.0);
        assert_eq!(scores.recall, 1.0);

        // Um caractere inserido no início desloca todo o resto
        let scores = calculate_char_level_metrics(&["在", "北京"], &["北京"]);
        assert_eq!(scores.precision, 0.0);
        assert_eq!(scores.accuracy, scores.precision);
    }

    #[test]
    fn test_char_level_shorter_prediction() {
        let scores = calculate_char_level_metrics(&["北京"], &["北京", "大学"]);
        assert_eq!(scores.precision, 1.0);
        assert_eq!(scores.recall, 0.5);
    }

    #[test]
    fn test_historical_alias() {
        let pred = ["北京", "大学"];
        let gold = ["北京大学"];
        assert_eq!(calculate_word_level_metrics(&pred, &gold), calculate_char_level_metrics(&pred, &gold));
    }

    #[test]
    fn test_granularity_and_length() {
        let report = evaluate_segmentation(&["北京", "大学"], &["北京大学"]);
        assert_eq!(report.granularity_difference, 2.0);
        assert_eq!(report.length_difference, 1);
    }

    #[test]
    fn test_identical_sequences() {
        let tokens = vec!["中央电视台".to_string(), "播发".to_string(), "了".to_string()];
        let report = evaluate_segmentation(&tokens, &tokens);
        assert_eq!(report.word_level.precision, 1.0);
        assert_eq!(report.word_level.recall, 1.0);
        assert_eq!(report.word_level.accuracy, 1.0);
        assert!((report.word_level.f_score - 1.0).abs() < EPS);
        assert_eq!(report.granularity_difference, 0.0);
        assert_eq!(report.length_difference, 0);
    }

    #[test]
    fn test_report_serializes_nested() {
        let report = evaluate_segmentation(&["北京"], &["北京"]);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["word_level"]["precision"], 1.0);
        assert_eq!(json["length_difference"], 0);
    }
}
