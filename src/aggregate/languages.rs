use crate::error::{DashError, Result};
use crate::model::{LanguageBytes, LanguagePercentages, LanguageRank, LanguageShare, RepositoryTable};

/// Share of each language in `languages`, in input order.
///
/// A mapping whose bytes sum to zero has no meaningful shares and yields an
/// empty result.
pub fn language_percentages(languages: &LanguageBytes) -> LanguagePercentages {
    let total = languages.total();
    if total == 0 {
        return Vec::new();
    }
    languages
        .iter()
        .map(|(language, bytes)| LanguageShare {
            language: language.to_string(),
            fraction: bytes as f64 / total as f64,
        })
        .collect()
}

/// Sums byte counts per language across all inputs.
pub fn language_totals<'a, I>(repositories: I) -> LanguageBytes
where
    I: IntoIterator<Item = &'a LanguageBytes>,
{
    repositories.into_iter().fold(LanguageBytes::new(), |mut acc, languages| {
        for (language, bytes) in languages.iter() {
            acc.add(language, bytes);
        }
        acc
    })
}

pub fn user_language_percentages(table: &RepositoryTable) -> LanguagePercentages {
    language_percentages(&language_totals(table.iter().map(|r| &r.languages)))
}

/// Descending by fraction. `sort_by` is stable, so equal shares keep input order.
pub fn sort_descending(mut shares: LanguagePercentages) -> LanguagePercentages {
    shares.sort_by(|a, b| b.fraction.total_cmp(&a.fraction));
    shares
}

pub fn top_languages(sorted: &[LanguageShare], n: usize) -> &[LanguageShare] {
    &sorted[..n.min(sorted.len())]
}

/// Locates `language` in the descending order. Tied languages share the
/// position of the first of them: `position` counts strictly larger shares.
pub fn language_rank(sorted: &[LanguageShare], totals: &LanguageBytes, language: &str) -> Result<LanguageRank> {
    let index = sorted
        .iter()
        .position(|s| s.language == language)
        .ok_or_else(|| DashError::UnknownLanguage(language.to_string()))?;
    let fraction = sorted[index].fraction;
    let position = sorted.iter().filter(|s| s.fraction > fraction).count();
    let bytes = totals
        .get(language)
        .ok_or_else(|| DashError::UnknownLanguage(language.to_string()))?;

    Ok(LanguageRank {
        language: language.to_string(),
        position,
        bytes,
        fraction,
        next: sorted.get(index + 1).map(|s| s.language.clone()),
    })
}

/// Natural log of each byte count, for log-scale bar lengths. Zero counts are skipped.
pub fn log_bytes(languages: &LanguageBytes) -> Vec<(String, f64)> {
    languages
        .iter()
        .filter(|(_, bytes)| *bytes > 0)
        .map(|(language, bytes)| (language.to_string(), (bytes as f64).ln()))
        .collect()
}
