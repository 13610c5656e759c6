//! User-facing text for page selection failures.

use crate::page_range::PageRangeError;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

/// Render a page selection error for the person who typed the selection.
pub fn describe(err: &PageRangeError, locale: Locale) -> String {
    match (err, locale) {
        (PageRangeError::OutOfRange { max, .. }, Locale::En) => format!(
            "Page number out of range. Please enter a page number between 1 and {}.",
            max
        ),
        (PageRangeError::OutOfRange { max, .. }, Locale::Fr) => format!(
            "Numéro de page hors limite. Veuillez entrer un numéro de page entre 1 et {}.",
            max
        ),
        (PageRangeError::InvalidFormat { .. }, Locale::En) => {
            "Please enter valid page numbers or ranges (for example 1,3,5 or 2-4).".to_string()
        }
        (PageRangeError::InvalidFormat { .. }, Locale::Fr) => {
            "Veuillez entrer des numéros de pages ou des plages valides (par exemple 1,3,5 ou 2-4)."
                .to_string()
        }
    }
}
