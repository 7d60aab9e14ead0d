//! Known-brand lexicon used to recover brand names from free text.
//!
//! Card markup frequently omits a dedicated brand element, so extraction
//! falls back to matching the card text against this lexicon. The list is
//! injectable configuration (YAML), not control flow: extend
//! `config/brands.yaml` to teach the scraper new brands without code changes.

use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Brands shipped with the binary, used when no YAML file is supplied.
const BUILTIN_BRANDS: &[&str] = &[
    "Nike",
    "Adidas",
    "Puma",
    "Reebok",
    "Jordan",
    "Converse",
    "New Balance",
    "Vans",
    "Under Armour",
    "Asics",
    "Mizuno",
    "Skechers",
    "Fila",
    "Kappa",
    "Umbro",
    "Diadora",
    "Calvin Klein",
    "Tommy Hilfiger",
    "Lacoste",
    "Polo Ralph Lauren",
    "Hugo Boss",
    "Demix",
    "Outventure",
    "Baon",
    "Befree",
    "Mango",
    "Zara",
    "H&M",
    "Uniqlo",
    "Terranova",
    "Pepe Jeans",
    "Marco Tozzi",
    "Tamaris",
    "T.Taccardi",
    "Pierre Cardin",
];

#[derive(Debug, Deserialize)]
struct BrandsFile {
    brands: Vec<String>,
}

/// An ordered, case-insensitive brand name lexicon.
#[derive(Debug, Clone)]
pub struct BrandLexicon {
    brands: Vec<String>,
}

impl Default for BrandLexicon {
    fn default() -> Self {
        BrandLexicon {
            brands: BUILTIN_BRANDS.iter().map(|&s| s.to_owned()).collect(),
        }
    }
}

impl BrandLexicon {
    /// Build a lexicon from an explicit brand list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on empty or duplicate names.
    pub fn new(brands: Vec<String>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for brand in &brands {
            if brand.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "brand name must be non-empty".to_owned(),
                ));
            }
            if !seen.insert(brand.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate brand name: '{brand}'"
                )));
            }
        }
        Ok(BrandLexicon { brands })
    }

    /// Load and validate the brand lexicon from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails
    /// validation.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: BrandsFile = serde_yaml::from_str(&content)?;
        Self::new(file.brands)
    }

    /// Find a known brand mentioned anywhere in `text`.
    ///
    /// Whole-word matches are preferred over substring matches so that
    /// `"Vanskin"` does not resolve to `"Vans"` when another brand appears
    /// as a standalone word.
    #[must_use]
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        for brand in &self.brands {
            let brand_lower = brand.to_lowercase();
            if words.iter().any(|w| *w == brand_lower) {
                return Some(brand);
            }
        }
        for brand in &self.brands {
            if lower.contains(&brand.to_lowercase()) {
                return Some(brand);
            }
        }
        None
    }

    /// Match a brand as a prefix of `heading`, returning the brand and the
    /// remainder. Used to split single-line `<h1>` headings like
    /// `"Nike Air Max 270"` into brand and product name.
    #[must_use]
    pub fn split_prefix<'a>(&self, heading: &'a str) -> Option<(&str, &'a str)> {
        let lower = heading.to_lowercase();
        for brand in &self.brands {
            if lower.starts_with(&brand.to_lowercase()) {
                let rest = heading[brand.len()..].trim_start();
                return Some((brand, rest));
            }
        }
        None
    }

    /// Number of brands in the lexicon.
    #[must_use]
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lexicon_is_non_empty() {
        assert!(!BrandLexicon::default().is_empty());
    }

    #[test]
    fn finds_brand_as_whole_word() {
        let lex = BrandLexicon::default();
        assert_eq!(lex.find_in("Кроссовки Nike Air Max"), Some("Nike"));
    }

    #[test]
    fn finds_brand_case_insensitively() {
        let lex = BrandLexicon::default();
        assert_eq!(lex.find_in("кроссовки NIKE air"), Some("Nike"));
    }

    #[test]
    fn finds_multiword_brand_by_substring() {
        let lex = BrandLexicon::default();
        assert_eq!(lex.find_in("Кеды New Balance 574"), Some("New Balance"));
    }

    #[test]
    fn returns_none_when_no_brand_present() {
        let lex = BrandLexicon::default();
        assert_eq!(lex.find_in("Шорты спортивные без бренда"), None);
    }

    #[test]
    fn split_prefix_separates_brand_and_name() {
        let lex = BrandLexicon::default();
        let (brand, rest) = lex.split_prefix("Nike Air Max 270").unwrap();
        assert_eq!(brand, "Nike");
        assert_eq!(rest, "Air Max 270");
    }

    #[test]
    fn split_prefix_requires_leading_brand() {
        let lex = BrandLexicon::default();
        assert!(lex.split_prefix("Кроссовки Nike").is_none());
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = BrandLexicon::new(vec!["Cann".to_owned(), "cann".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("duplicate brand name"));
    }

    #[test]
    fn new_rejects_empty_name() {
        let err = BrandLexicon::new(vec!["  ".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn loads_lexicon_from_yaml_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("brands.yaml");
        assert!(
            path.exists(),
            "brands.yaml missing at {path:?} — required for this test"
        );
        let lex = BrandLexicon::from_yaml_file(&path).expect("brands.yaml must parse");
        assert!(!lex.is_empty());
    }
}
