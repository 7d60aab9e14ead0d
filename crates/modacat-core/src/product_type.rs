//! Garment type classification from product names.

/// Keyword → canonical type, matched case-insensitively against the name.
/// Keys are the lowercase forms that appear inside catalog product names.
const TYPE_KEYWORDS: &[(&str, &str)] = &[
    ("шорты", "Шорты"),
    ("кроссовки", "Кроссовки"),
    ("футболка", "Футболка"),
    ("платье", "Платье"),
    ("брюки", "Брюки"),
    ("джинсы", "Джинсы"),
    ("куртка", "Куртка"),
    ("свитер", "Свитер"),
    ("рубашка", "Рубашка"),
    ("юбка", "Юбка"),
    ("сабо", "Сабо"),
    ("кеды", "Кеды"),
    ("ботинки", "Ботинки"),
    ("сапоги", "Сапоги"),
];

/// Classify a product name into a garment type, or `None` when no keyword
/// matches.
#[must_use]
pub fn classify_product_type(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    TYPE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|&(_, type_name)| type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_garment() {
        assert_eq!(
            classify_product_type("Шорты спортивные ESS 2 COLOR"),
            Some("Шорты")
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_product_type("КРОССОВКИ Air Max"), Some("Кроссовки"));
    }

    #[test]
    fn unknown_name_yields_none() {
        assert_eq!(classify_product_type("Аксессуар для волос"), None);
    }
}
