use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Target codes offered to users.
pub const SUPPORTED_TARGETS: &[&str] = &[
    "EN", "EN-US", "EN-GB", "ES", "FR", "DE", "IT", "PT", "PT-BR", "RU", "ZH", "JA", "KO", "AR",
];

static PROVIDER_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("EN-US", "EN-US"),
        ("EN-GB", "EN-GB"),
        ("EN", "EN-US"),
        ("ES", "ES"),
        ("FR", "FR"),
        ("DE", "DE"),
        ("IT", "IT"),
        ("PT", "PT-PT"),
        ("PT-BR", "PT-BR"),
        ("RU", "RU"),
        ("ZH", "ZH"),
        ("JA", "JA"),
        ("KO", "KO"),
        ("AR", "AR"),
    ])
});

/// Maps a user-facing language code to the code the provider expects.
/// Unknown codes are passed through upper-cased.
pub fn provider_language_code(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    PROVIDER_CODES
        .get(upper.as_str())
        .map(|c| c.to_string())
        .unwrap_or(upper)
}

pub fn is_supported_target(code: &str) -> bool {
    let upper = code.trim().to_uppercase();
    SUPPORTED_TARGETS.contains(&upper.as_str())
}
