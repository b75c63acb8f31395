//! Fixed asset paths and translation tables for derived card fields.

/// Prefix for site-relative asset paths. Empty means same-origin.
pub const ASSET_BASE_PATH: &str = "";

/// Stress cost badge shown on every domain card.
pub const DOMAIN_STRESS_IMAGE: &str = "/image/domain/stress-cost.avif";

pub const SPELLCAST_LABEL: &str = "Заклинатель";

/// Shown in place of a feature that has neither text nor a name.
pub const FALLBACK_FEATURE_NAME: &str = "Без названия";

/// Lowercased spellcast trait to its display name.
pub fn spellcast_trait_label(value: &str) -> Option<&'static str> {
    match value {
        "agility" => Some("Проворность"),
        "strength" => Some("Сила"),
        "finesse" => Some("Искусность"),
        "instinct" => Some("Инстинкт"),
        "presence" => Some("Влияние"),
        "knowledge" => Some("Знание"),
        _ => None,
    }
}

/// Lowercased domain card type to its display name.
pub fn domain_card_type_label(value: &str) -> Option<&'static str> {
    match value {
        "spell" => Some("Заклинание"),
        "ability" => Some("Умение"),
        _ => None,
    }
}
