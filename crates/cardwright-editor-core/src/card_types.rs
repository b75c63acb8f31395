//! Card type registry and the editable field set.

use serde::{Deserialize, Serialize};

pub use cardwright_common::TemplateCategory as CardTypeId;

/// Static capabilities and defaults of one card type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTypeConfig {
    pub id: CardTypeId,
    pub name: &'static str,
    pub card_label: &'static str,
    /// CSS classes every card of this type carries.
    pub base_classes: &'static [&'static str],
    /// First path segment of the card's page on the site.
    pub path_segment: &'static str,
    pub default_divider: Option<&'static str>,
    pub supports_banner: bool,
    pub supports_spellcast: bool,
    pub supports_tier: bool,
    pub supports_stress: bool,
    pub supports_data_class: bool,
    pub supports_data_domain: bool,
}

const ANCESTRY: CardTypeConfig = CardTypeConfig {
    id: CardTypeId::Ancestry,
    name: "Родословная",
    card_label: "Родословная",
    base_classes: &["ancestry"],
    path_segment: "ancestry",
    default_divider: Some("https://daggerheart.su/image/ancestry/divider.avif"),
    supports_banner: false,
    supports_spellcast: false,
    supports_tier: false,
    supports_stress: false,
    supports_data_class: false,
    supports_data_domain: false,
};

const COMMUNITY: CardTypeConfig = CardTypeConfig {
    id: CardTypeId::Community,
    name: "Сообщество",
    card_label: "Сообщество",
    base_classes: &["community"],
    path_segment: "community",
    default_divider: Some("https://daggerheart.su/image/community/divider.webp"),
    supports_banner: false,
    supports_spellcast: false,
    supports_tier: false,
    supports_stress: false,
    supports_data_class: false,
    supports_data_domain: false,
};

const SUBCLASS: CardTypeConfig = CardTypeConfig {
    id: CardTypeId::Subclass,
    name: "Подкласс",
    card_label: "Подкласс",
    base_classes: &["subclass"],
    path_segment: "subclass",
    default_divider: None,
    supports_banner: true,
    supports_spellcast: true,
    supports_tier: true,
    supports_stress: false,
    supports_data_class: true,
    supports_data_domain: false,
};

const DOMAIN_CARD: CardTypeConfig = CardTypeConfig {
    id: CardTypeId::DomainCard,
    name: "Карта Домена",
    card_label: "Карта Домена",
    base_classes: &["domain_card"],
    path_segment: "domain-card",
    default_divider: None,
    supports_banner: true,
    supports_spellcast: false,
    supports_tier: false,
    supports_stress: true,
    supports_data_class: false,
    supports_data_domain: true,
};

/// Every card type, in type-selector order.
pub const CARD_TYPE_LIST: [CardTypeConfig; 4] = [ANCESTRY, COMMUNITY, SUBCLASS, DOMAIN_CARD];

pub const DEFAULT_CARD_TYPE_ID: CardTypeId = CardTypeId::Ancestry;

/// Total over every [`CardTypeId`].
pub const fn card_type_config(id: CardTypeId) -> &'static CardTypeConfig {
    match id {
        CardTypeId::Ancestry => &ANCESTRY,
        CardTypeId::Community => &COMMUNITY,
        CardTypeId::Subclass => &SUBCLASS,
        CardTypeId::DomainCard => &DOMAIN_CARD,
    }
}

/// Editable projection of a card. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardFields {
    pub slug: String,
    pub custom_classes: String,
    pub data_source: String,
    pub data_class: String,
    pub data_domain: String,
    pub title: String,
    pub prelude: String,
    pub description: String,
    pub attribution: String,
    pub source: String,
    pub label: String,
    pub subclass_tier: String,
    pub spellcast: String,
    pub banner_image: String,
    pub banner_text: String,
    pub stress_image: String,
    pub stress_text: String,
    pub divider_image: String,
    pub button_href: String,
}

/// Names one field of [`CardFields`], for field-by-field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    Slug,
    CustomClasses,
    DataSource,
    DataClass,
    DataDomain,
    Title,
    Prelude,
    Description,
    Attribution,
    Source,
    Label,
    SubclassTier,
    Spellcast,
    BannerImage,
    BannerText,
    StressImage,
    StressText,
    DividerImage,
    ButtonHref,
}

impl CardField {
    pub const ALL: [CardField; 19] = [
        CardField::Slug,
        CardField::CustomClasses,
        CardField::DataSource,
        CardField::DataClass,
        CardField::DataDomain,
        CardField::Title,
        CardField::Prelude,
        CardField::Description,
        CardField::Attribution,
        CardField::Source,
        CardField::Label,
        CardField::SubclassTier,
        CardField::Spellcast,
        CardField::BannerImage,
        CardField::BannerText,
        CardField::StressImage,
        CardField::StressText,
        CardField::DividerImage,
        CardField::ButtonHref,
    ];

    /// The camelCase key used by the front-end.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CardField::Slug => "slug",
            CardField::CustomClasses => "customClasses",
            CardField::DataSource => "dataSource",
            CardField::DataClass => "dataClass",
            CardField::DataDomain => "dataDomain",
            CardField::Title => "title",
            CardField::Prelude => "prelude",
            CardField::Description => "description",
            CardField::Attribution => "attribution",
            CardField::Source => "source",
            CardField::Label => "label",
            CardField::SubclassTier => "subclassTier",
            CardField::Spellcast => "spellcast",
            CardField::BannerImage => "bannerImage",
            CardField::BannerText => "bannerText",
            CardField::StressImage => "stressImage",
            CardField::StressText => "stressText",
            CardField::DividerImage => "dividerImage",
            CardField::ButtonHref => "buttonHref",
        }
    }
}

impl std::fmt::Display for CardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown card field: {s}"))
    }
}

impl CardFields {
    pub fn get(&self, field: CardField) -> &str {
        match field {
            CardField::Slug => &self.slug,
            CardField::CustomClasses => &self.custom_classes,
            CardField::DataSource => &self.data_source,
            CardField::DataClass => &self.data_class,
            CardField::DataDomain => &self.data_domain,
            CardField::Title => &self.title,
            CardField::Prelude => &self.prelude,
            CardField::Description => &self.description,
            CardField::Attribution => &self.attribution,
            CardField::Source => &self.source,
            CardField::Label => &self.label,
            CardField::SubclassTier => &self.subclass_tier,
            CardField::Spellcast => &self.spellcast,
            CardField::BannerImage => &self.banner_image,
            CardField::BannerText => &self.banner_text,
            CardField::StressImage => &self.stress_image,
            CardField::StressText => &self.stress_text,
            CardField::DividerImage => &self.divider_image,
            CardField::ButtonHref => &self.button_href,
        }
    }

    pub fn get_mut(&mut self, field: CardField) -> &mut String {
        match field {
            CardField::Slug => &mut self.slug,
            CardField::CustomClasses => &mut self.custom_classes,
            CardField::DataSource => &mut self.data_source,
            CardField::DataClass => &mut self.data_class,
            CardField::DataDomain => &mut self.data_domain,
            CardField::Title => &mut self.title,
            CardField::Prelude => &mut self.prelude,
            CardField::Description => &mut self.description,
            CardField::Attribution => &mut self.attribution,
            CardField::Source => &mut self.source,
            CardField::Label => &mut self.label,
            CardField::SubclassTier => &mut self.subclass_tier,
            CardField::Spellcast => &mut self.spellcast,
            CardField::BannerImage => &mut self.banner_image,
            CardField::BannerText => &mut self.banner_text,
            CardField::StressImage => &mut self.stress_image,
            CardField::StressText => &mut self.stress_text,
            CardField::DividerImage => &mut self.divider_image,
            CardField::ButtonHref => &mut self.button_href,
        }
    }

    pub fn set(&mut self, field: CardField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }
}
