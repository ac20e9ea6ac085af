//! Content blocks: the closed set of block types, their typed configs and the
//! immutable operations the builder performs on a block.
//!
//! Every config struct lists its text fields through [`TextFields`]; that is
//! the single place the tokenizer, the variable scan and the per-row renderer
//! read block text from. Adding a block type means adding a variant to
//! [`BlockType`] and [`BlockConfig`], and every `match` below stops compiling
//! until it is handled.

use crate::error::{ReportError, Result};
use crate::model::token::{render_text, variable_ids};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    BasicInfo,
    InspirationZone,
    NextSession,
    MonthlySummary,
    ProgressConsistency,
    PackagePromotion,
    BeforeAfter,
    ReferralOffer,
    CustomText,
    TextImage,
    Divider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Predefined,
    Custom,
}

/// Palette entry for one block type.
#[derive(Debug, Clone, Serialize)]
pub struct BlockDefinition {
    pub id: BlockType,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BlockCategory,
    pub variable_prefix: String,
    pub default_config: BlockConfig,
}

impl BlockType {
    pub const ALL: [BlockType; 11] = [
        BlockType::BasicInfo,
        BlockType::InspirationZone,
        BlockType::NextSession,
        BlockType::MonthlySummary,
        BlockType::ProgressConsistency,
        BlockType::PackagePromotion,
        BlockType::BeforeAfter,
        BlockType::ReferralOffer,
        BlockType::CustomText,
        BlockType::TextImage,
        BlockType::Divider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::BasicInfo => "basic-info",
            BlockType::InspirationZone => "inspiration-zone",
            BlockType::NextSession => "next-session",
            BlockType::MonthlySummary => "monthly-summary",
            BlockType::ProgressConsistency => "progress-consistency",
            BlockType::PackagePromotion => "package-promotion",
            BlockType::BeforeAfter => "before-after",
            BlockType::ReferralOffer => "referral-offer",
            BlockType::CustomText => "custom-text",
            BlockType::TextImage => "text-image",
            BlockType::Divider => "divider",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockType::BasicInfo => "Basic Info",
            BlockType::InspirationZone => "Inspiration Zone",
            BlockType::NextSession => "Next Session",
            BlockType::MonthlySummary => "Monthly Summary",
            BlockType::ProgressConsistency => "Progress & Consistency",
            BlockType::PackagePromotion => "Package Promotion",
            BlockType::BeforeAfter => "Before & After",
            BlockType::ReferralOffer => "Referral Offer",
            BlockType::CustomText => "Custom Text",
            BlockType::TextImage => "Text & Image",
            BlockType::Divider => "Divider",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BlockType::BasicInfo => "Patient profile with weight, height, BMI and goal",
            BlockType::InspirationZone => "Playlist, leaderboard rank and journey motivation",
            BlockType::NextSession => "Upcoming session date, time and reschedule link",
            BlockType::MonthlySummary => "Attendance and sessions for the month",
            BlockType::ProgressConsistency => "Kilograms lost and consistency score",
            BlockType::PackagePromotion => "Treatment package offer with bullet points",
            BlockType::BeforeAfter => "Side by side before and after photos",
            BlockType::ReferralOffer => "Referral discount and link",
            BlockType::CustomText => "Free heading, subheading and body text",
            BlockType::TextImage => "Text next to an image",
            BlockType::Divider => "Horizontal separator",
        }
    }

    pub fn category(&self) -> BlockCategory {
        match self {
            BlockType::CustomText | BlockType::TextImage | BlockType::Divider => {
                BlockCategory::Custom
            }
            _ => BlockCategory::Predefined,
        }
    }

    /// Namespace for variables minted inside blocks of this type.
    pub fn variable_prefix(&self) -> String {
        self.as_str().replace('-', "_")
    }

    /// A fresh default config. Never shared between blocks.
    pub fn default_config(&self) -> BlockConfig {
        match self {
            BlockType::BasicInfo => BlockConfig::BasicInfo(BasicInfoConfig::default()),
            BlockType::InspirationZone => {
                BlockConfig::InspirationZone(InspirationZoneConfig::default())
            }
            BlockType::NextSession => BlockConfig::NextSession(NextSessionConfig::default()),
            BlockType::MonthlySummary => {
                BlockConfig::MonthlySummary(MonthlySummaryConfig::default())
            }
            BlockType::ProgressConsistency => {
                BlockConfig::ProgressConsistency(ProgressConsistencyConfig::default())
            }
            BlockType::PackagePromotion => {
                BlockConfig::PackagePromotion(PackagePromotionConfig::default())
            }
            BlockType::BeforeAfter => BlockConfig::BeforeAfter(BeforeAfterConfig::default()),
            BlockType::ReferralOffer => BlockConfig::ReferralOffer(ReferralOfferConfig::default()),
            BlockType::CustomText => BlockConfig::CustomText(CustomTextConfig::default()),
            BlockType::TextImage => BlockConfig::TextImage(TextImageConfig::default()),
            BlockType::Divider => BlockConfig::Divider(DividerConfig::default()),
        }
    }

    pub fn definition(&self) -> BlockDefinition {
        BlockDefinition {
            id: *self,
            name: self.name(),
            description: self.description(),
            category: self.category(),
            variable_prefix: self.variable_prefix(),
            default_config: self.default_config(),
        }
    }

    /// The full palette, predefined blocks first.
    pub fn catalog() -> Vec<BlockDefinition> {
        let mut defs: Vec<BlockDefinition> = Self::ALL.iter().map(|t| t.definition()).collect();
        defs.sort_by_key(|d| d.category == BlockCategory::Custom);
        defs
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ReportError::InvalidConfig {
                block_type: s.to_string(),
                reason: "unknown block type".to_string(),
            })
    }
}

/// Named text fields of a config, in declaration order.
pub trait TextFields {
    fn text_fields(&self) -> Vec<(&'static str, &str)>;
    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)>;
}

/// Text field that older clients may still send as a bare number.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid type: {}, expected a string or a number",
            other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasicInfoConfig {
    pub header_title: String,
    pub welcome_text: String,
    pub name: String,
    pub kg_from_goal: String,
    pub kg_away_text: String,
    pub current_weight_kg: String,
    pub height_cm: String,
    pub bmi: String,
    pub goal_weight_kg: String,
    pub weight_unit: String,
    pub height_unit: String,
}

impl Default for BasicInfoConfig {
    fn default() -> Self {
        Self {
            header_title: "Your Wellness Profile".into(),
            welcome_text: "Welcome back, ".into(),
            name: "{{name}}".into(),
            kg_from_goal: "{{kg_from_goal}}".into(),
            kg_away_text: " kg away from your goal!".into(),
            current_weight_kg: "{{current_weight_kg}}".into(),
            height_cm: "{{height_cm}}".into(),
            bmi: "{{bmi}}".into(),
            goal_weight_kg: "{{goal_weight_kg}}".into(),
            weight_unit: "kg".into(),
            height_unit: "cm".into(),
        }
    }
}

impl TextFields for BasicInfoConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("header_title", self.header_title.as_str()),
            ("welcome_text", self.welcome_text.as_str()),
            ("name", self.name.as_str()),
            ("kg_from_goal", self.kg_from_goal.as_str()),
            ("kg_away_text", self.kg_away_text.as_str()),
            ("current_weight_kg", self.current_weight_kg.as_str()),
            ("height_cm", self.height_cm.as_str()),
            ("bmi", self.bmi.as_str()),
            ("goal_weight_kg", self.goal_weight_kg.as_str()),
            ("weight_unit", self.weight_unit.as_str()),
            ("height_unit", self.height_unit.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("header_title", &mut self.header_title),
            ("welcome_text", &mut self.welcome_text),
            ("name", &mut self.name),
            ("kg_from_goal", &mut self.kg_from_goal),
            ("kg_away_text", &mut self.kg_away_text),
            ("current_weight_kg", &mut self.current_weight_kg),
            ("height_cm", &mut self.height_cm),
            ("bmi", &mut self.bmi),
            ("goal_weight_kg", &mut self.goal_weight_kg),
            ("weight_unit", &mut self.weight_unit),
            ("height_unit", &mut self.height_unit),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspirationZoneConfig {
    #[serde(rename = "playlistDescription")]
    pub playlist_description: String,
    #[serde(rename = "playlistUrl")]
    pub playlist_url: String,
    pub leaderboard_rank: String,
    pub journey_reason: String,
    pub weeks_to_important_event: u32,
    #[serde(rename = "motivationalLine")]
    pub motivational_line: String,
}

impl Default for InspirationZoneConfig {
    fn default() -> Self {
        Self {
            playlist_description: "Your workout playlist for this week".into(),
            playlist_url: String::new(),
            leaderboard_rank: "{{leaderboard_rank}}".into(),
            journey_reason: "{{journey_reason}}".into(),
            weeks_to_important_event: 0,
            motivational_line: "Every session brings you closer.".into(),
        }
    }
}

impl TextFields for InspirationZoneConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("playlistDescription", self.playlist_description.as_str()),
            ("playlistUrl", self.playlist_url.as_str()),
            ("leaderboard_rank", self.leaderboard_rank.as_str()),
            ("journey_reason", self.journey_reason.as_str()),
            ("motivationalLine", self.motivational_line.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("playlistDescription", &mut self.playlist_description),
            ("playlistUrl", &mut self.playlist_url),
            ("leaderboard_rank", &mut self.leaderboard_rank),
            ("journey_reason", &mut self.journey_reason),
            ("motivationalLine", &mut self.motivational_line),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NextSessionConfig {
    #[serde(rename = "sessionDate")]
    pub session_date: String,
    #[serde(rename = "sessionTime")]
    pub session_time: String,
    #[serde(rename = "daysUntil")]
    pub days_until: String,
    #[serde(rename = "ctaText")]
    pub cta_text: String,
    #[serde(rename = "rescheduleUrl")]
    pub reschedule_url: String,
}

impl Default for NextSessionConfig {
    fn default() -> Self {
        Self {
            session_date: String::new(),
            session_time: String::new(),
            days_until: String::new(),
            cta_text: "Reschedule Session".into(),
            reschedule_url: String::new(),
        }
    }
}

impl TextFields for NextSessionConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("sessionDate", self.session_date.as_str()),
            ("sessionTime", self.session_time.as_str()),
            ("daysUntil", self.days_until.as_str()),
            ("ctaText", self.cta_text.as_str()),
            ("rescheduleUrl", self.reschedule_url.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("sessionDate", &mut self.session_date),
            ("sessionTime", &mut self.session_time),
            ("daysUntil", &mut self.days_until),
            ("ctaText", &mut self.cta_text),
            ("rescheduleUrl", &mut self.reschedule_url),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonthlySummaryConfig {
    pub title: String,
    pub attendance: String,
    pub sessions_completed: String,
    pub commentary: String,
}

impl Default for MonthlySummaryConfig {
    fn default() -> Self {
        Self {
            title: "Your {{month}} Summary".into(),
            attendance: "{{attendance}}".into(),
            sessions_completed: "{{sessions_completed}}".into(),
            commentary: "Great work this month!".into(),
        }
    }
}

impl TextFields for MonthlySummaryConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("title", self.title.as_str()),
            ("attendance", self.attendance.as_str()),
            ("sessions_completed", self.sessions_completed.as_str()),
            ("commentary", self.commentary.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("title", &mut self.title),
            ("attendance", &mut self.attendance),
            ("sessions_completed", &mut self.sessions_completed),
            ("commentary", &mut self.commentary),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressConsistencyConfig {
    #[serde(rename = "totalKgLost")]
    pub total_kg_lost: f64,
    #[serde(rename = "consistencyScore")]
    pub consistency_score: f64,
    #[serde(rename = "motivationalText")]
    pub motivational_text: String,
}

impl Default for ProgressConsistencyConfig {
    fn default() -> Self {
        Self {
            total_kg_lost: 1.0,
            consistency_score: 85.0,
            motivational_text: "You're doing great!".into(),
        }
    }
}

impl TextFields for ProgressConsistencyConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("motivationalText", self.motivational_text.as_str())]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![("motivationalText", &mut self.motivational_text)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagePromotionConfig {
    pub title: String,
    pub description: String,
    pub bullets: Vec<String>,
    #[serde(rename = "buttonText")]
    pub button_text: String,
    #[serde(rename = "advisorUrl")]
    pub advisor_url: String,
    #[serde(rename = "promoImageUrl")]
    pub promo_image_url: String,
}

impl Default for PackagePromotionConfig {
    fn default() -> Self {
        Self {
            title: "Cryo360: Freeze Away Fat".into(),
            description: "Shape your body and elevate your life journey".into(),
            bullets: vec![
                "Non-invasive fat reduction".into(),
                "No surgery or downtime".into(),
                "Precise temperature control".into(),
                "Safe & FDA-approved technology".into(),
            ],
            button_text: "Talk to an advisor".into(),
            advisor_url: "#".into(),
            promo_image_url: String::new(),
        }
    }
}

impl TextFields for PackagePromotionConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
        ];
        fields.extend(self.bullets.iter().map(|b| ("bullets", b.as_str())));
        fields.extend([
            ("buttonText", self.button_text.as_str()),
            ("advisorUrl", self.advisor_url.as_str()),
            ("promoImageUrl", self.promo_image_url.as_str()),
        ]);
        fields
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        let mut fields = vec![("title", &mut self.title), ("description", &mut self.description)];
        fields.extend(self.bullets.iter_mut().map(|b| ("bullets", b)));
        fields.extend([
            ("buttonText", &mut self.button_text),
            ("advisorUrl", &mut self.advisor_url),
            ("promoImageUrl", &mut self.promo_image_url),
        ]);
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeforeAfterConfig {
    #[serde(rename = "beforeCaption")]
    pub before_caption: String,
    #[serde(rename = "afterCaption")]
    pub after_caption: String,
    #[serde(rename = "beforeImageUrl")]
    pub before_image_url: String,
    #[serde(rename = "afterImageUrl")]
    pub after_image_url: String,
}

impl Default for BeforeAfterConfig {
    fn default() -> Self {
        Self {
            before_caption: "Before".into(),
            after_caption: "After".into(),
            before_image_url: String::new(),
            after_image_url: String::new(),
        }
    }
}

impl TextFields for BeforeAfterConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("beforeCaption", self.before_caption.as_str()),
            ("afterCaption", self.after_caption.as_str()),
            ("beforeImageUrl", self.before_image_url.as_str()),
            ("afterImageUrl", self.after_image_url.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("beforeCaption", &mut self.before_caption),
            ("afterCaption", &mut self.after_caption),
            ("beforeImageUrl", &mut self.before_image_url),
            ("afterImageUrl", &mut self.after_image_url),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferralOfferConfig {
    #[serde(rename = "discountPercentage", deserialize_with = "string_or_number")]
    pub discount_percentage: String,
    #[serde(rename = "referralUrl")]
    pub referral_url: String,
}

impl Default for ReferralOfferConfig {
    fn default() -> Self {
        Self {
            discount_percentage: "20".into(),
            referral_url: "#".into(),
        }
    }
}

impl TextFields for ReferralOfferConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("discountPercentage", self.discount_percentage.as_str()),
            ("referralUrl", self.referral_url.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("discountPercentage", &mut self.discount_percentage),
            ("referralUrl", &mut self.referral_url),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomTextConfig {
    pub heading: String,
    pub subheading: String,
    #[serde(rename = "bodyText")]
    pub body_text: String,
}

impl TextFields for CustomTextConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("heading", self.heading.as_str()),
            ("subheading", self.subheading.as_str()),
            ("bodyText", self.body_text.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("heading", &mut self.heading),
            ("subheading", &mut self.subheading),
            ("bodyText", &mut self.body_text),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextImageConfig {
    pub heading: String,
    pub subheading: String,
    #[serde(rename = "bodyText")]
    pub body_text: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl TextFields for TextImageConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("heading", self.heading.as_str()),
            ("subheading", self.subheading.as_str()),
            ("bodyText", self.body_text.as_str()),
            ("imageUrl", self.image_url.as_str()),
        ]
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        vec![
            ("heading", &mut self.heading),
            ("subheading", &mut self.subheading),
            ("bodyText", &mut self.body_text),
            ("imageUrl", &mut self.image_url),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DividerConfig {}

impl TextFields for DividerConfig {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn text_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        Vec::new()
    }
}

/// Typed config of a block. Serializes as the bare config object; the block
/// type travels next to it in [`Block`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockConfig {
    BasicInfo(BasicInfoConfig),
    InspirationZone(InspirationZoneConfig),
    NextSession(NextSessionConfig),
    MonthlySummary(MonthlySummaryConfig),
    ProgressConsistency(ProgressConsistencyConfig),
    PackagePromotion(PackagePromotionConfig),
    BeforeAfter(BeforeAfterConfig),
    ReferralOffer(ReferralOfferConfig),
    CustomText(CustomTextConfig),
    TextImage(TextImageConfig),
    Divider(DividerConfig),
}

impl BlockConfig {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockConfig::BasicInfo(_) => BlockType::BasicInfo,
            BlockConfig::InspirationZone(_) => BlockType::InspirationZone,
            BlockConfig::NextSession(_) => BlockType::NextSession,
            BlockConfig::MonthlySummary(_) => BlockType::MonthlySummary,
            BlockConfig::ProgressConsistency(_) => BlockType::ProgressConsistency,
            BlockConfig::PackagePromotion(_) => BlockType::PackagePromotion,
            BlockConfig::BeforeAfter(_) => BlockType::BeforeAfter,
            BlockConfig::ReferralOffer(_) => BlockType::ReferralOffer,
            BlockConfig::CustomText(_) => BlockType::CustomText,
            BlockConfig::TextImage(_) => BlockType::TextImage,
            BlockConfig::Divider(_) => BlockType::Divider,
        }
    }

    fn fields(&self) -> &dyn TextFields {
        match self {
            BlockConfig::BasicInfo(c) => c,
            BlockConfig::InspirationZone(c) => c,
            BlockConfig::NextSession(c) => c,
            BlockConfig::MonthlySummary(c) => c,
            BlockConfig::ProgressConsistency(c) => c,
            BlockConfig::PackagePromotion(c) => c,
            BlockConfig::BeforeAfter(c) => c,
            BlockConfig::ReferralOffer(c) => c,
            BlockConfig::CustomText(c) => c,
            BlockConfig::TextImage(c) => c,
            BlockConfig::Divider(c) => c,
        }
    }

    fn fields_mut(&mut self) -> &mut dyn TextFields {
        match self {
            BlockConfig::BasicInfo(c) => c,
            BlockConfig::InspirationZone(c) => c,
            BlockConfig::NextSession(c) => c,
            BlockConfig::MonthlySummary(c) => c,
            BlockConfig::ProgressConsistency(c) => c,
            BlockConfig::PackagePromotion(c) => c,
            BlockConfig::BeforeAfter(c) => c,
            BlockConfig::ReferralOffer(c) => c,
            BlockConfig::CustomText(c) => c,
            BlockConfig::TextImage(c) => c,
            BlockConfig::Divider(c) => c,
        }
    }

    /// Every string-valued field, in declaration order.
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        self.fields().text_fields()
    }

    /// Token ids used anywhere in this config, repeats included.
    pub fn variable_ids(&self) -> Vec<String> {
        self.text_fields()
            .into_iter()
            .flat_map(|(_, text)| variable_ids(text).map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// A copy with every resolvable token substituted.
    pub fn rendered<F>(&self, mut lookup: F) -> BlockConfig
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut copy = self.clone();
        for (_, text) in copy.fields_mut().text_fields_mut() {
            *text = render_text(text, &mut lookup);
        }
        copy
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parses a JSON config object for the given block type. Missing keys take
    /// the type's defaults; unknown keys are rejected.
    pub fn from_value(block_type: BlockType, value: Value) -> Result<BlockConfig> {
        let invalid = |e: serde_json::Error| ReportError::InvalidConfig {
            block_type: block_type.to_string(),
            reason: e.to_string(),
        };
        let config = match block_type {
            BlockType::BasicInfo => {
                BlockConfig::BasicInfo(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::InspirationZone => {
                BlockConfig::InspirationZone(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::NextSession => {
                BlockConfig::NextSession(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::MonthlySummary => {
                BlockConfig::MonthlySummary(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::ProgressConsistency => {
                BlockConfig::ProgressConsistency(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::PackagePromotion => {
                BlockConfig::PackagePromotion(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::BeforeAfter => {
                BlockConfig::BeforeAfter(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::ReferralOffer => {
                BlockConfig::ReferralOffer(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::CustomText => {
                BlockConfig::CustomText(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::TextImage => {
                BlockConfig::TextImage(serde_json::from_value(value).map_err(invalid)?)
            }
            BlockType::Divider => {
                BlockConfig::Divider(serde_json::from_value(value).map_err(invalid)?)
            }
        };
        Ok(config)
    }

    /// Shallow merge: keys in `patch` replace the current values, the rest
    /// are kept.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<BlockConfig> {
        let block_type = self.block_type();
        let mut current = match self.to_value()? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            if !current.contains_key(key) {
                return Err(ReportError::InvalidConfig {
                    block_type: block_type.to_string(),
                    reason: format!("unknown field `{}`", key),
                });
            }
            current.insert(key.clone(), value.clone());
        }
        Self::from_value(block_type, Value::Object(current))
    }

    /// Plain-text rendering used for message bodies. Empty fields are skipped.
    pub fn to_message_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut push = |line: String| {
            if !line.trim().is_empty() {
                lines.push(line);
            }
        };
        match self {
            BlockConfig::BasicInfo(c) => {
                push(format!("*{}*", c.header_title));
                push(format!("{}{}!", c.welcome_text, c.name));
                push(format!("You're {}{}", c.kg_from_goal, c.kg_away_text));
                push(format!("Current weight: {} {}", c.current_weight_kg, c.weight_unit));
                push(format!("Height: {} {}", c.height_cm, c.height_unit));
                push(format!("BMI: {}", c.bmi));
                push(format!("Goal weight: {} {}", c.goal_weight_kg, c.weight_unit));
            }
            BlockConfig::InspirationZone(c) => {
                push(c.playlist_description.clone());
                push(c.playlist_url.clone());
                push(format!("Leaderboard rank: #{}", c.leaderboard_rank));
                push(format!("Your why: {}", c.journey_reason));
                if c.weeks_to_important_event > 0 {
                    push(format!(
                        "{} weeks to your important event",
                        c.weeks_to_important_event
                    ));
                }
                push(c.motivational_line.clone());
            }
            BlockConfig::NextSession(c) => {
                push(format!("Next session: {} {}", c.session_date, c.session_time));
                if !c.days_until.trim().is_empty() {
                    push(format!("In {} days", c.days_until));
                }
                push(format!("{}: {}", c.cta_text, c.reschedule_url));
            }
            BlockConfig::MonthlySummary(c) => {
                push(format!("*{}*", c.title));
                push(format!("Attendance: {}", c.attendance));
                push(format!("Sessions completed: {}", c.sessions_completed));
                push(c.commentary.clone());
            }
            BlockConfig::ProgressConsistency(c) => {
                push(format!("Total lost: {} kg", c.total_kg_lost));
                push(format!("Consistency score: {}%", c.consistency_score));
                push(c.motivational_text.clone());
            }
            BlockConfig::PackagePromotion(c) => {
                push(format!("*{}*", c.title));
                push(c.description.clone());
                for bullet in &c.bullets {
                    push(format!("• {}", bullet));
                }
                push(format!("{}: {}", c.button_text, c.advisor_url));
            }
            BlockConfig::BeforeAfter(c) => {
                push(format!("{}: {}", c.before_caption, c.before_image_url));
                push(format!("{}: {}", c.after_caption, c.after_image_url));
            }
            BlockConfig::ReferralOffer(c) => {
                push(format!(
                    "Refer a friend and get {}% off: {}",
                    c.discount_percentage, c.referral_url
                ));
            }
            BlockConfig::CustomText(c) => {
                push(c.heading.clone());
                push(c.subheading.clone());
                push(c.body_text.clone());
            }
            BlockConfig::TextImage(c) => {
                push(c.heading.clone());
                push(c.subheading.clone());
                push(c.body_text.clone());
                push(c.image_url.clone());
            }
            BlockConfig::Divider(_) => push("──────────".to_string()),
        }
        lines
    }
}

/// One content unit of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlockRecord", into = "BlockRecord")]
pub struct Block {
    pub id: String,
    pub order: i64,
    config: BlockConfig,
}

/// Wire shape of a block: `{ id, type, order, config }`.
#[derive(Serialize, Deserialize)]
struct BlockRecord {
    id: String,
    #[serde(rename = "type")]
    block_type: BlockType,
    order: i64,
    #[serde(default)]
    config: Value,
}

impl TryFrom<BlockRecord> for Block {
    type Error = ReportError;

    fn try_from(record: BlockRecord) -> Result<Self> {
        let value = match record.config {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Ok(Block {
            id: record.id,
            order: record.order,
            config: BlockConfig::from_value(record.block_type, value)?,
        })
    }
}

impl From<Block> for BlockRecord {
    fn from(block: Block) -> Self {
        let config = serde_json::to_value(&block.config).unwrap_or(Value::Null);
        BlockRecord {
            id: block.id,
            block_type: block.config.block_type(),
            order: block.order,
            config,
        }
    }
}

fn new_block_id() -> String {
    format!("block-{}", Uuid::new_v4())
}

impl Block {
    /// A new block with a fresh id and the type's default config.
    pub fn new(block_type: BlockType, order: i64) -> Self {
        Self {
            id: new_block_id(),
            order,
            config: block_type.default_config(),
        }
    }

    pub fn with_config(id: impl Into<String>, order: i64, config: BlockConfig) -> Self {
        Self {
            id: id.into(),
            order,
            config,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.config.block_type()
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    /// A new block with `patch` shallow-merged into the config. `self` is not
    /// touched.
    pub fn update_config(&self, patch: &Map<String, Value>) -> Result<Block> {
        Ok(Block {
            id: self.id.clone(),
            order: self.order,
            config: self.config.merged(patch)?,
        })
    }

    /// Deep copy with a new id and order.
    pub fn duplicate(&self, order: i64) -> Block {
        Block {
            id: new_block_id(),
            order,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn every_type_round_trips_through_its_name() {
        for block_type in BlockType::ALL {
            assert_eq!(block_type.as_str().parse::<BlockType>().unwrap(), block_type);
            assert_eq!(block_type.default_config().block_type(), block_type);
        }
        assert!("calendar".parse::<BlockType>().is_err());
    }

    #[test]
    fn catalog_lists_predefined_first() {
        let catalog = BlockType::catalog();
        assert_eq!(catalog.len(), 11);
        let first_custom = catalog
            .iter()
            .position(|d| d.category == BlockCategory::Custom)
            .unwrap();
        assert_eq!(first_custom, 8);
        assert!(catalog[first_custom..].iter().all(|d| d.category == BlockCategory::Custom));
        assert_eq!(BlockType::BasicInfo.variable_prefix(), "basic_info");
    }

    #[test]
    fn new_blocks_get_distinct_ids_and_own_configs() {
        let a = Block::new(BlockType::PackagePromotion, 0);
        let b = Block::new(BlockType::PackagePromotion, 1);
        assert_ne!(a.id, b.id);
        assert_eq!(a.config(), b.config());
        assert!(a.id.starts_with("block-"));
    }

    #[test]
    fn update_config_merges_without_mutating() {
        let block = Block::new(BlockType::CustomText, 0);
        let updated = block
            .update_config(&object(json!({ "heading": "Hello {{name}}" })))
            .unwrap();

        let BlockConfig::CustomText(original) = block.config() else {
            panic!("wrong variant");
        };
        let BlockConfig::CustomText(changed) = updated.config() else {
            panic!("wrong variant");
        };
        assert_eq!(original.heading, "");
        assert_eq!(changed.heading, "Hello {{name}}");
        assert_eq!(changed.subheading, original.subheading);
        assert_eq!(updated.id, block.id);
    }

    #[test]
    fn update_config_rejects_unknown_or_mistyped_fields() {
        let block = Block::new(BlockType::ReferralOffer, 0);
        let err = block.update_config(&object(json!({ "colour": "red" }))).unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig { .. }));

        let err = block
            .update_config(&object(json!({ "discountPercentage": ["35"] })))
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig { .. }));

        let ok = block
            .update_config(&object(json!({ "discountPercentage": 35 })))
            .unwrap();
        assert_eq!(ok.config().to_value().unwrap()["discountPercentage"], "35");

        let tokenized = block
            .update_config(&object(json!({ "discountPercentage": "{{referral_offer_discount}}" })))
            .unwrap();
        assert_eq!(
            tokenized.config().to_value().unwrap()["discountPercentage"],
            "{{referral_offer_discount}}"
        );
    }

    #[test]
    fn duplicate_isolates_nested_lists() {
        let original = Block::new(BlockType::PackagePromotion, 0)
            .update_config(&object(json!({ "bullets": ["a", "b"] })))
            .unwrap();
        let mut copy = original.duplicate(1);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.order, 1);

        if let BlockConfig::PackagePromotion(config) = &mut copy.config {
            config.bullets.push("c".into());
            config.bullets[0] = "changed".into();
        }

        let BlockConfig::PackagePromotion(config) = original.config() else {
            panic!("wrong variant");
        };
        assert_eq!(config.bullets, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn text_fields_feed_variable_scan() {
        let block = Block::new(BlockType::PackagePromotion, 0)
            .update_config(&object(json!({
                "title": "Hi {{name}}",
                "bullets": ["{{bmi}} now", "plain"],
            })))
            .unwrap();
        assert_eq!(block.config().variable_ids(), vec!["name", "bmi"]);
        assert!(BlockType::Divider.default_config().variable_ids().is_empty());
    }

    #[test]
    fn rendered_substitutes_all_text_fields() {
        let config = BlockType::BasicInfo.default_config();
        let rendered = config.rendered(|id| match id {
            "name" => Some("Ana".into()),
            "bmi" => Some("22.1".into()),
            _ => None,
        });
        let BlockConfig::BasicInfo(c) = rendered else {
            panic!("wrong variant");
        };
        assert_eq!(c.name, "Ana");
        assert_eq!(c.bmi, "22.1");
        assert_eq!(c.height_cm, "{{height_cm}}");
    }

    #[test]
    fn block_wire_format_carries_type() {
        let block = Block::new(BlockType::Divider, 3);
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], json!("divider"));
        assert_eq!(value["order"], json!(3));
        assert_eq!(value["config"], json!({}));

        let parsed: Block = serde_json::from_value(json!({
            "id": "b1",
            "type": "custom-text",
            "order": 0,
            "config": { "heading": "Hey" }
        }))
        .unwrap();
        assert_eq!(parsed.block_type(), BlockType::CustomText);
        assert_eq!(parsed.config().text_fields()[0], ("heading", "Hey"));
    }
}
