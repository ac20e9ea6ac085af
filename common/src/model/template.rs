//! Templates: an ordered collection of blocks plus metadata.
//!
//! All operations return a new `Template` and leave the receiver untouched, so
//! callers can keep the previous value for undo or change detection.

use crate::error::{ReportError, Result};
use crate::model::block::{Block, BlockType};
use crate::model::sanitize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    Predefined,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    pub created_at: DateTime<Utc>,
    pub last_edited_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ReportError::MissingField("name".to_string()));
    }
    Ok(name.to_string())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

impl Template {
    /// An empty template. The name must not be blank.
    pub fn new(name: &str) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: required_name(name)?,
            description: String::new(),
            tags: Vec::new(),
            blocks: Vec::new(),
            created_at: now,
            last_edited_at: now,
            layout_type: None,
        })
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    fn position(&self, block_id: &str) -> Result<usize> {
        self.blocks
            .iter()
            .position(|b| b.id == block_id)
            .ok_or_else(|| ReportError::BlockNotFound(block_id.to_string()))
    }

    /// Blocks in render order. Equal `order` values keep insertion sequence.
    pub fn ordered_blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }

    /// One past the highest order in use, or 0 for an empty template.
    pub fn next_order(&self) -> i64 {
        self.blocks.iter().map(|b| b.order + 1).max().unwrap_or(0)
    }

    /// Appends a default block of `block_type`. Returns the new template and
    /// the id of the added block, which the caller selects.
    pub fn add_block(&self, block_type: BlockType) -> (Template, String) {
        let block = Block::new(block_type, self.next_order());
        let id = block.id.clone();
        let mut next = self.clone();
        next.blocks.push(block);
        (next, id)
    }

    /// Removes a block. Remaining orders are left as they are.
    pub fn remove_block(&self, block_id: &str) -> Result<Template> {
        let index = self.position(block_id)?;
        let mut next = self.clone();
        next.blocks.remove(index);
        Ok(next)
    }

    pub fn update_block_config(&self, block_id: &str, patch: &Map<String, Value>) -> Result<Template> {
        let index = self.position(block_id)?;
        let updated = self.blocks[index].update_config(patch)?;
        let mut next = self.clone();
        next.blocks[index] = updated;
        Ok(next)
    }

    /// Copies a block to the end of the render order. Returns the new
    /// template and the id of the copy.
    pub fn duplicate_block(&self, block_id: &str) -> Result<(Template, String)> {
        let index = self.position(block_id)?;
        let copy = self.blocks[index].duplicate(self.next_order());
        let id = copy.id.clone();
        let mut next = self.clone();
        next.blocks.push(copy);
        Ok((next, id))
    }

    /// Wraps `start..end` of one text field of a block in a variable token
    /// namespaced by the block type. `index` picks one item of a list field
    /// such as `bullets`. Returns the new template and the minted variable id.
    pub fn promote_selection(
        &self,
        block_id: &str,
        field: &str,
        index: Option<usize>,
        start: usize,
        end: usize,
        name: Option<&str>,
    ) -> Result<(Template, String)> {
        let block = &self.blocks[self.position(block_id)?];
        let block_type = block.block_type();
        let invalid = |reason: String| ReportError::InvalidConfig {
            block_type: block_type.to_string(),
            reason,
        };
        let mut config = block.config().to_value()?;
        let slot = match (config.get_mut(field), index) {
            (Some(slot), None) if slot.is_string() => slot,
            (Some(Value::Array(items)), Some(i)) => items
                .get_mut(i)
                .filter(|item| item.is_string())
                .ok_or_else(|| invalid(format!("`{}[{}]` is not a text item", field, i)))?,
            (Some(Value::Array(_)), None) => {
                return Err(invalid(format!("`{}` is a list; pick an item index", field)));
            }
            _ => return Err(invalid(format!("`{}` is not a text field", field))),
        };
        let text = slot.as_str().unwrap_or_default();
        let prefix = block_type.variable_prefix();
        let (promoted, id) = sanitize::promote_selection(text, start, end, name, Some(&prefix))
            .ok_or_else(|| invalid(format!("invalid selection {}..{} in `{}`", start, end, field)))?;
        *slot = Value::String(promoted);

        let mut patch = Map::new();
        if let Some(value) = config.get(field) {
            patch.insert(field.to_string(), value.clone());
        }
        Ok((self.update_block_config(block_id, &patch)?, id))
    }

    /// Applies a new sequence and renumbers orders densely from 0.
    ///
    /// `block_ids` must name every block exactly once.
    pub fn reorder_blocks(&self, block_ids: &[String]) -> Result<Template> {
        if block_ids.len() != self.blocks.len() {
            return Err(ReportError::InvalidReorder(format!(
                "expected {} block ids, got {}",
                self.blocks.len(),
                block_ids.len()
            )));
        }
        let mut reordered = Vec::with_capacity(block_ids.len());
        for (index, id) in block_ids.iter().enumerate() {
            if block_ids[..index].contains(id) {
                return Err(ReportError::InvalidReorder(format!("block {} listed twice", id)));
            }
            let mut block = self.block(id).cloned().ok_or_else(|| {
                ReportError::InvalidReorder(format!("block {} is not in the template", id))
            })?;
            block.order = index as i64;
            reordered.push(block);
        }
        let mut next = self.clone();
        next.blocks = reordered;
        Ok(next)
    }

    pub fn renamed(&self, name: &str) -> Result<Template> {
        let mut next = self.clone();
        next.name = required_name(name)?;
        Ok(next)
    }

    pub fn with_description(&self, description: &str) -> Template {
        let mut next = self.clone();
        next.description = description.trim().to_string();
        next
    }

    /// Tags are trimmed; blanks and repeats are dropped.
    pub fn with_tags(&self, tags: Vec<String>) -> Template {
        let mut next = self.clone();
        next.tags = clean_tags(tags);
        next
    }

    pub fn with_layout(&self, layout_type: Option<LayoutType>) -> Template {
        let mut next = self.clone();
        next.layout_type = layout_type;
        next
    }

    /// Stamps `last_edited_at`, as done on every save.
    pub fn touched(&self, now: DateTime<Utc>) -> Template {
        let mut next = self.clone();
        next.last_edited_at = now;
        next
    }

    /// A copy under a new id, with fresh block ids and timestamps.
    pub fn duplicate(&self) -> Template {
        let now = Utc::now();
        Template {
            id: Uuid::new_v4().to_string(),
            name: format!("{} (Copy)", self.name),
            description: self.description.clone(),
            tags: self.tags.clone(),
            blocks: self.blocks.iter().map(|b| b.duplicate(b.order)).collect(),
            created_at: now,
            last_edited_at: now,
            layout_type: self.layout_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::BlockConfig;
    use chrono::Duration;

    fn template_with_orders(orders: &[i64]) -> Template {
        let mut template = Template::new("Weekly").unwrap();
        for &order in orders {
            let mut block = Block::new(BlockType::CustomText, 0);
            block.order = order;
            template.blocks.push(block);
        }
        template
    }

    #[test]
    fn new_requires_a_name() {
        assert!(matches!(
            Template::new("   "),
            Err(ReportError::MissingField(field)) if field == "name"
        ));
        let template = Template::new(" Monthly report ").unwrap();
        assert_eq!(template.name, "Monthly report");
        assert_eq!(template.created_at, template.last_edited_at);
    }

    #[test]
    fn add_block_appends_after_highest_order() {
        let empty = Template::new("t").unwrap();
        let (one, first) = empty.add_block(BlockType::BasicInfo);
        assert!(empty.blocks.is_empty());
        assert_eq!(one.block(&first).unwrap().order, 0);

        let gapped = template_with_orders(&[3, 7]);
        let (next, id) = gapped.add_block(BlockType::Divider);
        assert_eq!(next.block(&id).unwrap().order, 8);
    }

    #[test]
    fn remove_keeps_gaps() {
        let template = template_with_orders(&[0, 1, 2]);
        let middle = template.blocks[1].id.clone();
        let next = template.remove_block(&middle).unwrap();
        let orders: Vec<i64> = next.blocks.iter().map(|b| b.order).collect();
        assert_eq!(orders, vec![0, 2]);
        assert!(matches!(
            next.remove_block(&middle),
            Err(ReportError::BlockNotFound(_))
        ));
    }

    #[test]
    fn reorder_normalizes_orders() {
        let template = template_with_orders(&[5, 2, 9]);
        let id5 = template.blocks[0].id.clone();
        let id2 = template.blocks[1].id.clone();
        let id9 = template.blocks[2].id.clone();

        let next = template
            .reorder_blocks(&[id9.clone(), id2.clone(), id5.clone()])
            .unwrap();
        assert_eq!(next.block(&id9).unwrap().order, 0);
        assert_eq!(next.block(&id2).unwrap().order, 1);
        assert_eq!(next.block(&id5).unwrap().order, 2);
    }

    #[test]
    fn reorder_rejects_partial_or_repeated_lists() {
        let template = template_with_orders(&[0, 1]);
        let a = template.blocks[0].id.clone();
        assert!(template.reorder_blocks(&[a.clone()]).is_err());
        assert!(template.reorder_blocks(&[a.clone(), a.clone()]).is_err());
        assert!(template.reorder_blocks(&[a, "ghost".into()]).is_err());
    }

    #[test]
    fn ties_fall_back_to_insertion_sequence() {
        let template = template_with_orders(&[1, 0, 1]);
        let ordered: Vec<&str> = template.ordered_blocks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(
            ordered,
            vec![
                template.blocks[1].id.as_str(),
                template.blocks[0].id.as_str(),
                template.blocks[2].id.as_str()
            ]
        );
    }

    #[test]
    fn duplicate_block_goes_last() {
        let template = template_with_orders(&[0, 4]);
        let source = template.blocks[0].id.clone();
        let (next, copy) = template.duplicate_block(&source).unwrap();
        assert_eq!(next.blocks.len(), 3);
        assert_eq!(next.block(&copy).unwrap().order, 5);
        assert_eq!(
            next.block(&copy).unwrap().config(),
            next.block(&source).unwrap().config()
        );
    }

    #[test]
    fn metadata_setters_are_pure() {
        let template = Template::new("A").unwrap();
        let renamed = template.renamed("B").unwrap();
        assert_eq!(template.name, "A");
        assert_eq!(renamed.name, "B");
        assert!(template.renamed("").is_err());

        let tagged = template.with_tags(vec![" vip ".into(), "".into(), "vip".into(), "new".into()]);
        assert_eq!(tagged.tags, vec!["vip".to_string(), "new".to_string()]);

        let described = template.with_description("  For cohort A ");
        assert_eq!(described.description, "For cohort A");
    }

    #[test]
    fn touched_moves_last_edited_only() {
        let template = Template::new("A").unwrap();
        let later = template.created_at + Duration::minutes(5);
        let saved = template.touched(later);
        assert_eq!(saved.last_edited_at, later);
        assert_eq!(saved.created_at, template.created_at);
    }

    #[test]
    fn duplicate_template_gets_fresh_ids() {
        let (template, block_id) = Template::new("A").unwrap().add_block(BlockType::CustomText);
        let copy = template.duplicate();
        assert_ne!(copy.id, template.id);
        assert_eq!(copy.name, "A (Copy)");
        assert_eq!(copy.blocks.len(), 1);
        assert_ne!(copy.blocks[0].id, block_id);
        assert!(matches!(copy.blocks[0].config(), BlockConfig::CustomText(_)));
    }

    #[test]
    fn promote_selection_rewrites_one_field() {
        let (template, id) = Template::new("A").unwrap().add_block(BlockType::CustomText);
        let patch = serde_json::json!({ "heading": "Hello Ana!" });
        let template = template
            .update_block_config(&id, patch.as_object().unwrap())
            .unwrap();

        let (next, variable) = template
            .promote_selection(&id, "heading", None, 6, 9, Some("Patient name"))
            .unwrap();
        assert_eq!(variable, "custom_text_patient_name");
        let BlockConfig::CustomText(config) = next.block(&id).unwrap().config() else {
            panic!("wrong variant");
        };
        assert_eq!(config.heading, "Hello {{custom_text_patient_name}}!");

        assert!(template.promote_selection(&id, "heading", None, 4, 4, None).is_err());
        assert!(template.promote_selection(&id, "nope", None, 0, 1, None).is_err());
        assert!(template.promote_selection(&id, "heading", Some(0), 0, 1, None).is_err());
    }

    #[test]
    fn promote_selection_targets_one_list_item() {
        let (template, id) = Template::new("A").unwrap().add_block(BlockType::PackagePromotion);
        let patch = serde_json::json!({ "bullets": ["Fast", "Only 3 sessions left", "Safe"] });
        let template = template
            .update_block_config(&id, patch.as_object().unwrap())
            .unwrap();

        let (next, variable) = template
            .promote_selection(&id, "bullets", Some(1), 5, 6, Some("sessions left"))
            .unwrap();
        assert_eq!(variable, "package_promotion_sessions_left");
        let BlockConfig::PackagePromotion(config) = next.block(&id).unwrap().config() else {
            panic!("wrong variant");
        };
        assert_eq!(
            config.bullets,
            vec!["Fast", "Only {{package_promotion_sessions_left}} sessions left", "Safe"]
        );

        assert!(template.promote_selection(&id, "bullets", None, 0, 1, None).is_err());
        assert!(template.promote_selection(&id, "bullets", Some(3), 0, 1, None).is_err());
    }

    #[test]
    fn referral_discount_takes_a_token() {
        let (template, id) = Template::new("A").unwrap().add_block(BlockType::ReferralOffer);
        let (next, variable) = template
            .promote_selection(&id, "discountPercentage", None, 0, 2, Some("discount"))
            .unwrap();
        assert_eq!(variable, "referral_offer_discount");
        let BlockConfig::ReferralOffer(config) = next.block(&id).unwrap().config() else {
            panic!("wrong variant");
        };
        assert_eq!(config.discount_percentage, "{{referral_offer_discount}}");
        assert_eq!(
            crate::model::publish::extract_variables(&next),
            vec!["referral_offer_discount"]
        );
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let template = Template::new("A").unwrap().with_layout(Some(LayoutType::Custom));
        let value = serde_json::to_value(&template).unwrap();
        assert!(value.get("lastEditedAt").is_some());
        assert_eq!(value["layoutType"], "custom");
        let back: Template = serde_json::from_value(value).unwrap();
        assert_eq!(back, template);
    }
}
