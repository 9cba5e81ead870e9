use crate::core::{DaoError, Result, Success};
use crate::micro::{
    MicroElement, MicroTypeConverter, format_date_time, parse_bool, parse_date_time, required_attribute,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditActionType {
    Create,
    Modify,
    Delete,
    Undelete,
    Execute,
}

impl AuditActionType {
    pub fn id(&self) -> &'static str {
        match self {
            AuditActionType::Create => "create",
            AuditActionType::Modify => "modify",
            AuditActionType::Delete => "delete",
            AuditActionType::Undelete => "undelete",
            AuditActionType::Execute => "execute",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "create" => Some(AuditActionType::Create),
            "modify" => Some(AuditActionType::Modify),
            "delete" => Some(AuditActionType::Delete),
            "undelete" => Some(AuditActionType::Undelete),
            "execute" => Some(AuditActionType::Execute),
            _ => None,
        }
    }
}

impl fmt::Display for AuditActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditItem {
    pub date_time: DateTime<Utc>,
    pub user_id: Option<String>,
    pub action_type: AuditActionType,
    pub success: Success,
    pub action: String,
}

impl AuditItem {
    pub fn new(user_id: Option<String>, action_type: AuditActionType, success: Success, action: impl Into<String>) -> Self {
        Self {
            date_time: Utc::now(),
            user_id,
            action_type,
            success,
            action: action.into(),
        }
    }
}

const ATTR_DATE_TIME: &str = "dt";
const ATTR_USER_ID: &str = "userid";
const ATTR_TYPE: &str = "type";
const ATTR_SUCCESS: &str = "success";

pub struct AuditItemMicroTypeConverter;

impl MicroTypeConverter for AuditItemMicroTypeConverter {
    type Native = AuditItem;

    fn to_micro_element(item: &AuditItem, tag_name: &str) -> MicroElement {
        let mut element = MicroElement::new(tag_name);
        element
            .set_attribute(ATTR_DATE_TIME, format_date_time(&item.date_time))
            .set_attribute_opt(ATTR_USER_ID, item.user_id.as_deref())
            .set_attribute(ATTR_TYPE, item.action_type.id())
            .set_attribute(ATTR_SUCCESS, item.success.is_success().to_string())
            .append_text(item.action.clone());
        element
    }

    fn to_native(element: &MicroElement) -> Result<AuditItem> {
        let type_id = required_attribute(element, ATTR_TYPE)?;
        let action_type = AuditActionType::from_id(type_id)
            .ok_or_else(|| DaoError::Conversion(format!("Unknown audit action type '{}'", type_id)))?;
        Ok(AuditItem {
            date_time: parse_date_time(required_attribute(element, ATTR_DATE_TIME)?)?,
            user_id: element.attribute(ATTR_USER_ID).map(str::to_string),
            action_type,
            success: Success::from_bool(parse_bool(element.attribute(ATTR_SUCCESS))),
            action: element.text_content(),
        })
    }
}
