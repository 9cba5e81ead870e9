use crate::core::{Result, ensure_not_empty};
use crate::micro::{
    MicroElement, MicroTypeConverter, format_date_time, parse_bool, parse_date_time, required_attribute,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one execution of a system migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    id: String,
    executed_at: DateTime<Utc>,
    success: bool,
    error_message: Option<String>,
}

impl MigrationResult {
    pub fn new(
        id: impl Into<String>,
        executed_at: DateTime<Utc>,
        success: bool,
        error_message: Option<String>,
    ) -> Result<Self> {
        let id = id.into();
        ensure_not_empty(&id, "migration ID")?;
        Ok(Self {
            id,
            executed_at,
            success,
            error_message,
        })
    }

    pub fn create_success(id: impl Into<String>) -> Result<Self> {
        Self::new(id, Utc::now(), true, None)
    }

    pub fn create_failure(id: impl Into<String>, error_message: impl Into<String>) -> Result<Self> {
        Self::new(id, Utc::now(), false, Some(error_message.into()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

const ATTR_ID: &str = "id";
const ATTR_EXECUTION_DT: &str = "executiondt";
const ATTR_SUCCESS: &str = "success";
const ELEMENT_ERROR_MSG: &str = "errormsg";

pub struct MigrationResultMicroTypeConverter;

impl MicroTypeConverter for MigrationResultMicroTypeConverter {
    type Native = MigrationResult;

    fn to_micro_element(value: &MigrationResult, tag_name: &str) -> MicroElement {
        let mut element = MicroElement::new(tag_name);
        element
            .set_attribute(ATTR_ID, value.id.clone())
            .set_attribute(ATTR_EXECUTION_DT, format_date_time(&value.executed_at))
            .set_attribute(ATTR_SUCCESS, value.success.to_string());
        if let Some(message) = &value.error_message {
            element.append_element(ELEMENT_ERROR_MSG).append_text(message.clone());
        }
        element
    }

    fn to_native(element: &MicroElement) -> Result<MigrationResult> {
        MigrationResult::new(
            required_attribute(element, ATTR_ID)?,
            parse_date_time(required_attribute(element, ATTR_EXECUTION_DT)?)?,
            parse_bool(element.attribute(ATTR_SUCCESS)),
            element.child_text_content(ELEMENT_ERROR_MSG),
        )
    }
}
