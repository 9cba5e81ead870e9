use super::model::User;
use crate::core::{DaoError, Result};
use crate::locale::Locale;
use crate::micro::{
    MicroElement, MicroTypeConverter, date_time_attribute, format_date_time, parse_bool, required_attribute,
};
use chrono::Utc;

const ATTR_ID: &str = "id";
const ATTR_CREATIONDT: &str = "creationdt";
const ATTR_LASTMODDT: &str = "lastmoddt";
const ATTR_DELETIONDT: &str = "deletiondt";
const ATTR_DESIREDLOCALE: &str = "desiredlocale";
const ATTR_DELETED: &str = "deleted";
const ATTR_DISABLED: &str = "disabled";
const ELEMENT_LOGINNAME: &str = "loginname";
const ELEMENT_EMAILADDRESS: &str = "emailaddress";
const ELEMENT_PASSWORDHASH: &str = "passwordhash";
const ELEMENT_FIRSTNAME: &str = "firstname";
const ELEMENT_LASTNAME: &str = "lastname";
const ELEMENT_CUSTOM: &str = "custom";

pub struct UserMicroTypeConverter;

impl MicroTypeConverter for UserMicroTypeConverter {
    type Native = User;

    fn to_micro_element(user: &User, tag_name: &str) -> MicroElement {
        let mut element = MicroElement::new(tag_name);
        element
            .set_attribute(ATTR_ID, user.id())
            .set_attribute(ATTR_CREATIONDT, format_date_time(&user.creation_date_time()))
            .set_attribute_opt(ATTR_LASTMODDT, user.last_modification_date_time().map(|dt| format_date_time(&dt)))
            .set_attribute_opt(ATTR_DELETIONDT, user.deletion_date_time().map(|dt| format_date_time(&dt)));
        element.append_element(ELEMENT_LOGINNAME).append_text(user.login_name());
        element.append_element(ELEMENT_EMAILADDRESS).append_text(user.email_address());
        element.append_element(ELEMENT_PASSWORDHASH).append_text(user.password_hash());
        if let Some(first_name) = user.first_name() {
            element.append_element(ELEMENT_FIRSTNAME).append_text(first_name);
        }
        if let Some(last_name) = user.last_name() {
            element.append_element(ELEMENT_LASTNAME).append_text(last_name);
        }
        element.set_attribute_opt(ATTR_DESIREDLOCALE, user.desired_locale().map(|l| l.to_string()));
        for (name, value) in user.custom_attributes() {
            element
                .append_element(ELEMENT_CUSTOM)
                .set_attribute(ATTR_ID, name.as_str())
                .append_text(value.as_str());
        }
        element
            .set_attribute(ATTR_DELETED, user.is_deleted().to_string())
            .set_attribute(ATTR_DISABLED, user.is_disabled().to_string());
        element
    }

    fn to_native(element: &MicroElement) -> Result<User> {
        let child = |name: &str| {
            element.child_text_content(name).ok_or_else(|| {
                DaoError::Conversion(format!("User element is missing child '{}'", name))
            })
        };

        // Files written before creation times were stored get "now"
        let creation = date_time_attribute(element, ATTR_CREATIONDT)?.unwrap_or_else(Utc::now);
        let desired_locale = element
            .attribute(ATTR_DESIREDLOCALE)
            .map(|raw| raw.parse::<Locale>())
            .transpose()?;

        let mut builder = User::builder(
            child(ELEMENT_LOGINNAME)?,
            child(ELEMENT_EMAILADDRESS)?,
            child(ELEMENT_PASSWORDHASH)?,
        )
        .id(required_attribute(element, ATTR_ID)?)
        .creation_date_time(creation)
        .last_modification_date_time(date_time_attribute(element, ATTR_LASTMODDT)?)
        .deletion_date_time(date_time_attribute(element, ATTR_DELETIONDT)?)
        .first_name(element.child_text_content(ELEMENT_FIRSTNAME))
        .last_name(element.child_text_content(ELEMENT_LASTNAME))
        .desired_locale(desired_locale)
        .deleted(parse_bool(element.attribute(ATTR_DELETED)))
        .disabled(parse_bool(element.attribute(ATTR_DISABLED)));

        for custom in element.child_elements_named(ELEMENT_CUSTOM) {
            let name = required_attribute(custom, ATTR_ID)?;
            builder = builder.custom_attribute(name, custom.text_content());
        }
        builder.build()
    }
}
