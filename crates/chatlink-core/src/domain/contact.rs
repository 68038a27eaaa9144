use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A contact record as returned by a CRM search. Field names are CRM specific
/// (`mobilephone` on HubSpot, `Mobile` on Zoho), so they are kept as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmContact {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl CrmContact {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Non-blank values of the given phone-bearing fields, in field order.
    pub fn phone_values<'a>(
        &'a self,
        phone_fields: &'a [String],
    ) -> impl Iterator<Item = &'a str> + 'a {
        phone_fields.iter().filter_map(|name| self.field(name))
    }
}

#[cfg(test)]
mod tests {
    use super::CrmContact;

    #[test]
    fn phone_values_skips_blank_and_missing_fields() {
        let contact = CrmContact::new("1")
            .with_field("phone", "  ")
            .with_field("mobilephone", "(415) 555-2671");
        let fields = vec![
            "phone".to_string(),
            "mobilephone".to_string(),
            "hs_whatsapp_phone_number".to_string(),
        ];
        let values: Vec<&str> = contact.phone_values(&fields).collect();
        assert_eq!(values, vec!["(415) 555-2671"]);
    }
}
