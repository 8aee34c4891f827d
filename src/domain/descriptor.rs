use crate::domain::models::{CONFIG_LDAP_ID, FILTER_BASE_DN, FILTER_LDAP_FILTER, RESULT_FIELD};
use serde::Serialize;

/// A free-text field rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFieldDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

/// A described group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuiDescriptor {
    pub description: &'static str,
    pub fields: Vec<TextFieldDescriptor>,
}

/// Everything the host needs to render configuration and filter screens.
///
/// The descriptor never varies per instance or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub configuration: GuiDescriptor,
    #[serde(rename = "filterFields")]
    pub filter_fields: Vec<TextFieldDescriptor>,
    #[serde(rename = "availableFields")]
    pub available_fields: Vec<&'static str>,
}

pub fn source_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        type_name: "Custom LDAP Data Store",
        configuration: GuiDescriptor {
            description: "Configuration settings for the custom LDAP data store.",
            fields: vec![TextFieldDescriptor {
                name: CONFIG_LDAP_ID,
                description: "The system ID of the LDAP data store to use.",
            }],
        },
        // Filter text may carry host placeholders such as
        // (&(objectClass=group)(member:1.2.840.113556.1.4.1941:=${DN})(cn=grp-aws-*))
        filter_fields: vec![
            TextFieldDescriptor {
                name: FILTER_BASE_DN,
                description: "The base DN from which the search is based.",
            },
            TextFieldDescriptor {
                name: FILTER_LDAP_FILTER,
                description: "The LDAP filter to search with.",
            },
        ],
        available_fields: vec![RESULT_FIELD],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_fields() {
        let descriptor = source_descriptor();
        assert_eq!(descriptor.type_name, "Custom LDAP Data Store");
        let config_names: Vec<_> = descriptor.configuration.fields.iter().map(|f| f.name).collect();
        assert_eq!(config_names, vec!["LDAP ID"]);
        let filter_names: Vec<_> = descriptor.filter_fields.iter().map(|f| f.name).collect();
        assert_eq!(filter_names, vec!["Base DN", "Filter"]);
        assert_eq!(descriptor.available_fields, vec!["searchResult"]);
    }

    #[test]
    fn test_descriptor_is_constant() {
        assert_eq!(source_descriptor(), source_descriptor());
    }

    #[test]
    fn test_descriptor_json_shape() {
        let json = serde_json::to_value(source_descriptor()).unwrap();
        assert_eq!(json["type"], "Custom LDAP Data Store");
        assert_eq!(json["filterFields"][1]["name"], "Filter");
        assert_eq!(json["availableFields"], serde_json::json!(["searchResult"]));
    }
}
