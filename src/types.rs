use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// A goods introduction document, the payload carried in
/// [`SubmissionEnvelope::product_document`].
///
/// Unset fields are left out of the serialized form entirely.
#[skip_serializing_none]
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Document {
    pub description: Option<DocumentMeta>,
    #[builder(into)]
    pub doc_id: Option<String>,
    #[builder(into)]
    pub doc_status: Option<String>,
    #[builder(into)]
    pub doc_type: Option<String>,
    #[serde(rename = "importRequest")]
    pub import_request: Option<bool>,
    #[builder(into)]
    pub owner_inn: Option<String>,
    #[builder(into)]
    pub participant_inn: Option<String>,
    #[builder(into)]
    pub producer_inn: Option<String>,
    #[builder(into)]
    pub production_date: Option<String>,
    #[builder(into)]
    pub production_type: Option<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductItem>,
    #[builder(into)]
    pub reg_date: Option<String>,
    #[builder(into)]
    pub reg_number: Option<String>,
}

/// Serialized under the document's `description` key.
#[skip_serializing_none]
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DocumentMeta {
    #[builder(into)]
    #[serde(rename = "participantInn")]
    pub participant_inn: Option<String>,
}

/// One labeled unit inside a [`Document`].
#[skip_serializing_none]
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProductItem {
    #[builder(into)]
    pub certificate_document: Option<String>,
    #[builder(into)]
    pub certificate_document_date: Option<String>,
    #[builder(into)]
    pub certificate_document_number: Option<String>,
    #[builder(into)]
    pub owner_inn: Option<String>,
    #[builder(into)]
    pub producer_inn: Option<String>,
    #[builder(into)]
    pub production_date: Option<String>,
    #[builder(into)]
    pub tnved_code: Option<String>,
    #[builder(into)]
    pub uit_code: Option<String>,
    #[builder(into)]
    pub uitu_code: Option<String>,
}

/// Request body of the document creation endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SubmissionEnvelope {
    pub document_format: String,
    /// Standard base64 of the serialized [`Document`].
    pub product_document: String,
    pub product_group: String,
    pub signature: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Outcome reported by the registry.
///
/// For a non-2xx status `code` holds the status as text and `error_message`
/// the raw response body.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiReply {
    pub value: Option<String>,
    pub code: Option<String>,
    pub error_message: Option<String>,
    pub description: Option<String>,
}

impl ApiReply {
    /// Reply synthesized from a non-2xx HTTP status.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        Self {
            code: Some(status.to_string()),
            error_message: Some(body),
            ..Self::default()
        }
    }

    /// Whether `code` is an HTTP status outside `200..300`.
    ///
    /// Registry-defined codes that are not HTTP statuses are left to the caller.
    #[must_use]
    pub fn is_failure_status(&self) -> bool {
        self.code
            .as_deref()
            .and_then(|code| code.parse::<u16>().ok())
            .is_some_and(|status| (100..600).contains(&status) && !(200..300).contains(&status))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn only_set_fields_are_serialized() {
        let document = Document::builder().production_date("2024-01-01").build();

        let value = serde_json::to_value(&document).expect("serialize");
        assert_eq!(value, json!({ "production_date": "2024-01-01" }), "shape");

        let decoded: Document = serde_json::from_value(value.clone()).expect("deserialize");
        assert_eq!(
            serde_json::to_value(&decoded).expect("re-serialize"),
            value,
            "re-encoding is stable"
        );
    }

    #[test]
    fn wire_names_follow_registry_schema() {
        let document = Document {
            description: Some(DocumentMeta::builder().participant_inn("7701").build()),
            import_request: Some(true),
            products: vec![
                ProductItem::builder()
                    .tnved_code("6401")
                    .uit_code("010461")
                    .build(),
            ],
            ..Document::default()
        };

        let value = serde_json::to_value(&document).expect("serialize");
        assert_eq!(
            value,
            json!({
                "description": { "participantInn": "7701" },
                "importRequest": true,
                "products": [{ "tnved_code": "6401", "uit_code": "010461" }]
            }),
            "shape"
        );
    }

    #[test]
    fn envelope_type_field_is_renamed() {
        let envelope = SubmissionEnvelope {
            document_format: "MANUAL".to_owned(),
            product_document: "e30=".to_owned(),
            product_group: "shoes".to_owned(),
            signature: "sig".to_owned(),
            kind: "LP_INTRODUCE_GOODS".to_owned(),
        };

        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["type"], Value::from("LP_INTRODUCE_GOODS"), "type");
        assert!(value.get("kind").is_none(), "rust field name leaked");
    }

    #[test]
    fn status_reply_is_failure() {
        let reply = ApiReply::from_status(429, "rate exceeded".to_owned());

        assert_eq!(reply.code.as_deref(), Some("429"), "code");
        assert_eq!(reply.error_message.as_deref(), Some("rate exceeded"), "body");
        assert!(reply.value.is_none() && reply.description.is_none(), "unset");
        assert!(reply.is_failure_status(), "failure");
    }

    #[test]
    fn success_codes_are_not_failures() {
        let ok = ApiReply {
            code: Some("200".to_owned()),
            ..ApiReply::default()
        };
        let custom = ApiReply {
            code: Some("DOC_ACCEPTED".to_owned()),
            ..ApiReply::default()
        };

        assert!(!ok.is_failure_status(), "2xx");
        assert!(!custom.is_failure_status(), "non-numeric");
        assert!(!ApiReply::default().is_failure_status(), "absent");
    }
}
