use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Accepts a JSON string or number and keeps it as text.
///
/// The backend names items after their sensor files, so ids are usually
/// strings, but hand-written fixtures and older deployments send numbers.
fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub(crate) struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let id = text_or_number(d)?;
        if id.trim().is_empty() {
            return Err(serde::de::Error::custom("item id must not be empty"));
        }
        Ok(Self(id))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One warehouse record as served by `GET /items`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Item {
    pub id: ItemId,

    #[serde(default)]
    pub ime: String,

    /// Latest sensor reading. Read-only here.
    #[serde(default, deserialize_with = "text_or_number")]
    pub kolicina: String,

    #[serde(default)]
    pub lokacija: String,

    #[serde(default)]
    pub komentar: Option<String>,

    /// When the reading in `kolicina` was taken (backend local time).
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The three user-editable fields of an item.
///
/// Doubles as the `PUT /items/{id}` request body.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct EditableFields {
    pub ime: String,
    pub lokacija: String,
    pub komentar: String,
}

impl EditableFields {
    pub fn from_item(item: &Item) -> Self {
        Self {
            ime: item.ime.clone(),
            lokacija: item.lokacija.clone(),
            komentar: item.komentar.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: EditableField) -> &str {
        match field {
            EditableField::Ime => &self.ime,
            EditableField::Lokacija => &self.lokacija,
            EditableField::Komentar => &self.komentar,
        }
    }

    pub fn set(&mut self, field: EditableField, value: String) {
        match field {
            EditableField::Ime => self.ime = value,
            EditableField::Lokacija => self.lokacija = value,
            EditableField::Komentar => self.komentar = value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum EditableField {
    Ime,
    Lokacija,
    Komentar,
}

/// Successful `PUT /items/{id}` reply.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct UpdateItemResponse {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub updated_fields: Option<serde_json::Value>,
}

/// Body the backend attaches to non-2xx replies.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
