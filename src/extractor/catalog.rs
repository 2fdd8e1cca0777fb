//! Catalog types and their JSON shape.
//!
//! Serialization writes `{"apis": {<category>: [<record>, ...]}}` with
//! categories in insertion order and record fields ordered `name`, `link`,
//! `description`, then extra columns in header order. Deserialization reads
//! the same shape back without losing either ordering.

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Top-level key of the serialized catalog.
pub const APIS_KEY: &str = "apis";

/// One extracted table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    name: Option<String>,
    link: Option<String>,
    description: Option<String>,
    extra: Vec<(String, String)>,
}

impl Record {
    /// Record with the three well-known fields set.
    pub fn new(name: &str, link: &str, description: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            link: Some(link.to_string()),
            description: Some(description.to_string()),
            extra: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.set_field(key, value.to_string());
        self
    }

    /// Set `name` and `link` together, as read from an "api" column.
    pub fn set_api(&mut self, name: String, link: String) {
        self.name = Some(name);
        self.link = Some(link);
    }

    pub fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }

    /// Assign a field by key. Keys that collide with the well-known fields
    /// overwrite them; an existing extra key keeps its position and takes the
    /// new value.
    pub fn set_field(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = Some(value),
            "link" => self.link = Some(value),
            "description" => self.description = Some(value),
            _ => {
                if let Some(slot) = self.extra.iter_mut().find(|(k, _)| k == key) {
                    slot.1 = value;
                } else {
                    self.extra.push((key.to_string(), value));
                }
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Look up any field by its serialized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => self.name(),
            "link" => self.link(),
            "description" => self.description(),
            _ => self
                .extra
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Fields in serialization order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = [
            ("name", self.name.as_deref()),
            ("link", self.link.as_deref()),
            ("description", self.description.as_deref()),
        ];
        known
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.fields().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.fields() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::default();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    record.set_field(&key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// A named group of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub records: Vec<Record>,
}

/// Category name to records, kept in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name` for appending and return its index. A category that
    /// already exists keeps its position but loses its records; the second
    /// element of the result tells whether that happened.
    pub fn open_category(&mut self, name: &str) -> (usize, bool) {
        if let Some(index) = self.categories.iter().position(|c| c.name == name) {
            let reset = !self.categories[index].records.is_empty();
            self.categories[index].records.clear();
            (index, reset)
        } else {
            self.categories.push(Category {
                name: name.to_string(),
                records: Vec::new(),
            });
            (self.categories.len() - 1, false)
        }
    }

    pub(crate) fn push_record(&mut self, index: usize, record: Record) {
        if let Some(category) = self.categories.get_mut(index) {
            category.records.push(record);
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.records.as_slice())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.categories.iter().map(|c| c.records.len()).sum()
    }
}

struct CategoriesRef<'a>(&'a [Category]);

impl Serialize for CategoriesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in self.0 {
            map.serialize_entry(&category.name, &category.records)?;
        }
        map.end()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(APIS_KEY, &CategoriesRef(&self.categories))?;
        map.end()
    }
}

struct Categories(Catalog);

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to record lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Categories, A::Error> {
                let mut catalog = Catalog::new();
                while let Some((name, records)) = access.next_entry::<String, Vec<Record>>()? {
                    let (index, _) = catalog.open_category(&name);
                    for record in records {
                        catalog.push_record(index, record);
                    }
                }
                Ok(Categories(catalog))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map with an \"{}\" key", APIS_KEY)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Catalog, A::Error> {
                let mut catalog = None;
                while let Some(key) = access.next_key::<String>()? {
                    if key == APIS_KEY {
                        let Categories(inner) = access.next_value()?;
                        catalog = Some(inner);
                    } else {
                        access.next_value::<IgnoredAny>()?;
                    }
                }
                catalog.ok_or_else(|| de::Error::missing_field(APIS_KEY))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}
