//! Schema traversal: discovers every enumerated and scalar leaf of a VERIS
//! schema document.
//!
//! The walker understands the shapes that appear in the VERIS schema family:
//! objects with `properties`, arrays of enums, arrays of objects (flattened
//! into the parent path), scalars with `enum` and plain typed scalars. Inside
//! the variety/amount groups the `amount` key is walked through the sibling
//! `variety` subtree so both families share one value set.

use ahash::{AHashMap, AHashSet};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::{ReferenceData, AMOUNT, VARIETY};

/// Declared type of a non-enumerated leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
    Other(String),
}

impl ScalarType {
    fn parse(ty: &str) -> Self {
        match ty {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

/// The two column families of a variety/amount group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairFamily {
    Variety,
    Amount,
}

impl PairFamily {
    pub const ALL: [PairFamily; 2] = [PairFamily::Variety, PairFamily::Amount];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Variety => VARIETY,
            Self::Amount => AMOUNT,
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            VARIETY => Some(Self::Variety),
            AMOUNT => Some(Self::Amount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Closed list of values, one boolean column each.
    Enumerated(Vec<String>),
    /// One half of a variety/amount group. `group` is the path of the list
    /// holding the entries, e.g. `asset.assets`.
    Paired {
        group: String,
        family: PairFamily,
        values: Vec<String>,
    },
    Scalar(ScalarType),
}

/// One discovered leaf of the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub path: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Enumerated values, for both plain and paired descriptors.
    pub fn values(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::Enumerated(values) | FieldKind::Paired { values, .. } => Some(values),
            FieldKind::Scalar(_) => None,
        }
    }

    /// True when the descriptor materializes into boolean columns.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Enumerated(_)
                | FieldKind::Paired {
                    family: PairFamily::Variety,
                    ..
                }
        )
    }

    /// Names of the columns this descriptor produces.
    pub fn column_names(&self) -> Vec<String> {
        match self.values() {
            Some(values) => values.iter().map(|v| column_name(&self.path, v)).collect(),
            None => vec![self.path.clone()],
        }
    }
}

pub fn column_name(path: &str, value: &str) -> String {
    format!("{path}.{value}")
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn enum_values(node: &Value) -> Option<Vec<String>> {
    let values = node.get("enum")?.as_array()?;
    Some(
        values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

// `type` may be a string or a list such as ["string", "null"].
fn declared_type(node: &Map<String, Value>) -> Option<&str> {
    match node.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types.iter().filter_map(Value::as_str).find(|ty| *ty != "null"),
        _ => None,
    }
}

/// Walks a schema document and returns its leaf descriptors.
pub struct SchemaWalker<'a> {
    groups: &'a [String],
}

impl<'a> SchemaWalker<'a> {
    pub fn new(variety_amount_groups: &'a [String]) -> Self {
        Self {
            groups: variety_amount_groups,
        }
    }

    /// Descriptors in schema key order. Repeated calls on the same document
    /// return the same list.
    pub fn discover(&self, schema: &Value) -> Vec<FieldDescriptor> {
        self.walk_node(schema, "")
    }

    fn is_group(&self, path: &str) -> bool {
        self.groups.iter().any(|g| g == path)
    }

    fn walk_node(&self, node: &Value, path: &str) -> Vec<FieldDescriptor> {
        let Some(obj) = node.as_object() else {
            return Vec::new();
        };

        if let Some(items) = obj.get("items") {
            if let Some(values) = enum_values(items) {
                return vec![FieldDescriptor {
                    path: path.to_string(),
                    kind: FieldKind::Enumerated(values),
                }];
            }
            return self.walk_node(items, path);
        }

        if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
            if matches!(declared_type(obj), None | Some("object")) {
                return self.walk_properties(properties, path);
            }
        }

        if let Some(values) = enum_values(node) {
            return vec![FieldDescriptor {
                path: path.to_string(),
                kind: FieldKind::Enumerated(values),
            }];
        }

        match declared_type(obj) {
            Some(ty) if !path.is_empty() => vec![FieldDescriptor {
                path: path.to_string(),
                kind: FieldKind::Scalar(ScalarType::parse(ty)),
            }],
            _ => Vec::new(),
        }
    }

    fn walk_properties(&self, properties: &Map<String, Value>, path: &str) -> Vec<FieldDescriptor> {
        let in_group = self.is_group(path);
        let mut out = Vec::new();

        for (key, child) in properties {
            let child_path = join_path(path, key);
            let target = match (in_group, key.as_str()) {
                (true, AMOUNT) => properties.get(VARIETY).unwrap_or(child),
                _ => child,
            };

            let mut found = self.walk_node(target, &child_path);

            if let (true, Some(family)) = (in_group, PairFamily::from_key(key)) {
                for descriptor in found.iter_mut().filter(|d| d.path == child_path) {
                    if let FieldKind::Enumerated(values) = &mut descriptor.kind {
                        descriptor.kind = FieldKind::Paired {
                            group: path.to_string(),
                            family,
                            values: std::mem::take(values),
                        };
                    }
                }
            }

            out.append(&mut found);
        }

        out
    }
}

/// Immutable lookup over the descriptors of one schema, shared by the
/// materializer, the rollups and the summary engine.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    descriptors: Vec<FieldDescriptor>,
    by_path: AHashMap<String, usize>,
    pairs: AHashMap<(String, PairFamily), usize>,
}

impl SchemaIndex {
    pub fn from_schema(schema: &Value, reference: &ReferenceData) -> Self {
        let descriptors = SchemaWalker::new(&reference.variety_amount_groups).discover(schema);
        Self::from_descriptors(descriptors)
    }

    /// Builds the index, keeping the first descriptor for any repeated path.
    pub fn from_descriptors(descriptors: Vec<FieldDescriptor>) -> Self {
        let mut seen = AHashSet::new();
        let descriptors: Vec<FieldDescriptor> = descriptors
            .into_iter()
            .filter(|d| {
                let fresh = seen.insert(d.path.clone());
                if !fresh {
                    debug!(path = %d.path, "dropping repeated schema path");
                }
                fresh
            })
            .collect();

        let mut by_path = AHashMap::with_capacity(descriptors.len());
        let mut pairs = AHashMap::new();
        for (i, d) in descriptors.iter().enumerate() {
            by_path.insert(d.path.clone(), i);
            if let FieldKind::Paired { group, family, .. } = &d.kind {
                pairs.insert((group.clone(), *family), i);
            }
        }

        Self {
            descriptors,
            by_path,
            pairs,
        }
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FieldDescriptor> {
        self.by_path.get(path).map(|&i| &self.descriptors[i])
    }

    /// Every enumerated field with its values, paired families included.
    pub fn enumerations(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.descriptors
            .iter()
            .filter_map(|d| d.values().map(|values| (d.path.as_str(), values)))
    }

    /// Enumerated fields that materialize into boolean columns.
    pub fn boolean_fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.descriptors
            .iter()
            .filter(|d| d.is_boolean())
            .filter_map(|d| d.values().map(|values| (d.path.as_str(), values)))
    }

    pub fn scalars(&self) -> impl Iterator<Item = (&str, &ScalarType)> {
        self.descriptors.iter().filter_map(|d| match &d.kind {
            FieldKind::Scalar(ty) => Some((d.path.as_str(), ty)),
            _ => None,
        })
    }

    pub fn is_variety_amount_group(&self, path: &str) -> bool {
        PairFamily::ALL
            .iter()
            .any(|family| self.pairs.contains_key(&(path.to_string(), *family)))
    }

    /// Values of one family of a variety/amount group.
    pub fn pair(&self, group: &str, family: PairFamily) -> Option<&[String]> {
        self.pairs
            .get(&(group.to_string(), family))
            .and_then(|&i| self.descriptors[i].values())
    }
}
