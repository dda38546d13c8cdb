use crate::error::{EntityError, EntityResult};
use crate::schema::{FieldDescriptor, FieldKind, Schema};
use crate::validate::{self, ValidationError, value_category};
use idolbase_types::is_known_value;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// How a merge decides that a bag value means "leave this field alone".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Falsy values (`null`, `false`, `0`, `""`) are skipped, so they can
    /// never overwrite a stored value. Matches records written by earlier
    /// clients.
    #[default]
    Legacy,
    /// Only missing keys are skipped. An explicit `null` resets the field to
    /// its initial value (or clears it); any other value is written as is.
    Explicit,
}

/// State shared by every entity kind: identity, kind tag and raw attributes.
///
/// Attributes are stored under the schema's storage keys. The concrete record
/// types wrap this and read typed values back out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCore {
    identity: Option<String>,
    kind: &'static str,
    attributes: Map<String, Value>,
}

impl EntityCore {
    /// Fails with `MissingTypeTag` if `kind` is empty.
    pub fn new(kind: &'static str, identity: Option<String>) -> EntityResult<Self> {
        if kind.is_empty() {
            return Err(EntityError::MissingTypeTag);
        }
        Ok(Self {
            identity: identity.filter(|id| !id.is_empty()),
            kind,
            attributes: Map::new(),
        })
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.identity = Some(identity.into());
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Kind with its first letter upper-cased, as used in error messages.
    pub fn capitalized_kind(&self) -> String {
        let mut chars = self.kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Absent or non-boolean reads as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// String elements of an array field, in stored order. Non-strings are
    /// skipped.
    pub fn get_strings(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_object(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(Value::as_object)
    }

    /// Fails with `MissingIdentity` when no identity is set.
    pub fn identity_check(&self) -> EntityResult<&str> {
        self.identity().ok_or_else(|| EntityError::MissingIdentity {
            kind: self.capitalized_kind(),
        })
    }

    /// Fails with `KindMismatch` when `candidate` names another kind.
    pub fn kind_check(&self, candidate: &str) -> EntityResult<()> {
        if candidate != self.kind {
            return Err(EntityError::KindMismatch {
                expected: self.kind.to_string(),
                actual: candidate.to_string(),
            });
        }
        Ok(())
    }

    fn wrap(&self, source: ValidationError) -> EntityError {
        EntityError::Validation {
            kind: self.capitalized_kind(),
            source,
        }
    }

    /// Runs the schema validator over the current attributes.
    pub fn validate(&self, schema: &Schema) -> EntityResult<()> {
        validate::validate(&self.attributes, schema).map_err(|e| self.wrap(e))
    }

    /// Writes the recognized fields of `bag`, then validates the whole record.
    ///
    /// Not transactional: when validation fails, fields written by this call
    /// stay written.
    pub fn merge(
        &mut self,
        schema: &Schema,
        initial: &Map<String, Value>,
        bag: &Value,
        policy: MergePolicy,
    ) -> EntityResult<()> {
        let Some(bag) = bag.as_object() else {
            return Err(self.wrap(ValidationError::TypeMismatch {
                field: "attributes".to_string(),
                expected: "object",
                actual: value_category(bag),
            }));
        };

        match bag.get("type") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(Value::String(s)) => self.kind_check(s)?,
            Some(other) => self.kind_check(&other.to_string())?,
        }

        if let Some(id) = bag.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            self.identity = Some(id.to_string());
        }

        for field in schema.fields() {
            let Some(value) = bag.get(field.external_name()) else {
                continue;
            };

            match policy {
                MergePolicy::Legacy if is_falsy(value) => continue,
                MergePolicy::Explicit if value.is_null() => {
                    match initial.get(field.name) {
                        Some(default) => self.set(field.name, default.clone()),
                        None => {
                            self.attributes.remove(field.name);
                        }
                    }
                    continue;
                }
                _ => {}
            }

            if let FieldKind::Enum(set) = field.kind {
                let candidate = validate::enum_candidate(value);
                if let Err(e) = set.check(Some(&*candidate)) {
                    debug!("{}: ignoring {}: {e}", self.kind, field.name);
                    continue;
                }
            }

            self.set(field.name, value.clone());
        }

        self.validate(schema)
    }

    /// Builds the persistence body under known-value suppression.
    pub fn suppressed_body(&self, schema: &Schema) -> Map<String, Value> {
        schema
            .fields()
            .iter()
            .map(|field| {
                let value = self.attributes.get(field.name).cloned().unwrap_or(Value::Null);
                (field.external_name().to_string(), known_value(field, value))
            })
            .collect()
    }
}

/// `null`, `false`, zero and the empty string.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Known-value suppression: collapses "not set" and "known to be empty" to
/// `null` so persisted documents stay sparse.
fn known_value(field: &FieldDescriptor, value: Value) -> Value {
    match value {
        Value::String(ref s) if (field.is_enum() || !field.required) && !is_known_value(s) => {
            Value::Null
        }
        Value::Array(ref items) if items.is_empty() => Value::Null,
        Value::Object(ref entries) if entries.is_empty() => Value::Null,
        ref v if !field.required && is_falsy(v) => Value::Null,
        v => v,
    }
}

/// Write-side representation handed to a persistence adapter. `null` body
/// entries mean "omit / unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistencePayload {
    #[serde(rename = "id")]
    pub identity: Option<String>,
    pub body: Map<String, Value>,
}

/// Contract every record kind implements.
///
/// Implementors supply the schema, access to their [`EntityCore`] and a typed
/// read view; construction, merging, validation and payload generation are
/// provided.
pub trait Entity: Sized {
    /// Kind tag, e.g. `"artist"`.
    const KIND: &'static str;

    /// Normalized read view.
    type View: Serialize;

    fn schema() -> &'static Schema;

    fn core(&self) -> &EntityCore;

    fn core_mut(&mut self) -> &mut EntityCore;

    fn from_core(core: EntityCore) -> Self;

    /// Builds the view. Only called on a record that just passed validation.
    fn build_view(&self) -> EntityResult<Self::View>;

    /// Values a freshly constructed record starts with.
    fn initial_attributes() -> Map<String, Value> {
        Map::new()
    }

    /// Final adjustments to the suppressed body.
    fn prepare_payload(&self, body: &mut Map<String, Value>) {
        let _ = body;
    }

    /// Constructs a record with initial attributes only. It may not be valid
    /// yet; nothing is checked until it is read or merged.
    fn empty(identity: Option<&str>) -> EntityResult<Self> {
        let mut core = EntityCore::new(Self::KIND, identity.map(str::to_string))?;
        core.attributes.extend(Self::initial_attributes());
        Ok(Self::from_core(core))
    }

    /// Constructs a record and merges `bag` into it.
    fn with_attributes(identity: Option<&str>, bag: &Value) -> EntityResult<Self> {
        let mut entity = Self::empty(identity)?;
        entity.merge(bag)?;
        Ok(entity)
    }

    /// Merges with the default [`MergePolicy`].
    fn merge(&mut self, bag: &Value) -> EntityResult<Self::View> {
        self.merge_with(bag, MergePolicy::default())
    }

    fn merge_with(&mut self, bag: &Value, policy: MergePolicy) -> EntityResult<Self::View> {
        let initial = Self::initial_attributes();
        self.core_mut().merge(Self::schema(), &initial, bag, policy)?;
        self.build_view()
    }

    fn validate(&self) -> EntityResult<()> {
        self.core().validate(Self::schema())
    }

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates, then returns the view.
    fn normalized_view(&self) -> EntityResult<Self::View> {
        self.validate()?;
        self.build_view()
    }

    /// Validates, then returns the suppressed write payload.
    fn persistence_payload(&self) -> EntityResult<PersistencePayload> {
        self.validate()?;
        let mut body = self.core().suppressed_body(Self::schema());
        self.prepare_payload(&mut body);
        Ok(PersistencePayload {
            identity: self.identity().map(str::to_string),
            body,
        })
    }

    fn identity(&self) -> Option<&str> {
        self.core().identity()
    }

    fn set_identity(&mut self, identity: impl Into<String>) {
        self.core_mut().set_identity(identity);
    }

    fn kind(&self) -> &'static str {
        self.core().kind()
    }

    fn identity_check(&self) -> EntityResult<&str> {
        self.core().identity_check()
    }

    fn kind_check(&self, candidate: &str) -> EntityResult<()> {
        self.core().kind_check(candidate)
    }
}
