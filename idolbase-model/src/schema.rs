use idolbase_types::EnumSet;
use serde::Serialize;

/// Prefix some schemas put on storage keys. Never shown to callers.
const STORAGE_PREFIX: char = '_';

/// Expected shape of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// Calendar date stored as an integer `YYYYMMDD`.
    Date8,
    /// Four-digit year stored as an integer.
    Year4,
    Array,
    Object,
    /// String value that must belong to the named registry set.
    Enum(EnumSet),
}

impl FieldKind {
    /// Name used in type-mismatch messages.
    #[must_use]
    pub const fn expected_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number | Self::Date8 | Self::Year4 => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Enum(_) => "enum",
        }
    }
}

/// A single schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Storage key. May carry the `_` storage prefix.
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    /// Name as it appears in attribute bags, payloads and error messages.
    #[must_use]
    pub fn external_name(&self) -> &'static str {
        self.name
            .strip_prefix(STORAGE_PREFIX)
            .unwrap_or(self.name)
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, FieldKind::Enum(_))
    }
}

/// Ordered field declarations for one entity kind.
///
/// Declaration order matters: the validator walks fields in this order and
/// reports only the first violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    kind: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Appends a required field.
    #[must_use]
    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor::required(name, kind));
        self
    }

    /// Appends an optional field.
    #[must_use]
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor::optional(name, kind));
        self
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks a field up by storage key or external name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name || f.external_name() == name)
    }

    /// Fields a valid record must carry.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }
}
