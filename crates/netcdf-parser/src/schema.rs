//! Declarative field extraction.
//!
//! A [`Schema`] lists the fields a record needs, where each one lives in the
//! dataset and what kind of value it must be. Resolving a schema reads every
//! field once, runs its converter and checks the result kind, so a record
//! type only deals with typed values.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dataset::{AttributeValue, Dataset, MaskedArray, VariableValues};
use crate::error::{NetCdfError, NetCdfResult};

/// Where a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Attribute of a variable
    Attribute {
        variable: &'static str,
        name: &'static str,
    },
    GlobalAttribute(&'static str),
    /// Unpacked variable values
    Variable(&'static str),
    /// Dimension length
    Dimension(&'static str),
}

impl FieldSource {
    fn describe(&self) -> String {
        match self {
            Self::Attribute { variable, name } => format!("attribute {}:{}", variable, name),
            Self::GlobalAttribute(name) => format!("global attribute {}", name),
            Self::Variable(name) => format!("variable {}", name),
            Self::Dimension(name) => format!("dimension {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    FloatList,
    Text,
    Float32Array,
    Float64Array,
    Size,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::FloatList => "float list",
            Self::Text => "text",
            Self::Float32Array => "float32 array",
            Self::Float64Array => "float64 array",
            Self::Size => "size",
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    FloatList(Vec<f64>),
    Text(String),
    Float32Array(MaskedArray<f32>),
    Float64Array(MaskedArray<f64>),
    Size(usize),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Float(_) => FieldKind::Float,
            Self::FloatList(_) => FieldKind::FloatList,
            Self::Text(_) => FieldKind::Text,
            Self::Float32Array(_) => FieldKind::Float32Array,
            Self::Float64Array(_) => FieldKind::Float64Array,
            Self::Size(_) => FieldKind::Size,
        }
    }

    fn from_attribute(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Text(text) => Self::Text(text),
            numeric => match numeric.as_f64_vec().unwrap_or_default().as_slice() {
                [value] => Self::Float(*value),
                values => Self::FloatList(values.to_vec()),
            },
        }
    }
}

impl From<VariableValues> for FieldValue {
    fn from(values: VariableValues) -> Self {
        match values {
            VariableValues::Float32(a) => Self::Float32Array(a),
            VariableValues::Float64(a) => Self::Float64Array(a),
        }
    }
}

pub type Converter = fn(FieldValue) -> NetCdfResult<FieldValue>;

/// One field of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: &'static str,
    pub source: FieldSource,
    pub kind: FieldKind,
    pub convert: Option<Converter>,
}

impl FieldSpec {
    pub const fn new(field: &'static str, source: FieldSource, kind: FieldKind) -> Self {
        Self {
            field,
            source,
            kind,
            convert: None,
        }
    }

    pub const fn converted(mut self, convert: Converter) -> Self {
        self.convert = Some(convert);
        self
    }

    /// Attribute of `variable` stored under the field's own name.
    pub const fn attribute(variable: &'static str, field: &'static str, kind: FieldKind) -> Self {
        Self::new(field, FieldSource::Attribute { variable, name: field }, kind)
    }

    fn read<D: Dataset + ?Sized>(&self, dataset: &D) -> NetCdfResult<Option<FieldValue>> {
        Ok(match self.source {
            FieldSource::Attribute { variable, name } => dataset
                .variable_attribute(variable, name)?
                .map(FieldValue::from_attribute),
            FieldSource::GlobalAttribute(name) => dataset
                .global_attribute(name)?
                .map(FieldValue::from_attribute),
            FieldSource::Variable(name) => dataset.variable(name)?.map(FieldValue::from),
            FieldSource::Dimension(name) => dataset.dimension_len(name)?.map(FieldValue::Size),
        })
    }
}

/// Ordered field list for one record type.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    /// Read, convert and type-check every field.
    pub fn resolve<D: Dataset + ?Sized>(&self, dataset: &D) -> NetCdfResult<ResolvedFields> {
        let mut values = BTreeMap::new();
        for spec in self.fields {
            let value = spec.read(dataset)?.ok_or_else(|| {
                NetCdfError::missing(format!("{} ({})", spec.field, spec.source.describe()))
            })?;
            let value = match spec.convert {
                Some(convert) => convert(value)?,
                None => value,
            };
            if value.kind() != spec.kind {
                return Err(NetCdfError::TypeMismatch {
                    field: spec.field.to_string(),
                    expected: spec.kind.as_str(),
                    found: value.kind().as_str(),
                });
            }
            values.insert(spec.field, value);
        }
        debug!(schema = self.name, fields = values.len(), "Resolved schema");
        Ok(ResolvedFields { values })
    }
}

/// Field values keyed by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

macro_rules! take_field {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&mut self, field: &str) -> NetCdfResult<$ty> {
            match self.values.remove(field) {
                Some(FieldValue::$variant(value)) => Ok(value),
                Some(other) => Err(NetCdfError::TypeMismatch {
                    field: field.to_string(),
                    expected: FieldKind::$variant.as_str(),
                    found: other.kind().as_str(),
                }),
                None => Err(NetCdfError::missing(field.to_string())),
            }
        }
    };
}

impl ResolvedFields {
    take_field!(take_float, Float, f64);
    take_field!(take_float_list, FloatList, Vec<f64>);
    take_field!(take_text, Text, String);
    take_field!(take_f32_array, Float32Array, MaskedArray<f32>);
    take_field!(take_f64_array, Float64Array, MaskedArray<f64>);
    take_field!(take_size, Size, usize);

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Converters
// =============================================================================

/// Up-cast 32-bit array storage to f64.
pub fn widen_to_f64(value: FieldValue) -> NetCdfResult<FieldValue> {
    Ok(match value {
        FieldValue::Float32Array(a) => FieldValue::Float64Array(MaskedArray {
            data: a.data.mapv(f64::from),
            mask: a.mask,
        }),
        other => other,
    })
}

/// Down-cast 64-bit array values to f32.
pub fn narrow_to_f32(value: FieldValue) -> NetCdfResult<FieldValue> {
    Ok(match value {
        FieldValue::Float64Array(a) => FieldValue::Float32Array(MaskedArray {
            data: a.data.mapv(|v| v as f32),
            mask: a.mask,
        }),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ArrayData, MemoryDataset};
    use ndarray::arr1;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::attribute("proj", "height", FieldKind::Float),
        FieldSpec::new("title", FieldSource::GlobalAttribute("title"), FieldKind::Text),
        FieldSpec::new("x", FieldSource::Variable("x"), FieldKind::Float64Array).converted(widen_to_f64),
        FieldSpec::new("columns", FieldSource::Dimension("x"), FieldKind::Size),
    ];
    const SCHEMA: Schema = Schema::new("test", FIELDS);

    fn dataset() -> MemoryDataset {
        MemoryDataset::new()
            .with_attribute("proj", "height", 10.0_f32)
            .with_global_attribute("title", "synthetic")
            .with_coordinate("x", ArrayData::Float32(arr1(&[0.5_f32, 1.5]).into_dyn()))
            .unwrap()
    }

    #[test]
    fn test_resolve_all_kinds() {
        let mut fields = SCHEMA.resolve(&dataset()).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields.take_float("height").unwrap(), 10.0);
        assert_eq!(fields.take_text("title").unwrap(), "synthetic");
        assert_eq!(fields.take_size("columns").unwrap(), 2);
        let x = fields.take_f64_array("x").unwrap();
        assert_eq!(x.data.as_slice().unwrap(), &[0.5, 1.5]);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_missing_field_names_source() {
        let ds = MemoryDataset::new().with_global_attribute("title", "synthetic");
        match SCHEMA.resolve(&ds) {
            Err(NetCdfError::MissingData(msg)) => {
                assert!(msg.contains("height"), "{}", msg);
                assert!(msg.contains("proj:height"), "{}", msg);
            }
            other => panic!("expected missing data, got {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch() {
        let ds = dataset().with_global_attribute("title", 3.0_f64);
        match SCHEMA.resolve(&ds) {
            Err(NetCdfError::TypeMismatch { field, expected, found }) => {
                assert_eq!(field, "title");
                assert_eq!(expected, "text");
                assert_eq!(found, "float");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_take_wrong_kind() {
        let mut fields = SCHEMA.resolve(&dataset()).unwrap();
        assert!(matches!(
            fields.take_text("height"),
            Err(NetCdfError::TypeMismatch { .. })
        ));
    }
}
