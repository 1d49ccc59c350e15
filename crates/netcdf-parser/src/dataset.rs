//! Read access to a NetCDF-style dataset.
//!
//! A [`Dataset`] exposes attributes, dimensions and raw variable storage.
//! Variables are unpacked the way netCDF readers auto-scale them: cells
//! equal to `_FillValue` or outside `valid_range` are masked, then
//! `scale_factor` and `add_offset` are applied.

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn, Zip};

use crate::error::{NetCdfError, NetCdfResult};

/// Attribute value as stored in the file. Scalars are one-element lists.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Int16(Vec<i16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl AttributeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Int16(_) => "short",
            Self::Float32(_) => "float",
            Self::Float64(_) => "double",
        }
    }

    /// Numeric values widened to f64, `None` for text.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Self::Text(_) => None,
            Self::Int16(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Self::Float32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Self::Float64(v) => Some(v.clone()),
        }
    }

    /// The single numeric value of a scalar attribute.
    pub fn as_f64(&self) -> Option<f64> {
        match self.as_f64_vec()?.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float64(vec![value])
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        Self::Float32(vec![value])
    }
}

impl From<i16> for AttributeValue {
    fn from(value: i16) -> Self {
        Self::Int16(vec![value])
    }
}

/// Variable storage before unpacking.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int16(ArrayD<i16>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

impl ArrayData {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Int16(a) => a.shape(),
            Self::Float32(a) => a.shape(),
            Self::Float64(a) => a.shape(),
        }
    }

    fn to_f64(&self) -> ArrayD<f64> {
        match self {
            Self::Int16(a) => a.mapv(f64::from),
            Self::Float32(a) => a.mapv(f64::from),
            Self::Float64(a) => a.clone(),
        }
    }
}

/// Values with a mask that is true where a cell is invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray<T> {
    pub data: ArrayD<T>,
    pub mask: ArrayD<bool>,
}

impl<T> MaskedArray<T> {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn masked_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

/// Unpacked variable values.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValues {
    Float32(MaskedArray<f32>),
    Float64(MaskedArray<f64>),
}

/// A variable's storage together with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    pub data: ArrayData,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl RawVariable {
    pub fn new(data: ArrayData) -> Self {
        Self {
            data,
            attributes: BTreeMap::new(),
        }
    }

    fn numeric_attribute(&self, name: &str) -> NetCdfResult<Option<f64>> {
        match self.attributes.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| NetCdfError::invalid(format!("attribute {} must be a numeric scalar", name))),
        }
    }

    fn valid_range(&self) -> NetCdfResult<(Option<f64>, Option<f64>)> {
        if let Some(range) = self.attributes.get("valid_range") {
            return match range.as_f64_vec().as_deref() {
                Some([min, max]) => Ok((Some(*min), Some(*max))),
                _ => Err(NetCdfError::invalid("valid_range must hold two numbers")),
            };
        }
        Ok((self.numeric_attribute("valid_min")?, self.numeric_attribute("valid_max")?))
    }

    /// Apply fill value, valid range and packing attributes.
    ///
    /// Packed values take the type of `scale_factor` (or `add_offset`);
    /// unpacked values keep their storage type, with shorts widened to f64.
    pub fn unpack(&self) -> NetCdfResult<VariableValues> {
        let fill_value = self.numeric_attribute("_FillValue")?;
        let (valid_min, valid_max) = self.valid_range()?;
        let scale = self.numeric_attribute("scale_factor")?;
        let offset = self.numeric_attribute("add_offset")?;

        let raw = self.data.to_f64();
        let mask = raw.mapv(|v| {
            fill_value.map_or(false, |fill| v == fill)
                || valid_min.map_or(false, |min| v < min)
                || valid_max.map_or(false, |max| v > max)
                || v.is_nan()
        });

        let packed = scale.is_some() || offset.is_some();
        let mut values = raw;
        if packed {
            let (scale, offset) = (scale.unwrap_or(1.0), offset.unwrap_or(0.0));
            values.mapv_inplace(|v| v * scale + offset);
        }
        Zip::from(&mut values).and(&mask).for_each(|v, &invalid| {
            if invalid {
                *v = f64::NAN;
            }
        });

        let packing_type = ["scale_factor", "add_offset"]
            .iter()
            .find_map(|name| self.attributes.get(*name));
        let single = match (packed, packing_type, &self.data) {
            (true, Some(AttributeValue::Float32(_)), _) => true,
            (true, _, _) => false,
            (false, _, ArrayData::Float32(_)) => true,
            (false, _, _) => false,
        };

        Ok(if single {
            VariableValues::Float32(MaskedArray {
                data: values.mapv(|v| v as f32),
                mask,
            })
        } else {
            VariableValues::Float64(MaskedArray { data: values, mask })
        })
    }
}

/// Read access to one dataset.
pub trait Dataset {
    fn global_attribute(&self, name: &str) -> NetCdfResult<Option<AttributeValue>>;

    fn variable_attribute(&self, variable: &str, name: &str) -> NetCdfResult<Option<AttributeValue>>;

    fn raw_variable(&self, name: &str) -> NetCdfResult<Option<RawVariable>>;

    fn dimension_len(&self, name: &str) -> NetCdfResult<Option<usize>>;

    /// Unpacked values of a variable.
    fn variable(&self, name: &str) -> NetCdfResult<Option<VariableValues>> {
        self.raw_variable(name)?.map(|raw| raw.unpack()).transpose()
    }
}

/// In-memory dataset for synthetic data and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    global_attributes: BTreeMap<String, AttributeValue>,
    attributes: BTreeMap<String, BTreeMap<String, AttributeValue>>,
    data: BTreeMap<String, ArrayData>,
    dimensions: BTreeMap<String, usize>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(mut self, name: &str, len: usize) -> Self {
        self.dimensions.insert(name.to_string(), len);
        self
    }

    pub fn with_global_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.global_attributes.insert(name.to_string(), value.into());
        self
    }

    /// Attach an attribute to a variable, which need not hold data.
    pub fn with_attribute(mut self, variable: &str, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes
            .entry(variable.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }

    pub fn with_variable(mut self, name: &str, data: ArrayData) -> Self {
        self.data.insert(name.to_string(), data);
        self
    }

    /// Store a 1-D variable and its dimension of the same name.
    pub fn with_coordinate(self, name: &str, data: ArrayData) -> NetCdfResult<Self> {
        match data.shape() {
            [len] => {
                let len = *len;
                Ok(self.with_dimension(name, len).with_variable(name, data))
            }
            shape => Err(NetCdfError::invalid(format!(
                "coordinate {} must be 1-D, got shape {:?}",
                name, shape
            ))),
        }
    }
}

impl Dataset for MemoryDataset {
    fn global_attribute(&self, name: &str) -> NetCdfResult<Option<AttributeValue>> {
        Ok(self.global_attributes.get(name).cloned())
    }

    fn variable_attribute(&self, variable: &str, name: &str) -> NetCdfResult<Option<AttributeValue>> {
        Ok(self.attributes.get(variable).and_then(|attrs| attrs.get(name)).cloned())
    }

    fn raw_variable(&self, name: &str) -> NetCdfResult<Option<RawVariable>> {
        Ok(self.data.get(name).map(|data| RawVariable {
            data: data.clone(),
            attributes: self.attributes.get(name).cloned().unwrap_or_default(),
        }))
    }

    fn dimension_len(&self, name: &str) -> NetCdfResult<Option<usize>> {
        Ok(self.dimensions.get(name).copied())
    }
}

/// Reshape a flat vector read from a file.
pub fn array_from_shape<T>(shape: &[usize], values: Vec<T>) -> NetCdfResult<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|e| NetCdfError::invalid(format!("shape {:?}: {}", shape, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn packed_axis() -> RawVariable {
        let mut var = RawVariable::new(ArrayData::Int16(arr1(&[0_i16, 10, -1]).into_dyn()));
        var.attributes.insert("scale_factor".into(), 0.5_f32.into());
        var.attributes.insert("add_offset".into(), (-1.0_f32).into());
        var.attributes.insert("_FillValue".into(), (-1_i16).into());
        var
    }

    #[test]
    fn test_unpack_scales_and_masks() {
        match packed_axis().unpack().unwrap() {
            VariableValues::Float32(values) => {
                let data = values.data.as_slice().unwrap();
                assert_eq!(data[..2], [-1.0, 4.0]);
                assert!(data[2].is_nan());
                assert_eq!(values.mask.as_slice().unwrap(), &[false, false, true]);
            }
            other => panic!("expected float values, got {:?}", other),
        }
    }

    #[test]
    fn test_unpack_double_packing() {
        let mut var = packed_axis();
        var.attributes.insert("scale_factor".into(), 0.5_f64.into());
        var.attributes.remove("add_offset");
        assert!(matches!(var.unpack().unwrap(), VariableValues::Float64(_)));
    }

    #[test]
    fn test_unpack_valid_range() {
        let mut var = RawVariable::new(ArrayData::Float32(arr1(&[-100.0_f32, 45.0, 95.0]).into_dyn()));
        var.attributes
            .insert("valid_range".into(), AttributeValue::Float32(vec![-90.0, 90.0]));
        match var.unpack().unwrap() {
            VariableValues::Float32(values) => {
                assert_eq!(values.masked_count(), 2);
                assert_eq!(values.data.as_slice().unwrap()[1], 45.0);
            }
            other => panic!("expected float values, got {:?}", other),
        }
    }

    #[test]
    fn test_unpack_rejects_text_scale() {
        let mut var = packed_axis();
        var.attributes.insert("scale_factor".into(), "half".into());
        assert!(matches!(var.unpack(), Err(NetCdfError::InvalidFormat(_))));
    }

    #[test]
    fn test_memory_dataset_lookup() {
        let ds = MemoryDataset::new()
            .with_global_attribute("title", "ABI L2")
            .with_attribute("goes_imager_projection", "perspective_point_height", 35_786_023.0)
            .with_coordinate("x", ArrayData::Float32(arr1(&[0.1_f32, 0.2]).into_dyn()))
            .unwrap();

        assert_eq!(ds.global_attribute("title").unwrap(), Some("ABI L2".into()));
        assert_eq!(
            ds.variable_attribute("goes_imager_projection", "perspective_point_height")
                .unwrap()
                .and_then(|v| v.as_f64()),
            Some(35_786_023.0)
        );
        assert_eq!(ds.dimension_len("x").unwrap(), Some(2));
        assert!(ds.raw_variable("goes_imager_projection").unwrap().is_none());
        assert!(ds.variable("y").unwrap().is_none());
    }
}
