use serde::{Deserialize, Serialize};

use crate::errors::{PatternGraphError, Result};

/// Alias ONNX uses for its default operator domain.
pub const ONNX_DOMAIN_ALIAS: &str = "ai.onnx";

/// Map the `ai.onnx` alias onto the canonical empty domain.
pub fn normalize_domain(domain: &str) -> &str {
    if domain == ONNX_DOMAIN_ALIAS { "" } else { domain }
}

/// Tensor element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElemType {
    Float,
    Float16,
    Bfloat16,
    Double,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    String,
}

/// One dimension of a tensor shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dim {
    Fixed(i64),
    Symbolic(String),
}

/// A value flowing between operators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueArg {
    pub name: String,
    #[serde(default)]
    pub elem_type: Option<ElemType>,
    #[serde(default)]
    pub shape: Option<Vec<Dim>>,
    /// Set for initializers whose value is known before execution.
    #[serde(default)]
    pub constant: bool,
}

impl ValueArg {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn elem_type(mut self, elem_type: ElemType) -> Self {
        self.elem_type = Some(elem_type);
        self
    }

    pub fn shape(mut self, shape: impl IntoIterator<Item = Dim>) -> Self {
        self.shape = Some(shape.into_iter().collect());
        self
    }

    /// Shorthand for a fully static shape.
    pub fn fixed_shape(self, dims: impl IntoIterator<Item = i64>) -> Self {
        self.shape(dims.into_iter().map(Dim::Fixed))
    }

    pub fn constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    pub fn rank(&self) -> Option<usize> {
        self.shape.as_ref().map(Vec::len)
    }

    /// Fill metadata this argument does not know yet from `other`.
    pub(crate) fn absorb(&mut self, other: ValueArg) {
        if other.elem_type.is_some() {
            self.elem_type = other.elem_type;
        }
        if other.shape.is_some() {
            self.shape = other.shape;
        }
        self.constant |= other.constant;
    }
}

/// An operator node. Inputs and outputs are argument names; an empty input
/// name marks an omitted optional input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpNode {
    pub name: String,
    pub op_type: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub since_version: i32,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl OpNode {
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            ..Self::default()
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn version(mut self, since_version: i32) -> Self {
        self.since_version = since_version;
        self
    }

    pub fn inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PatternGraphError::invalid_input("node name must be set"));
        }
        if self.op_type.trim().is_empty() {
            return Err(PatternGraphError::invalid_input(format!(
                "node {} has no op type",
                self.name
            )));
        }
        if self.outputs.iter().any(|o| o.is_empty()) {
            return Err(PatternGraphError::invalid_input(format!(
                "node {} has an unnamed output",
                self.name
            )));
        }
        Ok(())
    }
}
