use glam::DVec3;
use layout_types::Layout;
use spatial_skills::SkillError;

/// Runtime value of a skill-script expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Vec3(DVec3),
    Layout(Layout),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Text(_) => "string",
            Self::Vec3(_) => "vec3",
            Self::Layout(_) => "layout",
            Self::List(_) => "list",
        }
    }

    pub fn as_number(&self) -> Result<f64, SkillError> {
        match self {
            Self::Number(v) => Ok(*v),
            other => Err(type_error("number", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, SkillError> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(type_error("bool", other)),
        }
    }

    pub fn as_text(&self) -> Result<&str, SkillError> {
        match self {
            Self::Text(v) => Ok(v),
            other => Err(type_error("string", other)),
        }
    }

    pub fn as_vec3(&self) -> Result<DVec3, SkillError> {
        match self {
            Self::Vec3(v) => Ok(*v),
            other => Err(type_error("vec3", other)),
        }
    }

    pub fn as_layout(&self) -> Result<&Layout, SkillError> {
        match self {
            Self::Layout(v) => Ok(v),
            other => Err(type_error("layout", other)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], SkillError> {
        match self {
            Self::List(v) => Ok(v),
            other => Err(type_error("list", other)),
        }
    }

    pub fn numbers(&self) -> Result<Vec<f64>, SkillError> {
        self.as_list()?.iter().map(Value::as_number).collect()
    }

    pub fn vectors(&self) -> Result<Vec<DVec3>, SkillError> {
        self.as_list()?.iter().map(Value::as_vec3).collect()
    }

    pub fn layouts(&self) -> Result<Vec<&Layout>, SkillError> {
        self.as_list()?.iter().map(Value::as_layout).collect()
    }
}

pub fn type_error(expected: &str, found: &Value) -> SkillError {
    SkillError::Runtime(format!("expected {expected}, got {}", found.type_name()))
}

pub fn numbers(values: impl IntoIterator<Item = f64>) -> Value {
    Value::List(values.into_iter().map(Value::Number).collect())
}

pub fn vectors(values: impl IntoIterator<Item = DVec3>) -> Value {
    Value::List(values.into_iter().map(Value::Vec3).collect())
}
