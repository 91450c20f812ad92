use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AccountId, CallError, CallKind, ContractCallRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    String,
    Account,
    Number,
    Bool,
    Array,
    Object,
    Any,
}

impl ArgType {
    fn accepts(self, v: &Value) -> bool {
        match self {
            ArgType::String => v.is_string(),
            ArgType::Account => v
                .as_str()
                .is_some_and(|s| AccountId::validate(s).is_ok()),
            ArgType::Number => v.is_number(),
            ArgType::Bool => v.is_boolean(),
            ArgType::Array => v.is_array(),
            ArgType::Object => v.is_object(),
            ArgType::Any => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ArgType,
    #[serde(default)]
    pub optional: bool,
}

impl ArgSpec {
    pub fn required(name: &str, ty: ArgType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            optional: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSchema {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

impl MethodSchema {
    pub fn new(name: &str, args: Vec<ArgSpec>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }

    fn check_args(&self, args: &Map<String, Value>) -> Result<(), CallError> {
        for key in args.keys() {
            if !self.args.iter().any(|a| &a.name == key) {
                return Err(CallError::invalid_arguments(format!(
                    "{}: unknown argument {:?}",
                    self.name, key
                )));
            }
        }
        for spec in &self.args {
            match args.get(&spec.name) {
                None if spec.optional => {}
                None => {
                    return Err(CallError::invalid_arguments(format!(
                        "{}: missing argument {:?}",
                        self.name, spec.name
                    )));
                }
                Some(v) if !spec.ty.accepts(v) => {
                    return Err(CallError::invalid_arguments(format!(
                        "{}: argument {:?} is not a valid {:?}",
                        self.name, spec.name, spec.ty
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Static capability table of the contract: which methods exist and how
/// they are called.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSchema {
    #[serde(default)]
    pub view_methods: Vec<MethodSchema>,
    #[serde(default)]
    pub change_methods: Vec<MethodSchema>,
}

impl ContractSchema {
    pub fn registry() -> Self {
        Self {
            view_methods: vec![
                MethodSchema::new("get", vec![]),
                MethodSchema::new("get_all_registries", vec![]),
                MethodSchema::new("get_cells_count", vec![]),
            ],
            change_methods: vec![MethodSchema::new(
                "new_registry",
                vec![
                    ArgSpec::required("owner_id", ArgType::Account),
                    ArgSpec::required("name", ArgType::String),
                    ArgSpec::required("columns", ArgType::Array),
                    ArgSpec::required("rows", ArgType::Array),
                ],
            )],
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for m in self.view_methods.iter().chain(self.change_methods.iter()) {
            if m.name.trim().is_empty() {
                anyhow::bail!("contract schema has a method with an empty name");
            }
            if !seen.insert(m.name.as_str()) {
                anyhow::bail!("contract method {:?} is declared more than once", m.name);
            }
            let mut arg_names = HashSet::new();
            for a in &m.args {
                if a.name.is_empty() || !arg_names.insert(a.name.as_str()) {
                    anyhow::bail!(
                        "contract method {:?} has an empty or duplicate argument {:?}",
                        m.name,
                        a.name
                    );
                }
            }
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<(CallKind, &MethodSchema)> {
        if let Some(m) = self.view_methods.iter().find(|m| m.name == name) {
            return Some((CallKind::View, m));
        }
        self.change_methods
            .iter()
            .find(|m| m.name == name)
            .map(|m| (CallKind::Change, m))
    }

    /// Rejects a request before any network attempt.
    pub fn check(&self, req: &ContractCallRequest) -> Result<(), CallError> {
        req.check_shape()?;
        let Some((kind, method)) = self.lookup(&req.method_name) else {
            return Err(CallError::invalid_arguments(format!(
                "unknown contract method {:?}",
                req.method_name
            )));
        };
        if kind != req.kind {
            return Err(CallError::invalid_arguments(format!(
                "{} is a {} method, not a {} method",
                req.method_name, kind, req.kind
            )));
        }
        method.check_args(&req.args)
    }
}

impl Default for ContractSchema {
    fn default() -> Self {
        Self::registry()
    }
}

#[cfg(test)]
#[path = "../tests/model/schema_tests.rs"]
mod tests;
