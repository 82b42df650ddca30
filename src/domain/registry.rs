// Module registry: the editable catalogue of modules and markers served to clients
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModuleRegistry(Value);

impl ModuleRegistry {
    pub fn new(contents: Value) -> Self {
        Self(contents)
    }

    pub fn contents(&self) -> &Value {
        &self.0
    }
}
