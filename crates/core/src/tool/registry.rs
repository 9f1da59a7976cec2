use std::sync::Arc;

use indexmap::IndexMap;
use persona_model::ModelTool;
use serde_json::{Map, Value};

use super::object::{ToolObject, ToolObjectImpl};
use super::{Tool, ToolResult};

/// A fixed set of tools, keyed by name.
///
/// The registry is used both to advertise the tools to the model and to
/// dispatch the calls the model requests. It is immutable once built, and
/// can be shared freely between concurrent turns.
pub struct Registry {
    tools: IndexMap<String, Arc<dyn ToolObject>>,
}

impl Registry {
    /// Creates a builder for a registry.
    #[inline]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns an empty registry.
    #[inline]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Returns the descriptors of all tools, in registration order.
    pub fn describe(&self) -> Vec<ModelTool> {
        self.tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    /// Returns `true` if a tool with `name` is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invokes the tool `name` with a JSON object of arguments.
    ///
    /// Calling a tool that isn't registered is not an error: a warning is
    /// logged and an empty object is returned, so that the conversation
    /// can go on. Arguments that don't match the tool's input type yield
    /// an [`InvalidInput`](super::ErrorKind::InvalidInput) error.
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            warn!("tool not found: {name}");
            return Ok(Value::Object(Map::new()));
        };
        trace!("invoking tool {name} with args: {arguments:?}");
        Arc::clone(tool).execute(arguments).await
    }
}

/// [`Registry`] builder.
#[derive(Default)]
pub struct RegistryBuilder {
    tools: IndexMap<String, Arc<dyn ToolObject>>,
}

impl RegistryBuilder {
    /// Registers a tool. A tool with the same name registered earlier is
    /// replaced, keeping its position.
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let name = tool.name().to_owned();
        let replaced = self
            .tools
            .insert(name.clone(), Arc::new(ToolObjectImpl(tool)));
        if replaced.is_some() {
            warn!("tool {name} is registered twice, keeping the last one");
        }
        self
    }

    /// Builds the registry.
    #[inline]
    pub fn build(self) -> Registry {
        Registry { tools: self.tools }
    }
}
