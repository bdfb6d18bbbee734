use super::descriptor::TypeDescriptor;
use super::error::{ReflectError, ReflectResult};
use log::{debug, warn};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of type descriptors, looked up by name or by Rust type.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_name: HashMap<String, Arc<TypeDescriptor>>,
    /// Names registered for each type, most recent last.
    by_type: HashMap<TypeId, Vec<String>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under its name, replacing any descriptor
    /// already registered under that name.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let name = descriptor.name().to_string();
        let type_id = descriptor.type_ref().id();
        let descriptor = Arc::new(descriptor);

        if let Some(previous) = self.by_name.insert(name.clone(), Arc::clone(&descriptor)) {
            warn!("Replacing registered type {}", name);
            self.unindex(previous.type_ref().id(), &name);
        }
        self.by_type.entry(type_id).or_default().push(name.clone());
        debug!("Registered type {}", name);
        descriptor
    }

    /// Looks a type up by its registered name.
    pub fn get(&self, name: &str) -> ReflectResult<Arc<TypeDescriptor>> {
        if name.is_empty() {
            return Err(ReflectError::argument("type name cannot be empty"));
        }
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ReflectError::lookup(format!("type {}", name)))
    }

    /// Looks up the descriptor most recently registered for `T`.
    pub fn get_by_type<T: Any>(&self) -> ReflectResult<Arc<TypeDescriptor>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|names| names.last())
            .and_then(|name| self.by_name.get(name))
            .cloned()
            .ok_or_else(|| ReflectError::lookup(format!("type {}", std::any::type_name::<T>())))
    }

    fn unindex(&mut self, type_id: TypeId, name: &str) {
        if let Some(names) = self.by_type.get_mut(&type_id) {
            names.retain(|n| n != name);
            if names.is_empty() {
                self.by_type.remove(&type_id);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
