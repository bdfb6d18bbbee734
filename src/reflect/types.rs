use super::error::{ReflectError, ReflectResult};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dynamically typed value passed to or returned from a reflective call.
pub type Value = Box<dyn Any + Send + Sync>;

/// Error type returned by constructor and method bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Wraps `v` as a [`Value`].
pub fn value<T: Any + Send + Sync>(v: T) -> Value {
    Box::new(v)
}

/// Unwraps a [`Value`] into a concrete type.
///
/// Fails with an argument error if the value holds a different type.
pub fn downcast<T: Any>(value: Value) -> ReflectResult<T> {
    value
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| ReflectError::argument(format!("value is not a {}", type_name::<T>())))
}

/// Handle on a concrete Rust type, used to spell out parameter lists.
///
/// Two handles are equal exactly when they name the same type; no
/// widening or trait-object compatibility is considered.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `value` holds exactly this type.
    pub fn matches(&self, value: &Value) -> bool {
        (**value).type_id() == self.id
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Renders a parameter list as `(a, b)` for error messages and logs.
pub(crate) fn format_signature(parameters: &[TypeRef]) -> String {
    let names: Vec<&str> = parameters.iter().map(|p| p.name()).collect();
    format!("({})", names.join(", "))
}

/// Declared visibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Declared modifier flags of a member (bitflags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0x00);
    /// Written once at declaration; later writes are refused.
    pub const FINAL: Self = Self(0x01);
    /// Belongs to the type rather than to an instance.
    pub const STATIC: Self = Self(0x02);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_final(&self) -> bool {
        self.contains(Self::FINAL)
    }

    pub const fn is_static(&self) -> bool {
        self.contains(Self::STATIC)
    }
}

/// Ordered arguments handed to a constructor or method body.
///
/// Argument types are checked against the declared parameter list before
/// the body runs, so `take` only fails when the body asks for a type its
/// own declaration did not list.
pub struct Args {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Args {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Takes the next argument as a `T`.
    pub fn take<T: Any>(&mut self) -> ReflectResult<T> {
        let position = self.position;
        let next = self
            .values
            .next()
            .ok_or_else(|| ReflectError::argument(format!("missing argument {}", position)))?;
        self.position += 1;
        next.downcast::<T>().map(|b| *b).map_err(|_| {
            ReflectError::argument(format!("argument {} is not a {}", position, type_name::<T>()))
        })
    }
}
