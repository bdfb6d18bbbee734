//! Declared members of a reflectable type.
//!
//! A [`TypeDescriptor`] is built once per Rust type with
//! [`TypeDescriptor::builder`] and lists the constructors, fields, static
//! fields and methods that reflective callers may reach, together with
//! their declared visibility and modifiers.

use super::error::{ReflectError, ReflectResult};
use super::types::{format_signature, Args, BoxError, Modifiers, TypeRef, Value, Visibility};
use log::debug;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

type ConstructorFn = Box<dyn Fn(Args) -> Result<Value, BoxError> + Send + Sync>;
type ReadFn = Box<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
type WriteFn = Box<dyn Fn(&mut dyn Any, Value) -> ReflectResult<()> + Send + Sync>;
type InstanceMethodFn = Box<dyn Fn(&mut dyn Any, Args) -> Result<Option<Value>, BoxError> + Send + Sync>;
type StaticMethodFn = Box<dyn Fn(Args) -> Result<Option<Value>, BoxError> + Send + Sync>;
type CopyFn = fn(&(dyn Any + Send + Sync)) -> Option<Value>;

/// A declared constructor.
pub struct ConstructorDescriptor {
    visibility: Visibility,
    parameters: Vec<TypeRef>,
    body: ConstructorFn,
}

impl ConstructorDescriptor {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn parameters(&self) -> &[TypeRef] {
        &self.parameters
    }

    pub(crate) fn call(&self, args: Args) -> Result<Value, BoxError> {
        (self.body)(args)
    }
}

/// A declared instance field.
pub struct FieldDescriptor {
    name: String,
    visibility: Visibility,
    field_type: TypeRef,
    read: ReadFn,
    write: WriteFn,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn field_type(&self) -> TypeRef {
        self.field_type
    }

    /// Copies the field out of `instance`; `None` if `instance` is not of the declaring type.
    pub(crate) fn read(&self, instance: &dyn Any) -> Option<Value> {
        (self.read)(instance)
    }

    pub(crate) fn write(&self, instance: &mut dyn Any, value: Value) -> ReflectResult<()> {
        (self.write)(instance, value)
    }
}

/// A declared type-level field. Its value lives in the descriptor.
pub struct StaticFieldDescriptor {
    name: String,
    visibility: Visibility,
    field_type: TypeRef,
    modifiers: RwLock<Modifiers>,
    slot: RwLock<Value>,
    copy: CopyFn,
}

impl StaticFieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn field_type(&self) -> TypeRef {
        self.field_type
    }

    /// Current modifiers. `FINAL` disappears once the field has been
    /// force-written with `set_static_field`.
    pub fn modifiers(&self) -> Modifiers {
        *self.modifiers.read()
    }

    pub(crate) fn load(&self) -> Option<Value> {
        let slot = self.slot.read();
        (self.copy)(&**slot)
    }

    pub(crate) fn store(&self, value: Value) {
        *self.slot.write() = value;
    }

    pub(crate) fn strip(&self, modifier: Modifiers) {
        let mut modifiers = self.modifiers.write();
        *modifiers = modifiers.difference(modifier);
    }
}

enum MethodBody {
    Instance(InstanceMethodFn),
    Static(StaticMethodFn),
}

/// A declared instance or static method.
pub struct MethodDescriptor {
    name: String,
    visibility: Visibility,
    parameters: Vec<TypeRef>,
    return_type: TypeRef,
    body: MethodBody,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn parameters(&self) -> &[TypeRef] {
        &self.parameters
    }

    /// Declared return type; `()` for methods that return nothing.
    pub fn return_type(&self) -> TypeRef {
        self.return_type
    }

    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    pub(crate) fn call(
        &self,
        receiver: Option<&mut dyn Any>,
        args: Args,
    ) -> Result<Option<Value>, BoxError> {
        match (&self.body, receiver) {
            (MethodBody::Static(body), _) => body(args),
            (MethodBody::Instance(body), Some(receiver)) => body(receiver, args),
            (MethodBody::Instance(_), None) => {
                Err(ReflectError::argument(format!("{} needs a receiver", self.name)).into())
            }
        }
    }
}

/// Reflection metadata for a single Rust type.
pub struct TypeDescriptor {
    name: String,
    type_ref: TypeRef,
    constructors: Vec<ConstructorDescriptor>,
    fields: Vec<FieldDescriptor>,
    static_fields: Vec<StaticFieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    sealed: AtomicBool,
}

impl TypeDescriptor {
    /// Starts declaring the members of `T` under `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reflect_digest::reflect::{get_field, new_instance_default, TypeDescriptor, Visibility};
    ///
    /// #[derive(Default)]
    /// struct Point { x: i32 }
    ///
    /// let ty = TypeDescriptor::builder::<Point>("Point")
    ///     .constructor(Visibility::Private, vec![], |_| Ok(Point::default()))
    ///     .field("x", Visibility::Private, |p| &p.x, |p| &mut p.x)
    ///     .build();
    ///
    /// let point = new_instance_default(&ty).unwrap();
    /// let x = get_field(&ty, &*point, "x").unwrap();
    /// assert_eq!(x.downcast_ref::<i32>(), Some(&0));
    /// ```
    pub fn builder<T: Any + Send + Sync>(name: &str) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            descriptor: TypeDescriptor {
                name: name.to_string(),
                type_ref: TypeRef::of::<T>(),
                constructors: Vec::new(),
                fields: Vec::new(),
                static_fields: Vec::new(),
                methods: Vec::new(),
                sealed: AtomicBool::new(false),
            },
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn static_fields(&self) -> &[StaticFieldDescriptor] {
        &self.static_fields
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Constructor whose parameter list equals `parameters` exactly.
    pub fn constructor(&self, parameters: &[TypeRef]) -> Option<&ConstructorDescriptor> {
        self.constructors.iter().find(|c| c.parameters == parameters)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn static_field(&self, name: &str) -> Option<&StaticFieldDescriptor> {
        self.static_fields.iter().find(|f| f.name == name)
    }

    /// Method named `name` whose parameter list equals `parameters` exactly.
    pub fn method(&self, name: &str, parameters: &[TypeRef]) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.parameters == parameters)
    }

    /// Refuses every later attempt to override access to private members
    /// or to strip modifiers. Sealing cannot be undone.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Grants access to a member for one call, overriding private visibility
    /// unless the type is sealed.
    pub(crate) fn override_access(
        &self,
        kind: &str,
        member: &str,
        visibility: Visibility,
    ) -> ReflectResult<()> {
        match visibility {
            Visibility::Public => Ok(()),
            Visibility::Private if self.is_sealed() => Err(ReflectError::access(format!(
                "cannot access private {} {}::{}: type is sealed",
                kind, self.name, member
            ))),
            Visibility::Private => {
                debug!("Overriding access to private {} {}::{}", kind, self.name, member);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructors: Vec<String> = self
            .constructors
            .iter()
            .map(|c| format_signature(&c.parameters))
            .collect();
        let fields: Vec<&str> = self.fields.iter().map(|x| x.name()).collect();
        let static_fields: Vec<&str> = self.static_fields.iter().map(|x| x.name()).collect();
        let methods: Vec<String> = self
            .methods
            .iter()
            .map(|m| format!("{}{}", m.name, format_signature(&m.parameters)))
            .collect();
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("constructors", &constructors)
            .field("fields", &fields)
            .field("static_fields", &static_fields)
            .field("methods", &methods)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

fn copy_value<F: Any + Clone + Send + Sync>(value: &(dyn Any + Send + Sync)) -> Option<Value> {
    value.downcast_ref::<F>().map(|f| Box::new(f.clone()) as Value)
}

fn into_return<R: Any + Send + Sync>(result: R) -> Option<Value> {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        None
    } else {
        Some(Box::new(result))
    }
}

/// Declares the members of a [`TypeDescriptor`] for `T`.
///
/// Declaring a constructor or method with a signature that already exists
/// replaces the earlier declaration; so does reusing a field name.
pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeDescriptorBuilder<T> {
    pub fn constructor<B>(mut self, visibility: Visibility, parameters: Vec<TypeRef>, body: B) -> Self
    where
        B: Fn(Args) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.descriptor
            .constructors
            .retain(|c| c.parameters != parameters);
        self.descriptor.constructors.push(ConstructorDescriptor {
            visibility,
            parameters,
            body: Box::new(move |args: Args| {
                body(args).map(|instance| Box::new(instance) as Value)
            }),
        });
        self
    }

    pub fn field<F, G, M>(mut self, name: &str, visibility: Visibility, get: G, get_mut: M) -> Self
    where
        F: Any + Clone + Send + Sync,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let field_name = name.to_string();
        let write = move |instance: &mut dyn Any, value: Value| -> ReflectResult<()> {
            let target = instance.downcast_mut::<T>().ok_or_else(|| {
                ReflectError::argument(format!(
                    "object is not an instance of {}",
                    std::any::type_name::<T>()
                ))
            })?;
            let value = value.downcast::<F>().map_err(|_| {
                ReflectError::argument(format!(
                    "field {} expects a {}",
                    field_name,
                    std::any::type_name::<F>()
                ))
            })?;
            *get_mut(target) = *value;
            Ok(())
        };
        self.descriptor.fields.retain(|f| f.name != name);
        self.descriptor.fields.push(FieldDescriptor {
            name: name.to_string(),
            visibility,
            field_type: TypeRef::of::<F>(),
            read: Box::new(move |instance: &dyn Any| -> Option<Value> {
                instance
                    .downcast_ref::<T>()
                    .map(|target| Box::new(get(target).clone()) as Value)
            }),
            write: Box::new(write),
        });
        self
    }

    pub fn static_field<F>(
        mut self,
        name: &str,
        visibility: Visibility,
        modifiers: Modifiers,
        initial: F,
    ) -> Self
    where
        F: Any + Clone + Send + Sync,
    {
        self.descriptor.static_fields.retain(|f| f.name != name);
        self.descriptor.static_fields.push(StaticFieldDescriptor {
            name: name.to_string(),
            visibility,
            field_type: TypeRef::of::<F>(),
            modifiers: RwLock::new(modifiers.union(Modifiers::STATIC)),
            slot: RwLock::new(Box::new(initial)),
            copy: copy_value::<F>,
        });
        self
    }

    /// Declares an instance method. A body returning `()` yields no value
    /// when invoked.
    pub fn method<R, B>(
        mut self,
        name: &str,
        visibility: Visibility,
        parameters: Vec<TypeRef>,
        body: B,
    ) -> Self
    where
        R: Any + Send + Sync,
        B: Fn(&mut T, Args) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        let body = move |receiver: &mut dyn Any, args: Args| -> Result<Option<Value>, BoxError> {
            let target = receiver.downcast_mut::<T>().ok_or_else(|| {
                ReflectError::argument(format!(
                    "object is not an instance of {}",
                    std::any::type_name::<T>()
                ))
            })?;
            body(target, args).map(into_return)
        };
        self.push_method(
            name,
            visibility,
            parameters,
            TypeRef::of::<R>(),
            MethodBody::Instance(Box::new(body)),
        );
        self
    }

    /// Declares a type-level method.
    pub fn static_method<R, B>(
        mut self,
        name: &str,
        visibility: Visibility,
        parameters: Vec<TypeRef>,
        body: B,
    ) -> Self
    where
        R: Any + Send + Sync,
        B: Fn(Args) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        let body = move |args: Args| body(args).map(into_return);
        self.push_method(
            name,
            visibility,
            parameters,
            TypeRef::of::<R>(),
            MethodBody::Static(Box::new(body)),
        );
        self
    }

    fn push_method(
        &mut self,
        name: &str,
        visibility: Visibility,
        parameters: Vec<TypeRef>,
        return_type: TypeRef,
        body: MethodBody,
    ) {
        self.descriptor
            .methods
            .retain(|m| !(m.name == name && m.parameters == parameters));
        self.descriptor.methods.push(MethodDescriptor {
            name: name.to_string(),
            visibility,
            parameters,
            return_type,
            body,
        });
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        label: String,
    }

    fn sample_type() -> TypeDescriptor {
        TypeDescriptor::builder::<Sample>("Sample")
            .constructor(Visibility::Public, vec![], |_| {
                Ok(Sample { label: String::new() })
            })
            .constructor(Visibility::Private, vec![TypeRef::of::<String>()], |mut args| {
                Ok(Sample { label: args.take()? })
            })
            .field("label", Visibility::Private, |s| &s.label, |s| &mut s.label)
            .static_field("LIMIT", Visibility::Public, Modifiers::FINAL, 10u32)
            .method("label_len", Visibility::Public, vec![], |s, _| Ok(s.label.len()))
            .method("len", Visibility::Public, vec![TypeRef::of::<bool>()], |s, _| {
                Ok(s.label.len())
            })
            .static_method("reset", Visibility::Private, vec![], |_| Ok(()))
            .build()
    }

    #[test]
    fn test_builder_declares_members() {
        let ty = sample_type();
        assert_eq!(ty.name(), "Sample");
        assert_eq!(ty.type_ref().id(), TypeId::of::<Sample>());
        assert_eq!(ty.constructors().len(), 2);
        assert_eq!(ty.fields().len(), 1);
        assert_eq!(ty.static_fields().len(), 1);
        assert_eq!(ty.methods().len(), 3);
    }

    #[test]
    fn test_lookup_is_exact() {
        let ty = sample_type();
        assert!(ty.constructor(&[]).is_some());
        assert!(ty.constructor(&[TypeRef::of::<String>()]).is_some());
        assert!(ty.constructor(&[TypeRef::of::<&'static str>()]).is_none());
        assert!(ty.method("len", &[TypeRef::of::<bool>()]).is_some());
        assert!(ty.method("len", &[]).is_none());
        assert!(ty.field("label").is_some());
        assert!(ty.field("missing").is_none());
    }

    #[test]
    fn test_static_field_modifiers() {
        let ty = sample_type();
        let limit = ty.static_field("LIMIT").unwrap();
        assert!(limit.modifiers().is_final());
        assert!(limit.modifiers().is_static());
        limit.strip(Modifiers::FINAL);
        assert!(!limit.modifiers().is_final());
        assert!(limit.modifiers().is_static());
    }

    #[test]
    fn test_method_metadata() {
        let ty = sample_type();
        let reset = ty.method("reset", &[]).unwrap();
        assert!(reset.is_static());
        assert_eq!(reset.return_type(), TypeRef::of::<()>());
        let label_len = ty.method("label_len", &[]).unwrap();
        assert!(!label_len.is_static());
        assert_eq!(label_len.return_type(), TypeRef::of::<usize>());
    }

    #[test]
    fn test_redeclaring_replaces() {
        let ty = TypeDescriptor::builder::<Sample>("Sample")
            .method("f", Visibility::Public, vec![], |_, _| Ok(1u8))
            .method("f", Visibility::Private, vec![], |_, _| Ok(2u8))
            .build();
        assert_eq!(ty.methods().len(), 1);
        assert_eq!(ty.methods()[0].visibility(), Visibility::Private);
    }

    #[test]
    fn test_override_access() {
        let ty = sample_type();
        assert!(ty.override_access("field", "label", Visibility::Private).is_ok());
        ty.seal();
        assert!(ty.is_sealed());
        assert!(ty.override_access("field", "label", Visibility::Public).is_ok());
        assert!(matches!(
            ty.override_access("field", "label", Visibility::Private),
            Err(ReflectError::Access(_))
        ));
    }

    #[test]
    fn test_debug_lists_members() {
        let rendered = format!("{:?}", sample_type());
        assert!(rendered.contains("Sample"));
        assert!(rendered.contains("label_len()"));
        assert!(rendered.contains("LIMIT"));
    }
}
