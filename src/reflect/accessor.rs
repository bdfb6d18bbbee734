use super::descriptor::TypeDescriptor;
use super::error::{ReflectError, ReflectResult};
use super::types::{format_signature, Args, Modifiers, TypeRef, Value};
use log::{debug, warn};
use std::any::Any;

/// Creates a new instance of `ty` using its zero-argument constructor.
///
/// Shorthand for `new_instance(ty, None, Vec::new())`.
pub fn new_instance_default(ty: &TypeDescriptor) -> ReflectResult<Value> {
    new_instance(ty, None, Vec::new())
}

/// Creates a new instance of `ty` using the constructor declared with
/// exactly `parameter_types`.
///
/// When `parameter_types` and `args` are both absent or empty the
/// zero-argument constructor is used. Private constructors are reached by
/// overriding their visibility.
///
/// # Arguments
///
/// * `ty` - Descriptor of the type to construct.
/// * `parameter_types` - Declared parameter types of the wanted constructor.
/// * `args` - Arguments, one per parameter type.
///
/// # Returns
///
/// * `Ok(Value)` - The boxed instance.
/// * `Err(ReflectError::Argument)` - `args` does not fit `parameter_types`.
/// * `Err(ReflectError::Lookup)` - No constructor has that parameter list.
/// * `Err(ReflectError::Access)` - The constructor is private and `ty` is sealed.
/// * `Err(ReflectError::Invocation)` - The constructor body failed.
///
/// # Examples
///
/// ```rust
/// use reflect_digest::reflect::{new_instance, value, TypeDescriptor, TypeRef, Visibility};
///
/// struct Token(String);
///
/// let ty = TypeDescriptor::builder::<Token>("Token")
///     .constructor(Visibility::Private, vec![TypeRef::of::<String>()], |mut args| {
///         Ok(Token(args.take()?))
///     })
///     .build();
///
/// let token = new_instance(&ty, Some(&[TypeRef::of::<String>()]), vec![value("abc".to_string())])
///     .unwrap();
/// assert_eq!(token.downcast_ref::<Token>().unwrap().0, "abc");
/// ```
pub fn new_instance(
    ty: &TypeDescriptor,
    parameter_types: Option<&[TypeRef]>,
    args: Vec<Value>,
) -> ReflectResult<Value> {
    let parameters = resolve_parameters(parameter_types, &args)?;
    let member = format!("new{}", format_signature(parameters));
    let constructor = ty
        .constructor(parameters)
        .ok_or_else(|| ReflectError::lookup(format!("{}::{}", ty.name(), member)))?;
    ty.override_access("constructor", &member, constructor.visibility())?;
    check_arguments(ty, &member, parameters, &args)?;

    debug!("Invoking {}::{}", ty.name(), member);
    constructor
        .call(Args::new(args))
        .map_err(|e| ReflectError::invocation(format!("{}::{}", ty.name(), member), e))
}

/// Reads the field `name` of `instance`.
///
/// A static field of the same name is read too; `instance` is then only
/// checked for its type.
///
/// # Arguments
///
/// * `ty` - Descriptor declaring the field.
/// * `instance` - Object to read from; must be of type `ty`.
/// * `name` - Declared field name.
///
/// # Returns
///
/// * `Ok(Value)` - A copy of the current field value.
/// * `Err(ReflectError)` - Argument, lookup or access failure.
pub fn get_field(ty: &TypeDescriptor, instance: &dyn Any, name: &str) -> ReflectResult<Value> {
    require_name(name)?;
    require_instance(ty, instance)?;
    let field = match ty.field(name) {
        Some(field) => field,
        None if ty.static_field(name).is_some() => return get_static_field(ty, name),
        None => return Err(ReflectError::lookup(format!("{}.{}", ty.name(), name))),
    };
    ty.override_access("field", name, field.visibility())?;
    field
        .read(instance)
        .ok_or_else(|| ReflectError::argument(format!("object is not an instance of {}", ty.name())))
}

/// Reads the static field `name` of `ty`.
pub fn get_static_field(ty: &TypeDescriptor, name: &str) -> ReflectResult<Value> {
    require_name(name)?;
    let field = ty
        .static_field(name)
        .ok_or_else(|| ReflectError::lookup(format!("{}::{}", ty.name(), name)))?;
    ty.override_access("static field", name, field.visibility())?;
    field
        .load()
        .ok_or_else(|| ReflectError::argument(format!("static field {} holds a foreign value", name)))
}

/// Writes `value` into the field `name` of `instance`.
///
/// A static field of the same name is written too, unless it is `FINAL`:
/// only [`set_static_field`] strips that modifier.
///
/// # Arguments
///
/// * `ty` - Descriptor declaring the field.
/// * `instance` - Object to write to; must be of type `ty`.
/// * `name` - Declared field name.
/// * `value` - New value; must hold exactly the declared field type.
///
/// # Returns
///
/// * `Ok(())` - The field now holds `value`.
/// * `Err(ReflectError)` - Argument, lookup or access failure.
pub fn set_field(
    ty: &TypeDescriptor,
    instance: &mut dyn Any,
    name: &str,
    value: Value,
) -> ReflectResult<()> {
    require_name(name)?;
    require_instance(ty, &*instance)?;
    let field = match ty.field(name) {
        Some(field) => field,
        None => {
            let field = ty
                .static_field(name)
                .ok_or_else(|| ReflectError::lookup(format!("{}.{}", ty.name(), name)))?;
            ty.override_access("static field", name, field.visibility())?;
            require_value(name, field.field_type(), &value)?;
            if field.modifiers().is_final() {
                return Err(ReflectError::access(format!(
                    "cannot write FINAL static field {}::{}",
                    ty.name(),
                    name
                )));
            }
            field.store(value);
            return Ok(());
        }
    };
    ty.override_access("field", name, field.visibility())?;
    require_value(name, field.field_type(), &value)?;
    field.write(instance, value)
}

/// Writes `value` into the static field `name` of `ty`, stripping its
/// `FINAL` modifier first.
///
/// This defeats the write-once guarantee the field was declared with: the
/// new value and the missing `FINAL` flag are visible to every holder of
/// `ty`, and no synchronisation beyond the field's own lock is provided.
/// A sealed `ty` refuses the strip with an access error.
pub fn set_static_field(ty: &TypeDescriptor, name: &str, value: Value) -> ReflectResult<()> {
    require_name(name)?;
    let field = ty
        .static_field(name)
        .ok_or_else(|| ReflectError::lookup(format!("{}::{}", ty.name(), name)))?;
    ty.override_access("static field", name, field.visibility())?;
    require_value(name, field.field_type(), &value)?;

    if field.modifiers().is_final() {
        if ty.is_sealed() {
            return Err(ReflectError::access(format!(
                "cannot strip FINAL from {}::{}: type is sealed",
                ty.name(),
                name
            )));
        }
        warn!("Stripping FINAL from static field {}::{}", ty.name(), name);
        field.strip(Modifiers::FINAL);
    }
    field.store(value);
    Ok(())
}

/// Invokes the method `name` declared with exactly `parameter_types` on
/// `instance`.
///
/// Overload resolution follows [`new_instance`]. Static methods may also be
/// invoked through this function; the instance is then ignored.
///
/// # Returns
///
/// * `Ok(Some(Value))` - The method's return value.
/// * `Ok(None)` - The method returns `()`.
/// * `Err(ReflectError)` - Argument, lookup, access or invocation failure.
pub fn invoke_method(
    ty: &TypeDescriptor,
    instance: &mut dyn Any,
    name: &str,
    parameter_types: Option<&[TypeRef]>,
    args: Vec<Value>,
) -> ReflectResult<Option<Value>> {
    require_instance(ty, &*instance)?;
    invoke(ty, Some(instance), name, parameter_types, args)
}

/// Invokes the static method `name` declared with exactly `parameter_types`.
///
/// # Examples
///
/// ```rust
/// use reflect_digest::reflect::{invoke_static_method, TypeDescriptor, Visibility};
///
/// struct Build;
///
/// let ty = TypeDescriptor::builder::<Build>("Build")
///     .static_method("version", Visibility::Private, vec![], |_| Ok(3u32))
///     .static_method("touch", Visibility::Public, vec![], |_| Ok(()))
///     .build();
///
/// let version = invoke_static_method(&ty, "version", None, Vec::new()).unwrap();
/// assert_eq!(version.unwrap().downcast_ref::<u32>(), Some(&3));
/// assert!(invoke_static_method(&ty, "touch", None, Vec::new()).unwrap().is_none());
/// ```
pub fn invoke_static_method(
    ty: &TypeDescriptor,
    name: &str,
    parameter_types: Option<&[TypeRef]>,
    args: Vec<Value>,
) -> ReflectResult<Option<Value>> {
    invoke(ty, None, name, parameter_types, args)
}

fn invoke(
    ty: &TypeDescriptor,
    receiver: Option<&mut dyn Any>,
    name: &str,
    parameter_types: Option<&[TypeRef]>,
    args: Vec<Value>,
) -> ReflectResult<Option<Value>> {
    require_name(name)?;
    let parameters = resolve_parameters(parameter_types, &args)?;
    let member = format!("{}{}", name, format_signature(parameters));
    let method = ty
        .method(name, parameters)
        .ok_or_else(|| ReflectError::lookup(format!("{}::{}", ty.name(), member)))?;
    if receiver.is_none() && !method.is_static() {
        return Err(ReflectError::argument(format!(
            "{}::{} is not static",
            ty.name(),
            member
        )));
    }
    ty.override_access("method", &member, method.visibility())?;
    check_arguments(ty, &member, parameters, &args)?;

    debug!("Invoking {}::{}", ty.name(), member);
    method
        .call(receiver, Args::new(args))
        .map_err(|e| ReflectError::invocation(format!("{}::{}", ty.name(), member), e))
}

/// Picks the parameter list to resolve against.
///
/// Absent and empty lists both select the zero-argument member. A
/// parameter list and argument list of different lengths is rejected.
fn resolve_parameters<'a>(
    parameter_types: Option<&'a [TypeRef]>,
    args: &[Value],
) -> ReflectResult<&'a [TypeRef]> {
    let parameters = parameter_types.unwrap_or(&[]);
    if parameters.len() != args.len() {
        return Err(ReflectError::argument(format!(
            "{} parameter type(s) given for {} argument(s)",
            parameters.len(),
            args.len()
        )));
    }
    Ok(parameters)
}

fn check_arguments(
    ty: &TypeDescriptor,
    member: &str,
    parameters: &[TypeRef],
    args: &[Value],
) -> ReflectResult<()> {
    for (i, (parameter, arg)) in parameters.iter().zip(args).enumerate() {
        if !parameter.matches(arg) {
            return Err(ReflectError::argument(format!(
                "argument {} of {}::{} must be a {}",
                i,
                ty.name(),
                member,
                parameter
            )));
        }
    }
    Ok(())
}

fn require_name(name: &str) -> ReflectResult<()> {
    if name.is_empty() {
        return Err(ReflectError::argument("member name cannot be empty"));
    }
    Ok(())
}

fn require_instance(ty: &TypeDescriptor, instance: &dyn Any) -> ReflectResult<()> {
    if instance.type_id() != ty.type_ref().id() {
        return Err(ReflectError::argument(format!(
            "object is not an instance of {}",
            ty.name()
        )));
    }
    Ok(())
}

fn require_value(name: &str, field_type: TypeRef, value: &Value) -> ReflectResult<()> {
    if !field_type.matches(value) {
        return Err(ReflectError::argument(format!(
            "field {} expects a {}",
            name, field_type
        )));
    }
    Ok(())
}
