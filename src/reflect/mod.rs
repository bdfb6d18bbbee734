//! # Reflective Member Access
//!
//! This module constructs instances, reads and writes fields, and invokes
//! methods of Rust types by name, reaching private members by overriding
//! their declared visibility.
//!
//! Rust has no runtime introspection, so a type takes part by describing
//! itself once with [`TypeDescriptor::builder`]. Descriptors can be kept in a
//! [`TypeRegistry`] to be found by name.
//!
//! ## Usage
//!
//! The entry points are the free functions [`new_instance`], [`get_field`],
//! [`set_field`], [`get_static_field`], [`set_static_field`],
//! [`invoke_method`] and [`invoke_static_method`]. Overloads are resolved by
//! exact parameter-type match only.
//!
//! [`set_static_field`] strips the `FINAL` modifier of the field it writes.
//! Call [`TypeDescriptor::seal`] on types that must refuse this and every
//! other private access.
//!
//! ## Submodules
//!
//! - **accessor**: The reflective operations.
//! - **descriptor**: Type descriptors and their builder.
//! - **registry**: Name and type lookup of descriptors.
//! - **types**: Values, type handles, visibility and modifiers.
//! - **error**: The error taxonomy.

mod accessor;
mod descriptor;
mod error;
mod registry;
mod types;

pub use accessor::{
    get_field, get_static_field, invoke_method, invoke_static_method, new_instance,
    new_instance_default, set_field, set_static_field,
};
pub use descriptor::{
    ConstructorDescriptor, FieldDescriptor, MethodDescriptor, StaticFieldDescriptor,
    TypeDescriptor, TypeDescriptorBuilder,
};
pub use error::{ReflectError, ReflectResult};
pub use registry::TypeRegistry;
pub use types::{downcast, value, Args, BoxError, Modifiers, TypeRef, Value, Visibility};
