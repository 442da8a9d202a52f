//! Construction-time chain building.
//!
//! Constructing a type of depth N builds N instance levels, root first:
//!
//! 1. Recurse into the parent without running its constructor, and adopt
//!    the base level's field store. The root level allocates the store, so
//!    exactly one store exists per chain.
//! 2. Seed template defaults (a derived level's defaults replace its
//!    ancestors') and create channels for the type's events.
//! 3. Run this level's constructor when asked to.
//! 4. Expose the base's own base (if any) through the store as grand base.
//! 5. Point the store's most-derived reference at this level.
//!
//! Each return overwrites step 5, so the outermost call's write is the one
//! that persists.

use tracing::trace;

use crate::{Args, FieldStore, Instance, RuntimeError, TypeDescriptor};

/// Build the chain for `ty` and lock the result to the type's mode.
///
/// Every level is locked to its own type's mode as soon as that level is
/// complete.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn construct(
    ty: &TypeDescriptor,
    args: &Args,
    call_constructor: bool,
) -> Result<Instance, RuntimeError> {
    let instance = build_object(ty, args, call_constructor)?;
    instance.lock(ty.mode().flags());
    Ok(instance)
}

/// Build one level of a construction chain (and, recursively, the levels
/// below it).
pub fn build_object(
    ty: &TypeDescriptor,
    args: &Args,
    call_constructor: bool,
) -> Result<Instance, RuntimeError> {
    let (fields, base) = match ty.parent() {
        Some(parent) => {
            let base = construct(parent, args, false)?;
            (base.fields().clone(), Some(base))
        }
        None => (FieldStore::new(), None),
    };

    if base.is_some() {
        fields.overlay(ty.field_template());
    } else {
        fields.seed(ty.field_template());
    }
    for event in ty.events() {
        fields.ensure_channel(event);
    }

    let instance = Instance::new(ty, fields, base);
    trace!(
        type_name = ty.name(),
        depth = ty.depth(),
        call_constructor,
        "building instance level"
    );

    if call_constructor {
        instance.invoke_constructor(args)?;
    }

    if let Some(grand_base) = instance.base().and_then(Instance::base) {
        instance.fields().set_grand_base(grand_base);
    }
    instance.fields().set_most_derived(&instance);

    Ok(instance)
}
