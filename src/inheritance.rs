//! Definition-time inheritance flattening.
//!
//! A derived type's member table is the parent's table shadowed by the
//! child's own members. Flattening runs once, when the type is declared, so
//! member lookup on an instance is a single table probe.

use classweave_core::{FieldTemplate, Member, MemberTable, TypeDescriptor};

/// Copy every parent member the child does not declare itself.
///
/// Methods are shared by reference. Accessors are rebuilt so the derived
/// table owns its own accessor values; the bodies stay shared. Event markers
/// are copied as-is.
///
/// Returns the number of inherited members.
pub fn flatten_members(parent: &TypeDescriptor, members: &mut MemberTable) -> usize {
    let mut inherited = 0;
    for (name, member) in parent.members().iter() {
        let copy = match member {
            Member::Method(method) => Member::Method(method.clone()),
            Member::Accessor(accessor) => Member::Accessor(accessor.rebuild()),
            Member::Event => Member::Event,
        };
        if members.insert_if_absent(name, copy) {
            inherited += 1;
        }
    }
    inherited
}

/// Merge the parent's field template, keeping the child's defaults.
///
/// Parent fields come first so seeding order follows the chain.
pub fn flatten_fields(parent: &TypeDescriptor, fields: &mut FieldTemplate) {
    let mut merged: FieldTemplate = parent
        .field_template()
        .iter()
        .filter(|(name, _)| !fields.iter().any(|(own, _)| own == name))
        .cloned()
        .collect();
    merged.append(fields);
    *fields = merged;
}

/// Events the parent exposes that `events` does not list yet, appended.
pub fn flatten_events(parent: &TypeDescriptor, events: &mut Vec<String>) {
    for event in parent.events() {
        if !events.contains(event) {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classweave_core::{Accessor, Method, TypeDef, Value};

    fn parent() -> TypeDescriptor {
        let mut members = MemberTable::new();
        members.insert("f", Member::Method(Method::new("f", 0, |_, _| Ok("base".into()))));
        members.insert("g", Member::Method(Method::new("g", 0, |_, _| Ok("g".into()))));
        members.insert(
            "name",
            Member::Accessor(Accessor::new().with_getter(|_| Ok(Value::from("n")))),
        );
        members.insert("changed", Member::Event);
        TypeDescriptor::new(TypeDef {
            name: "Parent".into(),
            members,
            events: vec!["changed".into()],
            fields: vec![
                ("a".into(), Value::Int(1)),
                ("b".into(), Value::Int(2)),
            ],
            ..TypeDef::default()
        })
    }

    #[test]
    fn child_shadows_parent() {
        let parent = parent();
        let mut members = MemberTable::new();
        let own_f = Method::new("f", 0, |_, _| Ok("derived".into()));
        members.insert("f", Member::Method(own_f.clone()));

        let inherited = flatten_members(&parent, &mut members);
        assert_eq!(inherited, 3);
        assert!(members.method("f").unwrap().ptr_eq(&own_f));
        assert!(
            members
                .method("g")
                .unwrap()
                .ptr_eq(parent.members().method("g").unwrap())
        );
        assert!(members.get("name").unwrap().as_accessor().unwrap().is_readable());
        assert!(members.get("changed").unwrap().is_event());
    }

    #[test]
    fn fields_keep_child_defaults() {
        let parent = parent();
        let mut fields: FieldTemplate = vec![("b".into(), Value::Int(20)), ("c".into(), Value::Int(3))];
        flatten_fields(&parent, &mut fields);

        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(fields[1].1, Value::Int(20));
    }

    #[test]
    fn events_are_unioned() {
        let parent = parent();
        let mut events = vec!["saved".to_string()];
        flatten_events(&parent, &mut events);
        assert_eq!(events, ["saved", "changed"]);
    }
}
