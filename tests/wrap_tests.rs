//! Wrapping, unwrapping, blank allocation and the outward dispatcher.

use hostbind::prelude::*;

#[test]
fn test_wrap_adds_one_count() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let obj = Obj::make(marshal.registry().builtin(Builtin::Obj));
    assert_eq!(obj.refcount(), 1);
    let wrapped = marshal.wrap_existing(&obj);
    assert_eq!(obj.refcount(), 2);

    let scope = CallScope::new();
    let expected = marshal.registry().builtin(Builtin::Obj);
    let arg = marshal.to_obj(&wrapped, &expected, None, &scope)?;
    assert_eq!(arg.ownership(), Ownership::Borrowed);
    assert!(arg.as_obj().is_some_and(|o| o.ptr_eq(&obj)));
    // Unwrapping lends; it does not count.
    assert_eq!(obj.refcount(), 2);
    assert!(scope.is_empty());

    drop(wrapped);
    assert_eq!(obj.refcount(), 1);
    Ok(())
}

#[test]
fn test_unwrap_checks_type() {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let scope = CallScope::new();

    let wrapped = marshal.wrap_existing(&Obj::charbuf("text"));
    let varray = marshal.registry().builtin(Builtin::VArray);
    assert!(marshal.maybe_to_obj(&wrapped, &varray, None, &scope).is_none());
    let err = marshal.to_obj(&wrapped, &varray, None, &scope).unwrap_err();
    assert_eq!(err.to_string(), "Not a VArray");

    assert!(marshal
        .maybe_to_obj(&HostValue::Undef, &varray, None, &scope)
        .is_none());
}

#[test]
fn test_text_view_borrows_canonical_strings() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let scope = CallScope::new();
    let charbuf = marshal.registry().builtin(Builtin::CharBuf);

    let value = HostValue::text("abc");
    let mut storage = String::new();
    let arg = marshal.to_obj(&value, &charbuf, Some(&mut storage), &scope)?;
    assert_eq!(arg.class_name(), "ZombieCharBuf");
    assert_eq!(arg.text().as_deref(), Some("abc"));
    assert!(arg.as_obj().is_none());
    assert!(scope.is_empty());
    drop(arg);
    assert!(storage.is_empty());
    Ok(())
}

#[test]
fn test_text_view_uses_storage_for_octets() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let scope = CallScope::new();
    let obj_type = marshal.registry().builtin(Builtin::Obj);

    let value = HostValue::bytes(&[0x63, 0x61, 0x66, 0xe9]);
    let mut storage = String::new();
    let arg = marshal.to_obj(&value, &obj_type, Some(&mut storage), &scope)?;
    assert_eq!(arg.text().as_deref(), Some("café"));
    let owned = arg.to_owned_obj();
    assert_eq!(owned.class_name(), "CharBuf");
    drop(arg);
    assert_eq!(storage, "café");

    let number = HostValue::Int(17);
    let mut storage = String::new();
    let arg = marshal.to_obj(&number, &obj_type, Some(&mut storage), &scope)?;
    assert_eq!(arg.text().as_deref(), Some("17"));
    Ok(())
}

#[test]
fn test_strings_need_storage() {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let scope = CallScope::new();
    let charbuf = marshal.registry().builtin(Builtin::CharBuf);

    let value = HostValue::text("abc");
    assert!(marshal.maybe_to_obj(&value, &charbuf, None, &scope).is_none());

    // Only exact text targets get a view.
    let bytebuf = marshal.registry().builtin(Builtin::ByteBuf);
    let mut storage = String::new();
    assert!(marshal
        .maybe_to_obj(&value, &bytebuf, Some(&mut storage), &scope)
        .is_none());
}

#[test]
fn test_containers_are_scope_bound() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let scope = CallScope::new();

    let array = HostValue::from(HostArray::from_values([HostValue::Int(1)]));
    let varray = marshal.registry().builtin(Builtin::VArray);
    let arg = marshal.to_obj(&array, &varray, None, &scope)?;
    assert_eq!(arg.ownership(), Ownership::ScopeBound);
    assert_eq!(arg.class_name(), "VArray");
    assert_eq!(scope.len(), 1);

    let kept = arg.to_owned_obj();
    assert_eq!(kept.refcount(), 2);
    drop(scope);
    assert_eq!(kept.refcount(), 1);
    Ok(())
}

#[test]
fn test_container_type_must_match_exactly() {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let scope = CallScope::new();

    let array = HostValue::from(HostArray::new());
    let hash = marshal.registry().builtin(Builtin::Hash);
    let obj_type = marshal.registry().builtin(Builtin::Obj);
    assert!(marshal.maybe_to_obj(&array, &hash, None, &scope).is_none());
    assert!(marshal.maybe_to_obj(&array, &obj_type, None, &scope).is_none());
    assert!(scope.is_empty());
}

#[test]
fn test_new_blank_obj() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    runtime.declare_class("WrapTests::Child", "WrapTests::Parent");
    runtime.declare_class("WrapTests::Parent", "Hash");
    let marshal = Marshal::new(&runtime);

    let by_name = marshal.new_blank_obj(&HostValue::text("Hash"))?;
    assert_eq!(by_name.class_name(), "Hash");
    assert!(matches!(&*by_name.body(), ObjBody::Hash(h) if h.is_empty()));

    let by_instance = marshal.new_blank_obj(&marshal.wrap_existing(&by_name))?;
    assert_eq!(by_instance.class_name(), "Hash");
    assert!(!by_instance.ptr_eq(&by_name));

    let child = marshal.new_blank_obj(&HostValue::text("WrapTests::Child"))?;
    assert_eq!(child.class_name(), "WrapTests::Child");
    assert!(child.is_a(&marshal.registry().builtin(Builtin::Hash)));
    assert!(marshal.registry().find("WrapTests::Parent").is_some());

    let err = marshal
        .new_blank_obj(&HostValue::text("WrapTests::Nobody"))
        .unwrap_err();
    assert!(matches!(err, BindError::UnknownClass { .. }));
    Ok(())
}

#[test]
fn test_dispatch_precedence() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);
    let registry = marshal.registry();

    assert_eq!(marshal.to_host(None)?, HostValue::Undef);
    assert_eq!(marshal.to_host(Some(&Obj::boolean(true)))?, HostValue::Int(1));
    assert_eq!(marshal.to_host(Some(&Obj::boolean(false)))?, HostValue::Int(0));
    assert_eq!(
        Outward::classify(&Obj::boolean(true), registry, IntWidth::W64),
        Outward::True
    );

    // A text subclass goes out as text.
    let text_type = registry.singleton("WrapTests::Label", &registry.builtin(Builtin::CharBuf));
    let label = Obj::with_body(text_type, ObjBody::Text("hi".to_string()));
    assert_eq!(marshal.to_host(Some(&label))?, HostValue::text("hi"));

    assert_eq!(marshal.to_host(Some(&Obj::float64(0.25)))?, HostValue::Num(0.25));
    assert_eq!(
        marshal.to_host(Some(&Obj::integer64(1 << 40)))?,
        HostValue::Int(1 << 40)
    );
    assert_eq!(
        marshal.to_host(Some(&Obj::bytebuf(b"\xff")))?,
        HostValue::bytes(b"\xff")
    );

    let plain = Obj::make(registry.builtin(Builtin::Obj));
    let wrapped = marshal.to_host(Some(&plain))?;
    let wrapper = wrapped
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("expected a wrapper"))?;
    assert!(wrapper.obj().ptr_eq(&plain));
    Ok(())
}

#[test]
fn test_dispatch_on_narrow_host() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W32);
    let marshal = Marshal::new(&runtime);

    assert_eq!(
        marshal.to_host(Some(&Obj::integer64(1 << 40)))?,
        HostValue::Num((1u64 << 40) as f64)
    );
    assert_eq!(marshal.to_host(Some(&Obj::integer32(-7)))?, HostValue::Int(-7));
    assert_eq!(
        Outward::classify(&Obj::integer64(1), marshal.registry(), IntWidth::W32),
        Outward::WideInteger
    );
    Ok(())
}
