//! Container codec: host arrays and hashes to managed containers and back.

use hostbind::prelude::*;

#[test]
fn test_nested_roundtrip() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let inner = HostArray::from_values([HostValue::text("x"), HostValue::text("y")]);
    let hash = HostHash::from_pairs([
        ("list", HostValue::from(inner)),
        ("name", HostValue::text("doc")),
    ]);
    let obj = marshal
        .host_to_managed(&HostValue::from(hash))
        .ok_or_else(|| anyhow::anyhow!("hash converted to nothing"))?;
    assert_eq!(obj.class_name(), "Hash");

    let back = marshal.to_host(Some(&obj))?;
    let back = back.as_hash().ok_or_else(|| anyhow::anyhow!("not a hash"))?;
    assert_eq!(back.fetch("name"), Some(HostValue::text("doc")));
    let list = back
        .fetch("list")
        .and_then(|v| v.as_array().cloned())
        .ok_or_else(|| anyhow::anyhow!("missing list"))?;
    assert_eq!(list.fetch(0), Some(HostValue::text("x")));
    assert_eq!(list.fetch(1), Some(HostValue::text("y")));
    Ok(())
}

#[test]
fn test_sparse_array_asymmetry() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let array = HostArray::new();
    array.store(0, HostValue::text("a"));
    array.store(3, HostValue::Undef);
    array.store(2, HostValue::text("c"));

    let obj = marshal.array_to_managed(&array);
    match &*obj.body() {
        ObjBody::Array(items) => {
            assert_eq!(items.len(), 4);
            assert!(items.get(1).is_some_and(Option::is_none));
            assert!(items.get(3).is_some_and(Option::is_none));
        }
        other => anyhow::bail!("unexpected body {:?}", other),
    }

    let back = marshal.array_to_host(&obj)?;
    let back = back.as_array().ok_or_else(|| anyhow::anyhow!("not an array"))?;
    assert_eq!(back.len(), 4);
    assert!(back.is_hole(1));
    // The trailing Undef comes back as a hole, not as Undef.
    assert!(back.is_hole(3));
    assert_eq!(back.fetch(2), Some(HostValue::text("c")));
    Ok(())
}

#[test]
fn test_trailing_holes_are_trimmed() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let array = HostArray::from_slots([Some(HostValue::Int(1)), None, None]);
    let obj = marshal.array_to_managed(&array);
    match &*obj.body() {
        ObjBody::Array(items) => assert_eq!(items.len(), 1),
        other => anyhow::bail!("unexpected body {:?}", other),
    }
    Ok(())
}

#[test]
fn test_hash_keys_become_text() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let hash = HostHash::new();
    hash.store(HostStr::bytes(b"plain"), HostValue::Int(1));
    hash.store(HostStr::text("日本"), HostValue::Int(2));
    hash.store(HostStr::bytes(&[0x63, 0x61, 0x66, 0xe9]), HostValue::Int(3));

    let obj = marshal.hash_to_managed(&hash);
    match &*obj.body() {
        ObjBody::Hash(map) => {
            assert_eq!(map.len(), 3);
            assert!(map.contains_key("plain"));
            assert!(map.contains_key("日本"));
            assert!(map.contains_key("café"));
        }
        other => anyhow::bail!("unexpected body {:?}", other),
    }
    Ok(())
}

#[test]
fn test_undef_hash_value_roundtrips() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let hash = HostHash::from_pairs([("gone", HostValue::Undef)]);
    let obj = marshal.hash_to_managed(&hash);
    let back = marshal.hash_to_host(&obj)?;
    let back = back.as_hash().ok_or_else(|| anyhow::anyhow!("not a hash"))?;
    assert!(back.contains_key("gone"));
    assert_eq!(back.fetch("gone"), Some(HostValue::Undef));
    Ok(())
}

#[test]
fn test_non_text_key_fails() {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let mut map = ObjHash::with_capacity(1);
    map.store(Obj::integer32(5), Some(Obj::charbuf("five")));
    let err = marshal.hash_to_host(&Obj::hash(map)).unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { .. }));
    assert!(err.to_string().contains("Integer32"));
}

#[test]
fn test_last_write_wins_for_equal_keys() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let mut map = ObjHash::with_capacity(2);
    map.store(Obj::charbuf("k"), Some(Obj::charbuf("first")));
    map.store(Obj::charbuf("k"), Some(Obj::charbuf("second")));
    let back = marshal.hash_to_host(&Obj::hash(map))?;
    let back = back.as_hash().ok_or_else(|| anyhow::anyhow!("not a hash"))?;
    assert_eq!(back.len(), 1);
    assert_eq!(back.fetch("k"), Some(HostValue::text("second")));
    Ok(())
}

#[test]
fn test_wrapped_element_shares_instance() -> anyhow::Result<()> {
    let runtime = HostRuntime::new(IntWidth::W64);
    let marshal = Marshal::new(&runtime);

    let shared = Obj::make(marshal.registry().builtin(Builtin::Obj));
    let array = HostArray::from_values([marshal.wrap_existing(&shared)]);
    let obj = marshal.array_to_managed(&array);
    match &*obj.body() {
        ObjBody::Array(items) => {
            let first = items.first().and_then(Option::as_ref);
            assert!(first.is_some_and(|o| o.ptr_eq(&shared)));
        }
        other => anyhow::bail!("unexpected body {:?}", other),
    }
    Ok(())
}
