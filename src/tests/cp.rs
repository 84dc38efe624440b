use std::io::Cursor;

use crate::prelude::*;

fn read_pool(bytes: &[u8], version: JavaVersion) -> Result<ConstantPool> {
    ConstantPool::read(version, &mut Cursor::new(bytes))
}

#[test]
fn test_add_deduplicates() {
    let mut pool = ConstantPool::new();
    let i = pool.add("hello");
    assert_eq!(pool.add(Constant::Utf8("hello".to_owned())), i);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_wide_constants_take_two_slots() {
    let mut pool = ConstantPool::new();
    let i = pool.add(Constant::Long(42));
    assert_eq!(i, 1);
    // The second slot is never assigned.
    assert_eq!(pool.get(i + 1), None);
    assert_eq!(pool.get_or_index(i + 1), Constant::Index(i + 1));
    assert_eq!(pool.add("next"), i + 2);

    let mut pool = ConstantPool::new();
    pool.add("pad");
    let d = pool.add(3.25f64);
    assert_eq!(d, 2);
    assert_eq!(pool.add(3.25f64), d);
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_add_index_is_identity() {
    let mut pool = ConstantPool::new();
    assert_eq!(pool.add(Constant::Index(7)), 7);
    assert!(pool.is_empty());
}

#[test]
fn test_forward_reference_resolves() {
    // A Class entry whose Utf8 referent appears later in the stream.
    let bytes = [
        0x00, 0x04, // count
        0x07, 0x00, 0x03, // 1: Class -> 3
        0x01, 0x00, 0x01, b'A', // 2: Utf8 "A"
        0x01, 0x00, 0x03, b'F', b'o', b'o', // 3: Utf8 "Foo"
    ];
    let pool = read_pool(&bytes, JavaVersion::JAVA_8).unwrap();
    assert_eq!(pool.get(1), Some(&Constant::Class("Foo".to_owned())));
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_fix_up_is_order_invariant() {
    let forward = [
        0x00, 0x03, //
        0x07, 0x00, 0x02, // 1: Class -> 2
        0x01, 0x00, 0x03, b'F', b'o', b'o', // 2: Utf8 "Foo"
    ];
    let backward = [
        0x00, 0x03, //
        0x01, 0x00, 0x03, b'F', b'o', b'o', // 1: Utf8 "Foo"
        0x07, 0x00, 0x01, // 2: Class -> 1
    ];
    let a = read_pool(&forward, JavaVersion::JAVA_8).unwrap();
    let b = read_pool(&backward, JavaVersion::JAVA_8).unwrap();
    assert_eq!(a.len(), b.len());
    for pool in [&a, &b] {
        assert!(pool.contains(&Constant::Class("Foo".to_owned())));
        assert!(pool.contains(&Constant::Utf8("Foo".to_owned())));
    }
}

#[test]
fn test_unknown_tag() {
    let bytes = [0x00, 0x02, 0x02];
    assert!(matches!(
        read_pool(&bytes, JavaVersion::JAVA_8),
        Err(Error::UnknownConstantTag(2))
    ));
}

#[test]
fn test_version_gating() {
    // A Module constant (tag 19, since 53.0) in a 52.0 file.
    let bytes = [0x00, 0x03, 0x13, 0x00, 0x02, 0x01, 0x00, 0x01, b'm'];
    match read_pool(&bytes, JavaVersion::JAVA_8) {
        Err(Error::VersionTooLow { kind, since, actual }) => {
            assert_eq!(kind, ConstantKind::Module);
            assert_eq!(since, JavaVersion::JAVA_9);
            assert_eq!(actual, JavaVersion::JAVA_8);
        }
        other => panic!("expected VersionTooLow, got {:?}", other.map(|p| p.len())),
    }
    // The same bytes are fine at 53.0.
    let pool = read_pool(&bytes, JavaVersion::JAVA_9).unwrap();
    assert_eq!(pool.get(1), Some(&Constant::Module("m".to_owned())));
}

#[test]
fn test_kind_mismatch() {
    // A Class entry whose referent is an Integer instead of a Utf8.
    let bytes = [
        0x00, 0x03, //
        0x03, 0x00, 0x00, 0x00, 0x05, // 1: Integer 5
        0x07, 0x00, 0x01, // 2: Class -> 1
    ];
    match read_pool(&bytes, JavaVersion::JAVA_8) {
        Err(Error::KindMismatch {
            expected, actual, at,
        }) => {
            assert_eq!(expected, "Utf8");
            assert_eq!(actual, ConstantKind::Integer);
            assert_eq!(at, 1);
        }
        other => panic!("expected KindMismatch, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_self_reference_is_unresolvable() {
    // A MethodHandle whose referent is itself can never make progress.
    let bytes = [0x00, 0x02, 0x0F, 0x05, 0x00, 0x01];
    assert!(matches!(
        read_pool(&bytes, JavaVersion::JAVA_8),
        Err(Error::UnresolvableReferences(1))
    ));
}

#[test]
fn test_truncated_pool() {
    // Count says two entries, stream ends inside the first.
    let bytes = [0x00, 0x03, 0x03, 0x00, 0x00];
    assert!(matches!(
        read_pool(&bytes, JavaVersion::JAVA_8),
        Err(Error::Truncated)
    ));
}

#[test]
fn test_set_materializes_only_empty_slots() {
    let mut pool = ConstantPool::new();
    pool.add(Constant::Long(1)); // occupies 1 and 2
    assert!(matches!(
        pool.set(1, Constant::Utf8("x".to_owned())),
        Err(Error::SlotOccupied(1))
    ));
    pool.set(2, Constant::Utf8("x".to_owned())).unwrap();
    assert_eq!(pool.get(2), Some(&Constant::Utf8("x".to_owned())));
    // Out of range slots are rejected.
    assert!(pool.set(9, Constant::Utf8("y".to_owned())).is_err());
    assert!(pool.set(0, Constant::Utf8("y".to_owned())).is_err());
}

#[test]
fn test_get_utf8() {
    let mut pool = ConstantPool::new();
    let i = pool.add_utf8("name");
    let c = pool.add_class("Foo");
    assert_eq!(pool.get_utf8(i).unwrap(), "name");
    assert!(matches!(
        pool.get_utf8(c),
        Err(Error::KindMismatch {
            expected: "Utf8",
            actual: ConstantKind::Class,
            at,
        }) if at == c
    ));
    assert!(pool.get_utf8(99).is_err());
}

#[test]
fn test_nul_encodes_as_c0_80() {
    let mut pool = ConstantPool::new();
    pool.add_utf8("a\u{0000}b");
    let mut bytes = Vec::new();
    pool.write_to(&mut bytes).unwrap();
    assert_eq!(
        bytes,
        vec![0x00, 0x02, 0x01, 0x00, 0x04, 0x61, 0xC0, 0x80, 0x62]
    );
}

#[test]
fn test_write_appends_referents() {
    // A method ref added to an empty pool pulls its Class, NameAndType and
    // Utf8 referents into the pool during the write walk.
    let mut pool = ConstantPool::new();
    pool.add(Constant::MethodRef(MemberRef::new(
        "Foo",
        "bar",
        Type::method(vec![Type::Int], None),
    )));
    let mut bytes = Vec::new();
    pool.write_to(&mut bytes).unwrap();

    let reread = read_pool(&bytes, JavaVersion::JAVA_8).unwrap();
    assert_eq!(reread.len(), pool.len());
    assert_eq!(
        reread.get(1),
        Some(&Constant::MethodRef(MemberRef::new(
            "Foo",
            "bar",
            Type::method(vec![Type::Int], None),
        )))
    );
    assert!(reread.contains(&Constant::Class("Foo".to_owned())));
    assert!(reread.contains(&Constant::Utf8("(I)V".to_owned())));
}

#[test]
fn test_method_handle_round_trip_is_lenient() {
    // Kind 5 (invokevirtual) with a field referent is accepted here; kind
    // agreement is a higher layer's concern.
    let field = Constant::FieldRef(MemberRef::new("Foo", "x", Type::Int));
    let mut pool = ConstantPool::new();
    pool.add(Constant::MethodHandle(MethodHandle {
        kind: ReferenceKind::InvokeVirtual,
        reference: Box::new(field.clone()),
    }));
    let mut bytes = Vec::new();
    pool.write_to(&mut bytes).unwrap();

    let reread = read_pool(&bytes, JavaVersion::JAVA_8).unwrap();
    match reread.get(1) {
        Some(Constant::MethodHandle(h)) => {
            assert_eq!(h.kind, ReferenceKind::InvokeVirtual);
            assert_eq!(*h.reference, field);
        }
        other => panic!("expected a method handle, got {:?}", other),
    }
}

#[test]
fn test_clear() {
    let mut pool = ConstantPool::new();
    pool.add("a");
    pool.add(Constant::Long(1));
    pool.clear();
    assert!(pool.is_empty());
    assert_eq!(pool.add("b"), 1);
}

#[test]
fn test_contains_by_index_and_value() {
    let mut pool = ConstantPool::new();
    let i = pool.add_string("s");
    assert!(pool.contains(&Constant::String("s".to_owned())));
    assert!(pool.contains(&Constant::Index(i)));
    assert!(pool.is_occupied(i));
    assert!(!pool.is_occupied(i + 1));
    assert!(!pool.contains(&Constant::Utf8("missing".to_owned())));
}
