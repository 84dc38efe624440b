use crate::ty::{parse_field_descriptor, parse_method_descriptor, Type};
use crate::Error;

#[test]
fn test_parse_field_descriptor() {
    assert_eq!(parse_field_descriptor("I").unwrap(), Type::Int);
    assert_eq!(
        parse_field_descriptor("Ljava/lang/String;").unwrap(),
        Type::Ref("java/lang/String".to_owned())
    );
    assert_eq!(
        parse_field_descriptor("[[J").unwrap(),
        Type::ArrayRef(2, Box::new(Type::Long))
    );
}

#[test]
fn test_parse_method_descriptor() {
    let (parameters, ret) = parse_method_descriptor("(IJLjava/lang/Object;)V").unwrap();
    assert_eq!(
        parameters,
        vec![
            Type::Int,
            Type::Long,
            Type::Ref("java/lang/Object".to_owned())
        ]
    );
    assert_eq!(ret, None);

    let (parameters, ret) = parse_method_descriptor("([B)Ljava/lang/String;").unwrap();
    assert_eq!(parameters, vec![Type::ArrayRef(1, Box::new(Type::Byte))]);
    assert_eq!(ret, Some(Type::Ref("java/lang/String".to_owned())));
}

#[test]
fn test_descriptor_display_round_trip() {
    for d in ["I", "[[Ljava/lang/Iterable;", "(ZBS)D", "()V", "([J[[D)[I"] {
        assert_eq!(
            crate::ty::parse_descriptor(d).unwrap().to_string(),
            d
        );
    }
}

#[test]
fn test_invalid_descriptors() {
    for d in ["", "Q", "L;", "Ljava/lang/String", "(I", "II", "[(I)V", "(I)(I)V"] {
        assert!(
            matches!(parse_field_descriptor(d), Err(Error::InvalidDescriptor(_))),
            "{:?} should not parse",
            d
        );
    }
    // A method descriptor is not a field descriptor.
    assert!(matches!(
        parse_field_descriptor("(I)V"),
        Err(Error::InvalidDescriptor(_))
    ));
    assert!(matches!(
        parse_method_descriptor("I"),
        Err(Error::InvalidDescriptor(_))
    ));
}

#[test]
fn test_array_helper_flattens() {
    let t = Type::array(2, Type::array(1, Type::Int));
    assert_eq!(t, Type::ArrayRef(3, Box::new(Type::Int)));
    assert!(Type::Double.is_wide());
    assert!(!Type::Int.is_wide());
}
