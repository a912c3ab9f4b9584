//! Decoder tests over synthesized class-file bytes.

mod fixtures;

use fixtures::{op, ClassFileBuilder, GETFIELD, INVOKEVIRTUAL, LDC_W, NEW, RETURN};
use jardeps::classfile::{
    parse_class, ClassParseError, Instruction, ParseWarning, TypeDescriptor,
};

#[test]
fn parses_names_supertype_and_interfaces() {
    let mut builder = ClassFileBuilder::with_super("com/example/Foo", "com/example/Base");
    builder.interface("com/example/Doer");
    builder.interface("java/io/Serializable");

    let parsed = parse_class(&builder.build()).unwrap();
    let unit = parsed.unit;
    assert_eq!(unit.name.as_str(), "com.example.Foo");
    assert_eq!(
        unit.super_name.as_ref().map(|n| n.as_str()),
        Some("com.example.Base")
    );
    let interfaces: Vec<&str> = unit.interfaces.iter().map(|n| n.as_str()).collect();
    assert_eq!(interfaces, vec!["com.example.Doer", "java.io.Serializable"]);
    assert!(parsed.warnings.is_empty());
}

#[test]
fn parses_fields_and_method_signatures() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    builder.field("count", "I");
    builder.field("names", "[Ljava/lang/String;");
    builder.method("lookup", "(Ljava/lang/String;I)Lcom/example/Bar;");

    let parsed = parse_class(&builder.build()).unwrap();
    let unit = parsed.unit;
    assert_eq!(unit.fields.len(), 2);
    assert_eq!(unit.fields[0].name, "count");
    assert_eq!(
        unit.fields[1].descriptor.object_name().map(|n| n.as_str()),
        Some("java.lang.String")
    );

    let method = &unit.methods[0];
    assert_eq!(method.name, "lookup");
    assert_eq!(method.descriptor.parameters.len(), 2);
    assert_eq!(
        method.descriptor.return_type.object_name().map(|n| n.as_str()),
        Some("com.example.Bar")
    );
    assert!(method.code.is_none());
}

#[test]
fn parses_declared_exceptions() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    builder.method_with_exceptions("risky", "()V", &["com/example/Boom", "java/io/IOException"]);

    let parsed = parse_class(&builder.build()).unwrap();
    let exceptions: Vec<&str> = parsed.unit.methods[0]
        .exceptions
        .iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(exceptions, vec!["com.example.Boom", "java.io.IOException"]);
}

#[test]
fn decodes_instruction_stream_operands() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    let field = builder.field_ref("com/example/Holder", "value", "Lcom/example/Held;");
    let method = builder.method_ref("com/example/Service", "run", "(I)V");
    let created = builder.class("com/example/Created");
    let loaded = builder.class("com/example/Loaded");

    let mut code = Vec::new();
    code.extend_from_slice(&op(GETFIELD, field));
    code.extend_from_slice(&op(INVOKEVIRTUAL, method));
    code.extend_from_slice(&op(NEW, created));
    code.extend_from_slice(&op(LDC_W, loaded));
    code.push(RETURN);
    builder.method_with_code("body", "()V", &code);

    let parsed = parse_class(&builder.build()).unwrap();
    let instructions = parsed.unit.methods[0].code.as_ref().unwrap();
    assert_eq!(instructions.len(), 5);

    match &instructions[0] {
        Instruction::Field { owner, name, descriptor, .. } => {
            assert_eq!(owner.as_str(), "com.example.Holder");
            assert_eq!(name, "value");
            assert_eq!(
                descriptor.object_name().map(|n| n.as_str()),
                Some("com.example.Held")
            );
        }
        other => panic!("expected field access, got {:?}", other),
    }
    match &instructions[1] {
        Instruction::Invoke { owner, name, .. } => {
            assert_eq!(owner.object_name().map(|n| n.as_str()), Some("com.example.Service"));
            assert_eq!(name, "run");
        }
        other => panic!("expected invocation, got {:?}", other),
    }
    match &instructions[2] {
        Instruction::Type { target, .. } => {
            assert_eq!(
                target,
                &TypeDescriptor::Object(jardeps::QualifiedName::new("com.example.Created"))
            );
        }
        other => panic!("expected type instruction, got {:?}", other),
    }
    match &instructions[3] {
        Instruction::LoadType { descriptor } => {
            assert_eq!(
                descriptor.object_name().map(|n| n.as_str()),
                Some("com.example.Loaded")
            );
        }
        other => panic!("expected type constant load, got {:?}", other),
    }
}

#[test]
fn unknown_attribute_is_warned_not_fatal() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    builder.method_with_raw_attribute("weird", "()V", "VendorSpecificThing", &[1, 2, 3]);

    let parsed = parse_class(&builder.build()).unwrap();
    assert_eq!(parsed.unit.methods.len(), 1);
    assert_eq!(
        parsed.warnings,
        vec![ParseWarning::UnsupportedAttribute {
            location: "method 'weird'".to_string(),
            name: "VendorSpecificThing".to_string(),
        }]
    );
}

#[test]
fn known_but_undecoded_attributes_are_silent() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    builder.method_with_raw_attribute("plain", "()V", "Deprecated", &[]);

    let parsed = parse_class(&builder.build()).unwrap();
    assert!(parsed.warnings.is_empty());
}

#[test]
fn bad_magic_is_rejected() {
    let bytes = [0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52];
    assert!(matches!(
        parse_class(&bytes),
        Err(ClassParseError::InvalidMagic)
    ));
}

#[test]
fn truncated_header_is_rejected() {
    let full = ClassFileBuilder::new("com/example/Foo").build();
    for len in [2usize, 6, 9, 12] {
        assert!(
            parse_class(&full[..len]).is_err(),
            "prefix of {} bytes should not parse",
            len
        );
    }
}

#[test]
fn truncated_tail_is_rejected() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    builder.field("count", "I");
    let full = builder.build();
    assert!(parse_class(&full[..full.len() - 3]).is_err());
}

#[test]
fn preposterous_version_is_rejected() {
    let mut bytes = ClassFileBuilder::new("com/example/Foo").build();
    // major version lives at offset 6..8
    bytes[6] = 0;
    bytes[7] = 1;
    assert!(matches!(
        parse_class(&bytes),
        Err(ClassParseError::UnsupportedVersion { .. })
    ));
}

#[test]
fn array_class_constant_in_checkcast_is_handled() {
    let mut builder = ClassFileBuilder::new("com/example/Foo");
    let array_class = builder.class("[Lcom/example/Elem;");
    let mut code = op(fixtures::CHECKCAST, array_class);
    code.push(RETURN);
    builder.method_with_code("cast", "()V", &code);

    let parsed = parse_class(&builder.build()).unwrap();
    let instructions = parsed.unit.methods[0].code.as_ref().unwrap();
    match &instructions[0] {
        Instruction::Type { target, .. } => {
            assert_eq!(
                target.object_name().map(|n| n.as_str()),
                Some("com.example.Elem")
            );
        }
        other => panic!("expected type instruction, got {:?}", other),
    }
}
