use super::code::decode_code;
use super::descriptor::{MethodDescriptor, TypeDescriptor};
use super::pool::ConstantPool;
use super::reader::ClassReader;
use super::{ClassParseError, ClassUnit, Field, Method, ParseWarning, QualifiedName};

/// First class-file version ever emitted (JDK 1.0.2).
const MIN_MAJOR_VERSION: u16 = 45;

/// Attribute kinds we either decode or can safely ignore. Anything outside
/// this set is skipped by its declared length and surfaced as a warning so
/// coverage stays visible to the caller.
const KNOWN_ATTRIBUTES: &[&str] = &[
    "AnnotationDefault",
    "BootstrapMethods",
    "Code",
    "ConstantValue",
    "Deprecated",
    "EnclosingMethod",
    "Exceptions",
    "InnerClasses",
    "LineNumberTable",
    "LocalVariableTable",
    "LocalVariableTypeTable",
    "MethodParameters",
    "Module",
    "ModuleMainClass",
    "ModulePackages",
    "NestHost",
    "NestMembers",
    "PermittedSubclasses",
    "Record",
    "RuntimeInvisibleAnnotations",
    "RuntimeInvisibleParameterAnnotations",
    "RuntimeInvisibleTypeAnnotations",
    "RuntimeVisibleAnnotations",
    "RuntimeVisibleParameterAnnotations",
    "RuntimeVisibleTypeAnnotations",
    "Signature",
    "SourceDebugExtension",
    "SourceFile",
    "StackMapTable",
    "Synthetic",
];

/// A decoded unit plus the non-fatal oddities met along the way.
#[derive(Debug)]
pub struct ParseOutput {
    pub unit: ClassUnit,
    pub warnings: Vec<ParseWarning>,
}

/// Decode one raw class file into a [`ClassUnit`].
///
/// Best-effort and forward compatible: unrecognized attributes are skipped
/// (warned about), unrecognized opcodes abort only the enclosing method
/// body. A broken length, offset or constant index is fatal for the unit.
pub fn parse_class(bytes: &[u8]) -> Result<ParseOutput, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    reader.expect_magic()?;
    let minor = reader.read_u2()?;
    let major = reader.read_u2()?;
    if major < MIN_MAJOR_VERSION {
        return Err(ClassParseError::UnsupportedVersion { major, minor });
    }

    let pool = ConstantPool::parse(&mut reader)?;
    let mut warnings = Vec::new();

    let _access_flags = reader.read_u2()?;
    let this_class = reader.read_u2()?;
    let super_class = reader.read_u2()?;

    let name = QualifiedName::from_internal(pool.class_name(this_class)?);
    // index 0 marks the hierarchy root (java.lang.Object)
    let super_name = if super_class == 0 {
        None
    } else {
        Some(QualifiedName::from_internal(pool.class_name(super_class)?))
    };

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let index = reader.read_u2()?;
        interfaces.push(QualifiedName::from_internal(pool.class_name(index)?));
    }

    let fields_count = reader.read_u2()?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for _ in 0..fields_count {
        let _access_flags = reader.read_u2()?;
        let field_name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = TypeDescriptor::parse(pool.utf8(reader.read_u2()?)?)?;
        let attributes_count = reader.read_u2()?;
        skip_attributes(
            &mut reader,
            &pool,
            attributes_count,
            &format!("field '{}'", field_name),
            &mut warnings,
        )?;
        fields.push(Field {
            name: field_name,
            descriptor,
        });
    }

    let methods_count = reader.read_u2()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        methods.push(parse_method(&mut reader, &pool, &mut warnings)?);
    }

    let attributes_count = reader.read_u2()?;
    skip_attributes(&mut reader, &pool, attributes_count, "class", &mut warnings)?;

    Ok(ParseOutput {
        unit: ClassUnit {
            name,
            super_name,
            interfaces,
            fields,
            methods,
        },
        warnings,
    })
}

fn parse_method(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Method, ClassParseError> {
    let _access_flags = reader.read_u2()?;
    let method_name = pool.utf8(reader.read_u2()?)?.to_string();
    let descriptor = MethodDescriptor::parse(pool.utf8(reader.read_u2()?)?)?;

    let mut exceptions = Vec::new();
    let mut code = None;

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let attribute_name = pool.utf8(reader.read_u2()?)?;
        let attribute_length = reader.read_u4()? as usize;
        match attribute_name {
            "Code" => {
                let slice = reader.read_slice(attribute_length)?;
                code = Some(parse_code_attribute(
                    slice,
                    pool,
                    &method_name,
                    warnings,
                )?);
            }
            "Exceptions" => {
                let slice = reader.read_slice(attribute_length)?;
                let mut sub = ClassReader::new(slice);
                let count = sub.read_u2()?;
                for _ in 0..count {
                    let index = sub.read_u2()?;
                    exceptions.push(QualifiedName::from_internal(pool.class_name(index)?));
                }
            }
            known if KNOWN_ATTRIBUTES.contains(&known) => {
                reader.skip(attribute_length)?;
            }
            unknown => {
                warnings.push(ParseWarning::UnsupportedAttribute {
                    location: format!("method '{}'", method_name),
                    name: unknown.to_string(),
                });
                reader.skip(attribute_length)?;
            }
        }
    }

    Ok(Method {
        name: method_name,
        descriptor,
        exceptions,
        code,
    })
}

/// The `Code` attribute nests the actual bytecode between a small header
/// and a trailer of exception handlers plus further attributes.
fn parse_code_attribute(
    slice: &[u8],
    pool: &ConstantPool,
    method_name: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Vec<super::code::Instruction>, ClassParseError> {
    let mut sub = ClassReader::new(slice);
    let _max_stack = sub.read_u2()?;
    let _max_locals = sub.read_u2()?;
    let code_length = sub.read_u4()? as usize;
    let code = sub.read_slice(code_length)?;

    let (instructions, code_warnings) = decode_code(method_name, code, pool)?;
    warnings.extend(code_warnings);

    let exception_table_length = sub.read_u2()?;
    sub.skip(exception_table_length as usize * 8)?;
    let attributes_count = sub.read_u2()?;
    skip_attributes(
        &mut sub,
        pool,
        attributes_count,
        &format!("method '{}' code", method_name),
        warnings,
    )?;

    Ok(instructions)
}

fn skip_attributes(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
    count: u16,
    location: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Result<(), ClassParseError> {
    for _ in 0..count {
        let attribute_name = pool.utf8(reader.read_u2()?)?;
        let attribute_length = reader.read_u4()? as usize;
        if !KNOWN_ATTRIBUTES.contains(&attribute_name) {
            warnings.push(ParseWarning::UnsupportedAttribute {
                location: location.to_string(),
                name: attribute_name.to_string(),
            });
        }
        reader.skip(attribute_length)?;
    }
    Ok(())
}
