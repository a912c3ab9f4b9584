use super::reader::ClassReader;
use super::ClassParseError;

/// One constant pool entry.
///
/// Only the variants the analyzer consumes keep their payload; everything
/// else collapses to `Other` after its bytes are skipped. `Unusable` fills
/// index 0 and the phantom slot after every 8-byte constant.
#[derive(Debug, Clone)]
pub(crate) enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    Other,
    Unusable,
}

pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

/// A member reference resolved through the pool, still in internal
/// (slash-separated) form.
pub(crate) struct MemberRef<'a> {
    pub(crate) owner: &'a str,
    pub(crate) name: &'a str,
    pub(crate) descriptor: &'a str,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    Constant::Utf8(String::from_utf8(bytes.to_vec())?)
                }
                // Integer, Float
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                // Long, Double take two slots
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                // String
                8 => {
                    reader.read_u2()?;
                    Constant::Other
                }
                9 => Constant::FieldRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                10 => Constant::MethodRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                11 => Constant::InterfaceMethodRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                12 => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                // MethodHandle
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                // MethodType
                16 => {
                    reader.read_u2()?;
                    Constant::Other
                }
                // Dynamic, InvokeDynamic
                17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                // Module, Package
                19 | 20 => {
                    reader.read_u2()?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Internal (slash-form) name behind a `Class` constant.
    pub(crate) fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Resolve a Fieldref, Methodref or InterfaceMethodref.
    pub(crate) fn member_ref(&self, index: u16) -> Result<MemberRef<'_>, ClassParseError> {
        let (class_index, name_and_type_index) = match self.get(index)? {
            Constant::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Constant::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => return Err(ClassParseError::InvalidConstantIndex { index }),
        };

        let (name_index, descriptor_index) = match self.get(name_and_type_index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => (*name_index, *descriptor_index),
            _ => {
                return Err(ClassParseError::InvalidConstantIndex {
                    index: name_and_type_index,
                })
            }
        };

        Ok(MemberRef {
            owner: self.class_name(class_index)?,
            name: self.utf8(name_index)?,
            descriptor: self.utf8(descriptor_index)?,
        })
    }
}
