use super::descriptor::{MethodDescriptor, TypeDescriptor};
use super::pool::{Constant, ConstantPool};
use super::{ClassParseError, ParseWarning, QualifiedName};

// Reference-bearing opcodes. Everything else is kept as `Other`.
const GETSTATIC: u8 = 0xb2;
const PUTFIELD: u8 = 0xb5;
const INVOKEVIRTUAL: u8 = 0xb6;
const INVOKEINTERFACE: u8 = 0xb9;
const INVOKEDYNAMIC: u8 = 0xba;
const NEW: u8 = 0xbb;
const ANEWARRAY: u8 = 0xbd;
const CHECKCAST: u8 = 0xc0;
const INSTANCEOF: u8 = 0xc1;
const MULTIANEWARRAY: u8 = 0xc5;
const LDC: u8 = 0x12;
const LDC_W: u8 = 0x13;
const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

/// One decoded instruction.
///
/// Only shapes that can carry a symbolic reference keep their operands,
/// already resolved through the constant pool and normalized to dotted
/// names; the rest collapse to `Other` so the stream stays walkable.
#[derive(Debug, Clone)]
pub enum Instruction {
    /// getstatic / putstatic / getfield / putfield.
    Field {
        opcode: u8,
        owner: QualifiedName,
        name: String,
        descriptor: TypeDescriptor,
    },
    /// invokevirtual / invokespecial / invokestatic / invokeinterface.
    /// The owner can be an array class (`clone()` on arrays), hence a
    /// descriptor rather than a plain name.
    Invoke {
        opcode: u8,
        owner: TypeDescriptor,
        name: String,
        descriptor: MethodDescriptor,
    },
    /// new / anewarray / checkcast / instanceof / multianewarray.
    Type { opcode: u8, target: TypeDescriptor },
    /// ldc / ldc_w of a Class constant.
    LoadType { descriptor: TypeDescriptor },
    Other { opcode: u8 },
}

/// Decode the body of one `Code` attribute into an instruction stream.
///
/// A structurally broken stream (truncated operand, switch table past the
/// end) is fatal for the unit. An opcode outside the known set only aborts
/// this one method with a warning: the code length is declared by the
/// enclosing attribute, so the rest of the unit is unaffected.
pub(crate) fn decode_code(
    method_name: &str,
    code: &[u8],
    pool: &ConstantPool,
) -> Result<(Vec<Instruction>, Vec<ParseWarning>), ClassParseError> {
    let mut instructions = Vec::new();
    let mut warnings = Vec::new();
    let mut pc = 0usize;

    while pc < code.len() {
        let opcode = code[pc];
        match opcode {
            GETSTATIC..=PUTFIELD => {
                let member = pool.member_ref(read_u2_at(code, pc + 1)?)?;
                instructions.push(Instruction::Field {
                    opcode,
                    owner: QualifiedName::from_internal(member.owner),
                    name: member.name.to_string(),
                    descriptor: TypeDescriptor::parse(member.descriptor)?,
                });
                pc += 3;
            }
            INVOKEVIRTUAL..=INVOKEINTERFACE => {
                let member = pool.member_ref(read_u2_at(code, pc + 1)?)?;
                instructions.push(Instruction::Invoke {
                    opcode,
                    owner: TypeDescriptor::from_class_constant(member.owner)?,
                    name: member.name.to_string(),
                    descriptor: MethodDescriptor::parse(member.descriptor)?,
                });
                // invokeinterface trails a count byte and a zero byte
                pc += if opcode == INVOKEINTERFACE { 5 } else { 3 };
            }
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
                let internal = pool.class_name(read_u2_at(code, pc + 1)?)?;
                instructions.push(Instruction::Type {
                    opcode,
                    target: TypeDescriptor::from_class_constant(internal)?,
                });
                pc += 3;
            }
            MULTIANEWARRAY => {
                let internal = pool.class_name(read_u2_at(code, pc + 1)?)?;
                instructions.push(Instruction::Type {
                    opcode,
                    target: TypeDescriptor::from_class_constant(internal)?,
                });
                pc += 4; // index + dimension count
            }
            LDC | LDC_W => {
                let index = if opcode == LDC {
                    read_u1_at(code, pc + 1)? as u16
                } else {
                    read_u2_at(code, pc + 1)?
                };
                match pool.get(index)? {
                    Constant::Class { name_index } => {
                        let internal = pool.utf8(*name_index)?;
                        instructions.push(Instruction::LoadType {
                            descriptor: TypeDescriptor::from_class_constant(internal)?,
                        });
                    }
                    _ => instructions.push(Instruction::Other { opcode }),
                }
                pc += if opcode == LDC { 2 } else { 3 };
            }
            TABLESWITCH => {
                let base = aligned_operand_base(pc);
                let low = read_i4_at(code, base + 4)?;
                let high = read_i4_at(code, base + 8)?;
                if high < low {
                    return Err(ClassParseError::MalformedCode("tableswitch bounds"));
                }
                let entries = (high as i64 - low as i64 + 1) as usize;
                instructions.push(Instruction::Other { opcode });
                pc = base + 12 + entries * 4;
            }
            LOOKUPSWITCH => {
                let base = aligned_operand_base(pc);
                let npairs = read_i4_at(code, base + 4)?;
                if npairs < 0 {
                    return Err(ClassParseError::MalformedCode("lookupswitch pair count"));
                }
                instructions.push(Instruction::Other { opcode });
                pc = base + 8 + npairs as usize * 8;
            }
            WIDE => {
                let widened = read_u1_at(code, pc + 1)?;
                instructions.push(Instruction::Other { opcode });
                match widened {
                    IINC => pc += 6,
                    0x15..=0x19 | 0x36..=0x3a | 0xa9 => pc += 4,
                    _ => {
                        warnings.push(ParseWarning::UnsupportedOpcode {
                            method: method_name.to_string(),
                            opcode: widened,
                        });
                        return Ok((instructions, warnings));
                    }
                }
            }
            // one operand byte: bipush, loads/stores with index, ret, newarray
            0x10 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => {
                instructions.push(Instruction::Other { opcode });
                pc += 2;
            }
            // two operand bytes: sipush, ldc2_w, iinc, branches, ifnull/ifnonnull
            0x11 | 0x14 | IINC | 0x99..=0xa8 | 0xc6 | 0xc7 => {
                instructions.push(Instruction::Other { opcode });
                pc += 3;
            }
            // four operand bytes: invokedynamic, goto_w, jsr_w
            INVOKEDYNAMIC | 0xc8 | 0xc9 => {
                instructions.push(Instruction::Other { opcode });
                pc += 5;
            }
            // no operands
            0x00..=0x0f | 0x1a..=0x35 | 0x3b..=0x83 | 0x85..=0x98 | 0xac..=0xb1 | 0xbe
            | 0xbf | 0xc2 | 0xc3 => {
                instructions.push(Instruction::Other { opcode });
                pc += 1;
            }
            unknown => {
                warnings.push(ParseWarning::UnsupportedOpcode {
                    method: method_name.to_string(),
                    opcode: unknown,
                });
                return Ok((instructions, warnings));
            }
        }

        if pc > code.len() {
            return Err(ClassParseError::MalformedCode("truncated instruction"));
        }
    }

    Ok((instructions, warnings))
}

/// Switch operands start at the next 4-byte boundary relative to the start
/// of the code array.
fn aligned_operand_base(pc: usize) -> usize {
    let after_opcode = pc + 1;
    after_opcode + (4 - after_opcode % 4) % 4
}

fn read_u1_at(code: &[u8], pos: usize) -> Result<u8, ClassParseError> {
    code.get(pos).copied().ok_or(ClassParseError::UnexpectedEof)
}

fn read_u2_at(code: &[u8], pos: usize) -> Result<u16, ClassParseError> {
    if pos + 2 > code.len() {
        return Err(ClassParseError::UnexpectedEof);
    }
    Ok(u16::from_be_bytes([code[pos], code[pos + 1]]))
}

fn read_i4_at(code: &[u8], pos: usize) -> Result<i32, ClassParseError> {
    if pos + 4 > code.len() {
        return Err(ClassParseError::UnexpectedEof);
    }
    Ok(i32::from_be_bytes([
        code[pos],
        code[pos + 1],
        code[pos + 2],
        code[pos + 3],
    ]))
}
