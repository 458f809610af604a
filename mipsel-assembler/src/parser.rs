use crate::ast::{Directive, Item, ItemKind, Program, SourceInstruction, Value};
use crate::string_unescape::unescape_str;
use mipsel_types::MipsError;
use std::io::BufRead;

/// Parse assembly source into an ordered item list. This is the purely
/// syntactic pass; label resolution and operand shaping happen later.
pub fn parse_program<R: BufRead>(input: R) -> Result<Program, MipsError> {
    let mut items = Vec::new();

    for (index, line) in input.lines().enumerate() {
        parse_line(&line?, index + 1, &mut items)?;
    }

    Ok(Program { items })
}

pub fn parse_str(source: &str) -> Result<Program, MipsError> {
    parse_program(source.as_bytes())
}

fn parse_line(raw: &str, line_number: usize, items: &mut Vec<Item>) -> Result<(), MipsError> {
    let text = strip_comment(raw).trim();
    let mut rest = text;

    // Peel cascaded leading labels; each binds to the next emitted offset.
    while let Some((label, tail)) = split_label(rest) {
        items.push(Item {
            kind: ItemKind::Label(label.to_string()),
            line_number,
            line: text.to_string(),
        });
        rest = tail.trim();
    }

    if rest.is_empty() {
        return Ok(());
    }

    let kind = if rest.starts_with('.') {
        ItemKind::Directive(parse_directive(rest, line_number)?)
    } else {
        ItemKind::Instruction(parse_instruction_line(rest))
    };

    items.push(Item {
        kind,
        line_number,
        line: text.to_string(),
    });

    Ok(())
}

/// Cut the line at a `#` that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == '#' {
            return &line[..index];
        }
    }

    line
}

/// Split `name: rest` when the text before the first colon is an
/// identifier.
fn split_label(text: &str) -> Option<(&str, &str)> {
    let colon = text.find(':')?;
    let name = text[..colon].trim();

    if is_identifier(name) {
        Some((name, &text[colon + 1..]))
    } else {
        None
    }
}

pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_instruction_line(text: &str) -> SourceInstruction {
    let (mnemonic, operand_text) = match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim()),
        None => (text, ""),
    };

    let operands = if operand_text.is_empty() {
        Vec::new()
    } else {
        operand_text
            .split(',')
            .map(|operand| operand.trim().to_string())
            .collect()
    };

    SourceInstruction {
        mnemonic: mnemonic.to_ascii_lowercase(),
        operands,
    }
}

fn parse_directive(text: &str, line_number: usize) -> Result<Directive, MipsError> {
    let (name, rest) = match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim()),
        None => (text, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        ".text" => Ok(Directive::Text),
        ".data" => Ok(Directive::Data),
        ".byte" => Ok(Directive::Byte(parse_values(rest, line_number, text)?)),
        ".half" => Ok(Directive::Half(parse_values(rest, line_number, text)?)),
        ".word" => Ok(Directive::Word(parse_values(rest, line_number, text)?)),
        ".ascii" => Ok(Directive::Ascii {
            text: parse_string_literal(rest, line_number, text)?,
            nul_terminated: false,
        }),
        ".asciiz" => Ok(Directive::Ascii {
            text: parse_string_literal(rest, line_number, text)?,
            nul_terminated: true,
        }),
        ".space" => Ok(Directive::Space(parse_count(rest, line_number, text)?)),
        ".align" => Ok(Directive::Align(parse_count(rest, line_number, text)?)),
        ".float" => Ok(Directive::Float(parse_float_list(rest, line_number, text)?)),
        ".double" => Ok(Directive::Double(parse_float_list(rest, line_number, text)?)),
        _ => Err(MipsError::parse(
            format!("unknown directive: {}", name),
            line_number,
            text,
        )),
    }
}

fn parse_values(rest: &str, line_number: usize, line: &str) -> Result<Vec<Value>, MipsError> {
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    rest.split(',')
        .map(|field| parse_value(field.trim(), line_number, line))
        .collect()
}

/// Parse a directive or immediate operand: a decimal or hex number, a
/// label, or a label with a `+k`/`-k` numeric suffix.
pub(crate) fn parse_value(text: &str, line_number: usize, line: &str) -> Result<Value, MipsError> {
    if text.is_empty() {
        return Err(MipsError::parse("empty value", line_number, line));
    }

    if let Some(number) = parse_number(text) {
        return Ok(Value::Number(number));
    }

    if is_identifier(text) {
        return Ok(Value::Symbol {
            name: text.to_string(),
            addend: 0,
        });
    }

    // label+k / label-k
    if let Some(index) = text[1..].find(|c| c == '+' || c == '-').map(|i| i + 1) {
        let name = text[..index].trim_end();
        if is_identifier(name) {
            if let Some(addend) = parse_number(text[index..].trim_start()) {
                return Ok(Value::Symbol {
                    name: name.to_string(),
                    addend,
                });
            }
        }
    }

    Err(MipsError::parse(
        format!("unable to parse value: {}", text),
        line_number,
        line,
    ))
}

/// Decimal or `0x` hex, optionally signed.
pub(crate) fn parse_number(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }

    let (sign, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };

    let value = if let Some(hex) = magnitude
        .strip_prefix("0x")
        .or_else(|| magnitude.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        magnitude.parse::<i64>().ok()?
    };

    Some(sign * value)
}

/// A plain non-negative numeric literal, as taken by `.space`/`.align`.
fn parse_count(rest: &str, line_number: usize, line: &str) -> Result<u32, MipsError> {
    if rest.is_empty() {
        return Ok(0);
    }

    parse_number(rest)
        .and_then(|value| {
            if (0..=u32::MAX as i64).contains(&value) {
                Some(value as u32)
            } else {
                None
            }
        })
        .ok_or_else(|| {
            MipsError::parse(
                format!("invalid count: {}", rest),
                line_number,
                line,
            )
        })
}

fn parse_float_list<T: std::str::FromStr>(
    rest: &str,
    line_number: usize,
    line: &str,
) -> Result<Vec<T>, MipsError> {
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    rest.split(',')
        .map(|field| {
            field.trim().parse().map_err(|_| {
                MipsError::parse(
                    format!("invalid floating-point value: {}", field.trim()),
                    line_number,
                    line,
                )
            })
        })
        .collect()
}

fn parse_string_literal(rest: &str, line_number: usize, line: &str) -> Result<String, MipsError> {
    if rest.is_empty() {
        return Ok(String::new());
    }

    let invalid = || {
        MipsError::parse(
            format!("invalid string literal: {}", rest),
            line_number,
            line,
        )
    };

    let inner = rest
        .strip_prefix('"')
        .and_then(|tail| tail.strip_suffix('"'))
        .ok_or_else(invalid)?;

    unescape_str(inner).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<ItemKind> {
        parse_str(source)
            .unwrap()
            .items
            .into_iter()
            .map(|item| item.kind)
            .collect()
    }

    #[test]
    fn comments_and_blank_lines_vanish() {
        let program = parse_str("# a comment\n\n   \n  add $t0, $t1, $t2  # trailing\n").unwrap();
        assert_eq!(program.items.len(), 1);
        assert_eq!(
            program.items[0].kind,
            ItemKind::Instruction(SourceInstruction {
                mnemonic: "add".to_string(),
                operands: vec!["$t0".to_string(), "$t1".to_string(), "$t2".to_string()],
            })
        );
        assert_eq!(program.items[0].line_number, 4);
    }

    #[test]
    fn hash_inside_a_string_literal_is_not_a_comment() {
        match &kinds(".asciiz \"a#b\" # real comment")[0] {
            ItemKind::Directive(Directive::Ascii { text, .. }) => assert_eq!(text, "a#b"),
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn cascaded_labels_peel_in_order() {
        let items = kinds("L1: L2: addi $t0, $zero, 1");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], ItemKind::Label("L1".to_string()));
        assert_eq!(items[1], ItemKind::Label("L2".to_string()));
        assert!(matches!(items[2], ItemKind::Instruction(_)));
    }

    #[test]
    fn a_label_alone_on_a_line_is_kept() {
        let items = kinds("main:\n");
        assert_eq!(items, vec![ItemKind::Label("main".to_string())]);
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        match &kinds("ADD $t0, $t1, $t2")[0] {
            ItemKind::Instruction(instruction) => assert_eq!(instruction.mnemonic, "add"),
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn directive_payloads_parse() {
        let items = kinds(".byte 1, 0x10, -1\n.WORD table+4, 2\n.space 8\n.align 2");
        assert_eq!(
            items[0],
            ItemKind::Directive(Directive::Byte(vec![
                Value::Number(1),
                Value::Number(0x10),
                Value::Number(-1),
            ]))
        );
        assert_eq!(
            items[1],
            ItemKind::Directive(Directive::Word(vec![
                Value::Symbol {
                    name: "table".to_string(),
                    addend: 4,
                },
                Value::Number(2),
            ]))
        );
        assert_eq!(items[2], ItemKind::Directive(Directive::Space(8)));
        assert_eq!(items[3], ItemKind::Directive(Directive::Align(2)));
    }

    #[test]
    fn float_directives_parse() {
        let items = kinds(".float 1.5, -0.25\n.double 2.0");
        assert_eq!(
            items[0],
            ItemKind::Directive(Directive::Float(vec![1.5, -0.25]))
        );
        assert_eq!(items[1], ItemKind::Directive(Directive::Double(vec![2.0])));
    }

    #[test]
    fn string_escapes_are_processed() {
        match &kinds(r#".asciiz "hi\n\t\"\\\0x""#)[0] {
            ItemKind::Directive(Directive::Ascii {
                text,
                nul_terminated,
            }) => {
                assert_eq!(text, "hi\n\t\"\\\0x");
                assert!(nul_terminated);
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn unterminated_strings_are_rejected() {
        assert!(parse_str(".ascii \"oops").is_err());
        assert!(parse_str(".ascii oops").is_err());
    }

    #[test]
    fn unknown_directives_are_rejected() {
        let error = parse_str(".globl main").unwrap_err();
        assert!(error.to_string().contains("unknown directive"));
    }

    #[test]
    fn label_suffix_values() {
        assert_eq!(
            parse_value("buffer-8", 1, "").unwrap(),
            Value::Symbol {
                name: "buffer".to_string(),
                addend: -8,
            }
        );
        assert!(parse_value("8buffer", 1, "").is_err());
    }

    #[test]
    fn numbers_parse_in_both_bases() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("-42"), Some(-42));
        assert_eq!(parse_number("0x2A"), Some(42));
        assert_eq!(parse_number("-0x2a"), Some(-42));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("4x2"), None);
    }
}
