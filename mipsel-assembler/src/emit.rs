use crate::ast::{Directive, ItemKind, Value};
use crate::layout::{Layout, PlacedItem, Section};
use crate::lower::lower_instruction;
use mipsel_types::MipsError;
use std::collections::HashMap;
use std::iter;

/// Second assembler pass: lower and encode every placed item against the
/// resolved label table. All text items come before all data items, each
/// block in source order, matching the label addresses the layout pass
/// assigned.
pub fn emit(layout: &Layout) -> Result<Vec<u8>, MipsError> {
    let mut binary = Vec::new();

    let text_items = layout
        .placed
        .iter()
        .filter(|placed| placed.section == Section::Text);
    let data_items = layout
        .placed
        .iter()
        .filter(|placed| placed.section == Section::Data);

    for placed in text_items.chain(data_items) {
        emit_item(placed, layout, &mut binary)?;
    }

    Ok(binary)
}

fn emit_item(placed: &PlacedItem, layout: &Layout, binary: &mut Vec<u8>) -> Result<(), MipsError> {
    let item = &placed.item;

    match &item.kind {
        // Labels are consumed by the layout pass
        ItemKind::Label(_) => {}
        ItemKind::Instruction(source) => {
            let instruction = lower_instruction(
                source,
                layout.address_of(placed),
                &layout.labels,
                item.line_number,
                &item.line,
            )?;
            binary.extend_from_slice(&instruction.encode().to_le_bytes());
        }
        ItemKind::Directive(directive) => {
            emit_directive(directive, placed, &layout.labels, binary)?
        }
    }

    Ok(())
}

fn emit_directive(
    directive: &Directive,
    placed: &PlacedItem,
    labels: &HashMap<String, u32>,
    binary: &mut Vec<u8>,
) -> Result<(), MipsError> {
    match directive {
        // Section markers emit nothing
        Directive::Text | Directive::Data => {}
        Directive::Byte(values) => {
            for value in values {
                let resolved = resolve(value, labels, placed)?;
                warn_on_truncation(resolved, 8, ".byte");
                binary.push(resolved as u8);
            }
        }
        Directive::Half(values) => {
            for value in values {
                let resolved = resolve(value, labels, placed)?;
                warn_on_truncation(resolved, 16, ".half");
                binary.extend_from_slice(&(resolved as u16).to_le_bytes());
            }
        }
        Directive::Word(values) => {
            for value in values {
                let resolved = resolve(value, labels, placed)?;
                warn_on_truncation(resolved, 32, ".word");
                binary.extend_from_slice(&(resolved as u32).to_le_bytes());
            }
        }
        Directive::Ascii {
            text,
            nul_terminated,
        } => {
            binary.extend_from_slice(text.as_bytes());
            if *nul_terminated {
                binary.push(0);
            }
        }
        // The layout pass fixed the byte counts for both of these
        Directive::Space(_) | Directive::Align(_) => {
            binary.extend(iter::repeat(0).take(placed.size as usize));
        }
        Directive::Float(values) => {
            for value in values {
                binary.extend_from_slice(&value.to_le_bytes());
            }
        }
        Directive::Double(values) => {
            for value in values {
                binary.extend_from_slice(&value.to_le_bytes());
            }
        }
    }

    Ok(())
}

/// Values are explicitly truncated to the directive's width; anything
/// that fits neither the signed nor the unsigned range gets a warning.
fn warn_on_truncation(resolved: i64, bits: u32, directive: &str) {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << bits) - 1;

    if resolved < min || resolved > max {
        log::warn!(
            "{}: truncated 0x{:016x} to {} bits",
            directive,
            resolved,
            bits
        );
    }
}

fn resolve(
    value: &Value,
    labels: &HashMap<String, u32>,
    placed: &PlacedItem,
) -> Result<i64, MipsError> {
    value.resolve(labels).map_err(|name| {
        MipsError::parse(
            format!("unknown label: {}", name),
            placed.item.line_number,
            &placed.item.line,
        )
    })
}
