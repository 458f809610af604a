use crate::ast::{Directive, Item, ItemKind, Program};
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Section {
    Text,
    Data,
}

/// An item with its section, section-relative offset, and byte size as
/// fixed by the first pass.
#[derive(Debug)]
pub struct PlacedItem {
    pub item: Item,
    pub section: Section,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug)]
pub struct Layout {
    pub placed: Vec<PlacedItem>,
    pub labels: HashMap<String, u32>,
    pub text_size: u32,
    pub data_size: u32,
}

impl Layout {
    /// Absolute address of a placed item: text runs from 0, data from the
    /// end of text.
    pub fn address_of(&self, placed: &PlacedItem) -> u32 {
        match placed.section {
            Section::Text => placed.offset,
            Section::Data => self.text_size + placed.offset,
        }
    }
}

/// First assembler pass: walk the items tracking the current section and
/// per-section offsets, size everything, and assign label addresses.
///
/// Sizing needs no label resolution: directive sizes come from operand
/// counts (and, for `.align`, the current offset), instructions are
/// always 4 bytes.
pub fn lay_out(program: Program) -> Layout {
    let mut placed = Vec::new();
    let mut raw_labels: Vec<(String, Section, u32)> = Vec::new();
    let mut current_section = Section::Text;
    let mut text_pc = 0u32;
    let mut data_pc = 0u32;

    for item in program.items {
        let placement = match &item.kind {
            ItemKind::Label(name) => {
                let offset = match current_section {
                    Section::Text => text_pc,
                    Section::Data => data_pc,
                };
                raw_labels.push((name.clone(), current_section, offset));
                None
            }
            ItemKind::Directive(Directive::Text) => {
                current_section = Section::Text;
                Some((Section::Text, text_pc, 0))
            }
            ItemKind::Directive(Directive::Data) => {
                current_section = Section::Data;
                Some((Section::Data, data_pc, 0))
            }
            ItemKind::Directive(directive) => {
                let offset = match current_section {
                    Section::Text => text_pc,
                    Section::Data => data_pc,
                };
                Some((current_section, offset, directive_size(directive, offset)))
            }
            // Instructions land in the text section even when the current
            // section is .data; the data offset does not move.
            ItemKind::Instruction(_) => Some((Section::Text, text_pc, 4)),
        };

        if let Some((section, offset, size)) = placement {
            match section {
                Section::Text => text_pc += size,
                Section::Data => data_pc += size,
            }
            placed.push(PlacedItem {
                item,
                section,
                offset,
                size,
            });
        }
    }

    let mut labels = HashMap::new();
    for (name, section, offset) in raw_labels {
        let address = match section {
            Section::Text => offset,
            Section::Data => text_pc + offset,
        };
        // A duplicate definition overwrites the earlier one
        labels.insert(name, address);
    }

    Layout {
        placed,
        labels,
        text_size: text_pc,
        data_size: data_pc,
    }
}

fn directive_size(directive: &Directive, current_offset: u32) -> u32 {
    match directive {
        Directive::Text | Directive::Data => 0,
        Directive::Byte(values) => values.len() as u32,
        Directive::Half(values) => values.len() as u32 * 2,
        Directive::Word(values) => values.len() as u32 * 4,
        Directive::Ascii {
            text,
            nul_terminated,
        } => text.len() as u32 + *nul_terminated as u32,
        Directive::Space(count) => *count,
        Directive::Align(exponent) => alignment_padding(*exponent, current_offset),
        Directive::Float(values) => values.len() as u32 * 4,
        Directive::Double(values) => values.len() as u32 * 8,
    }
}

/// Zero bytes needed to bring `offset` up to a multiple of 2^exponent.
/// Exponents of 31 and above mean no alignment.
fn alignment_padding(exponent: u32, offset: u32) -> u32 {
    if exponent >= 31 {
        return 0;
    }

    let alignment = 1u32 << exponent;
    (alignment - offset % alignment) % alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn lay_out_str(source: &str) -> Layout {
        lay_out(parse_str(source).unwrap())
    }

    #[test]
    fn interleaved_sections_resolve_like_the_final_image() {
        let layout = lay_out_str(
            "            .text\n\
             main:\n\
                 add $t0, $t1, $t2\n\
                 loop: lw $a0, 4($sp)\n\
                 beq $t0, $t1, loop\n\
                 j end\n\
             .data\n\
                 arr: .word 1, 2, 3\n\
                 msg: .asciiz \"hi\"\n\
             .text\n\
             end: sll $t3, $t4, 2\n",
        );

        assert_eq!(layout.text_size, 20);
        assert_eq!(layout.data_size, 15);
        assert_eq!(layout.labels["main"], 0);
        assert_eq!(layout.labels["loop"], 4);
        assert_eq!(layout.labels["end"], 16);
        assert_eq!(layout.labels["arr"], 20);
        assert_eq!(layout.labels["msg"], 32);
    }

    #[test]
    fn align_pads_the_section_offset() {
        let layout = lay_out_str(".data\n.byte 1\n.align 2\nword: .word 5\n");
        assert_eq!(layout.labels["word"], 4);
        assert_eq!(layout.data_size, 8);

        // Already aligned: no padding
        let layout = lay_out_str(".data\n.word 1\n.align 2\nword: .word 5\n");
        assert_eq!(layout.labels["word"], 4);
    }

    #[test]
    fn align_of_31_or_more_is_ignored() {
        let layout = lay_out_str(".data\n.byte 1\n.align 31\nend: .byte 2\n");
        assert_eq!(layout.labels["end"], 1);
    }

    #[test]
    fn space_reserves_zero_filled_bytes() {
        let layout = lay_out_str(".data\nbuf: .space 6\nnext: .byte 1\n");
        assert_eq!(layout.labels["next"], 6);
    }

    #[test]
    fn instructions_in_data_are_demoted_to_text() {
        let layout = lay_out_str(
            ".data\n\
             value: .byte 1\n\
             addi $t0, $zero, 1\n\
             after: .byte 2\n",
        );

        // The instruction occupies text; the data offsets are untouched by it.
        assert_eq!(layout.text_size, 4);
        assert_eq!(layout.labels["value"], 4);
        assert_eq!(layout.labels["after"], 5);
    }

    #[test]
    fn later_duplicate_labels_win() {
        let layout = lay_out_str("dup: .text\nnoop_line: addi $t0, $zero, 1\ndup: addi $t0, $zero, 2\n");
        assert_eq!(layout.labels["dup"], 4);
    }

    #[test]
    fn empty_asciiz_still_emits_the_nul() {
        let layout = lay_out_str(".data\nempty: .asciiz \"\"\nnext: .byte 1\n");
        assert_eq!(layout.labels["next"], layout.labels["empty"] + 1);
    }
}
