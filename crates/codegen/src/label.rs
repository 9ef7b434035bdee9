use crate::code::Code;

use thin_vec::ThinVec;

/// Jump target with backpatching. While undefined, every emitted reference
/// records the buffer offset of its 2-byte displacement field; defining the
/// label patches them all. Offsets are indices into the code buffer, never
/// pointers, so buffer growth cannot invalidate them.
#[derive(Debug, Default)]
pub struct Label {
    fixups: ThinVec<usize>,
    adr: Option<usize>,
}

impl Label {
    pub fn new() -> Label {
        Label::default()
    }

    /// Emits the pc-relative displacement to this label, or a placeholder
    /// that gets patched once the label is defined. The displacement is
    /// taken from the opcode byte preceding the field.
    pub fn put(&mut self, code: &mut Code) {
        match self.adr {
            Some(adr) => {
                let from = code.pc() as i32 - 1;
                code.put2(adr as i32 - from);
            }
            None => {
                self.fixups.push(code.pc());
                code.put2(0);
            }
        }
    }

    /// Defines the label at the current pc and patches all pending sites.
    pub fn here(&mut self, code: &mut Code) {
        debug_assert!(self.adr.is_none(), "label defined twice");

        let adr = code.pc();

        for pos in self.fixups.drain(..) {
            code.put2_at(pos, adr as i32 - (pos as i32 - 1));
        }

        self.adr = Some(adr);
    }
}
