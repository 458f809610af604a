use crate::Processor;
use mipsel_types::instruction::{sign_extend_16, sign_extend_8, zero_extend_16, zero_extend_8, ITypeOp};
use mipsel_types::MipsError;

impl Processor {
    pub(crate) fn execute_i_type(
        &mut self,
        op: ITypeOp,
        rs: u8,
        rt: u8,
        immediate: u16,
    ) -> Result<(), MipsError> {
        match op {
            ITypeOp::Beq => self.op_beq(rs, rt, immediate),
            ITypeOp::Bne => self.op_bne(rs, rt, immediate),
            ITypeOp::Blez => self.op_blez(rs, immediate),
            ITypeOp::Bgtz => self.op_bgtz(rs, immediate),
            ITypeOp::Addi | ITypeOp::Addiu => self.op_addi(rs, rt, immediate),
            ITypeOp::Slti => self.op_slti(rs, rt, immediate),
            ITypeOp::Sltiu => self.op_sltiu(rs, rt, immediate),
            ITypeOp::Andi => self.op_andi(rs, rt, immediate),
            ITypeOp::Ori => self.op_ori(rs, rt, immediate),
            ITypeOp::Xori => self.op_xori(rs, rt, immediate),
            ITypeOp::Llo => self.op_llo(rt, immediate),
            ITypeOp::Lhi => self.op_lhi(rt, immediate),
            ITypeOp::Trap => return self.op_trap(immediate),
            ITypeOp::Lb => return self.op_lb(rs, rt, immediate),
            ITypeOp::Lh => return self.op_lh(rs, rt, immediate),
            ITypeOp::Lw => return self.op_lw(rs, rt, immediate),
            ITypeOp::Lbu => return self.op_lbu(rs, rt, immediate),
            ITypeOp::Lhu => return self.op_lhu(rs, rt, immediate),
            ITypeOp::Sb => return self.op_sb(rs, rt, immediate),
            ITypeOp::Sh => return self.op_sh(rs, rt, immediate),
            ITypeOp::Sw => return self.op_sw(rs, rt, immediate),
        }

        Ok(())
    }

    /// Taken-branch PC update: the sign-extended offset is counted in
    /// words from the branch instruction. The untaken path leaves the PC
    /// alone so the run loop's fall-through advance fires.
    fn branch(&mut self, immediate: u16) {
        let offset = sign_extend_16(immediate).wrapping_shl(2);
        self.program_counter = self.program_counter.wrapping_add(offset);
    }

    /// Branch if equal
    fn op_beq(&mut self, rs: u8, rt: u8, immediate: u16) {
        if self.registers.get(rs) == self.registers.get(rt) {
            self.branch(immediate);
        }
    }

    /// Branch if not equal
    fn op_bne(&mut self, rs: u8, rt: u8, immediate: u16) {
        if self.registers.get(rs) != self.registers.get(rt) {
            self.branch(immediate);
        }
    }

    /// Branch if rs <= 0, signed
    fn op_blez(&mut self, rs: u8, immediate: u16) {
        if self.registers.get(rs) as i32 <= 0 {
            self.branch(immediate);
        }
    }

    /// Branch if rs > 0, signed
    fn op_bgtz(&mut self, rs: u8, immediate: u16) {
        if self.registers.get(rs) as i32 > 0 {
            self.branch(immediate);
        }
    }

    /// Add immediate; the immediate is sign-extended and overflow wraps
    fn op_addi(&mut self, rs: u8, rt: u8, immediate: u16) {
        let value = self
            .registers
            .get(rs)
            .wrapping_add(sign_extend_16(immediate));
        self.registers.set(rt, value);
    }

    /// Set if less than immediate (signed)
    fn op_slti(&mut self, rs: u8, rt: u8, immediate: u16) {
        let result = (self.registers.get(rs) as i32) < (sign_extend_16(immediate) as i32);
        self.registers.set(rt, result as u32);
    }

    /// Set if less than immediate (unsigned compare of the sign-extended
    /// immediate)
    fn op_sltiu(&mut self, rs: u8, rt: u8, immediate: u16) {
        let result = self.registers.get(rs) < sign_extend_16(immediate);
        self.registers.set(rt, result as u32);
    }

    /// And immediate (zero-extended)
    fn op_andi(&mut self, rs: u8, rt: u8, immediate: u16) {
        let value = self.registers.get(rs) & zero_extend_16(immediate);
        self.registers.set(rt, value);
    }

    /// Or immediate (zero-extended)
    fn op_ori(&mut self, rs: u8, rt: u8, immediate: u16) {
        let value = self.registers.get(rs) | zero_extend_16(immediate);
        self.registers.set(rt, value);
    }

    /// Xor immediate (zero-extended)
    fn op_xori(&mut self, rs: u8, rt: u8, immediate: u16) {
        let value = self.registers.get(rs) ^ zero_extend_16(immediate);
        self.registers.set(rt, value);
    }

    /// Load the immediate into the low half of rt, keeping the high half.
    /// rt is both source and destination.
    fn op_llo(&mut self, rt: u8, immediate: u16) {
        let value = (self.registers.get(rt) & 0xFFFF_0000) | immediate as u32;
        self.registers.set(rt, value);
    }

    /// Load the immediate into the high half of rt, keeping the low half
    fn op_lhi(&mut self, rt: u8, immediate: u16) {
        let value = (self.registers.get(rt) & 0x0000_FFFF) | (immediate as u32) << 16;
        self.registers.set(rt, value);
    }

    /// Effective address of a load or store
    fn effective_address(&self, rs: u8, immediate: u16) -> u32 {
        self.registers
            .get(rs)
            .wrapping_add(sign_extend_16(immediate))
    }

    /// Load byte, sign-extended
    fn op_lb(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        let value = sign_extend_8(self.memory.read_byte(address)?);
        self.registers.set(rt, value);
        Ok(())
    }

    /// Load halfword, sign-extended
    fn op_lh(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        let value = sign_extend_16(self.memory.read_half(address)?);
        self.registers.set(rt, value);
        Ok(())
    }

    /// Load word
    fn op_lw(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        let value = self.memory.read_word(address)?;
        self.registers.set(rt, value);
        Ok(())
    }

    /// Load byte, zero-extended
    fn op_lbu(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        let value = zero_extend_8(self.memory.read_byte(address)?);
        self.registers.set(rt, value);
        Ok(())
    }

    /// Load halfword, zero-extended
    fn op_lhu(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        let value = zero_extend_16(self.memory.read_half(address)?);
        self.registers.set(rt, value);
        Ok(())
    }

    /// Store the low byte of rt
    fn op_sb(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        self.memory.write_byte(address, self.registers.get(rt) as u8)
    }

    /// Store the low halfword of rt
    fn op_sh(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        self.memory
            .write_half(address, self.registers.get(rt) as u16)
    }

    /// Store rt
    fn op_sw(&mut self, rs: u8, rt: u8, immediate: u16) -> Result<(), MipsError> {
        let address = self.effective_address(rs, immediate);
        self.memory.write_word(address, self.registers.get(rt))
    }
}
