use crate::Processor;
use mipsel_types::instruction::RTypeOp;

impl Processor {
    pub(crate) fn execute_r_type(&mut self, rs: u8, rt: u8, rd: u8, shamt: u8, funct: RTypeOp) {
        match funct {
            RTypeOp::Sll => self.op_sll(rt, rd, shamt),
            RTypeOp::Srl => self.op_srl(rt, rd, shamt),
            RTypeOp::Sra => self.op_sra(rt, rd, shamt),
            RTypeOp::Sllv => self.op_sllv(rs, rt, rd),
            RTypeOp::Srlv => self.op_srlv(rs, rt, rd),
            RTypeOp::Srav => self.op_srav(rs, rt, rd),
            RTypeOp::Jr => self.op_jr(rs),
            RTypeOp::Jalr => self.op_jalr(rs, rd),
            RTypeOp::Mfhi => self.op_mfhi(rd),
            RTypeOp::Mthi => self.op_mthi(rs),
            RTypeOp::Mflo => self.op_mflo(rd),
            RTypeOp::Mtlo => self.op_mtlo(rs),
            RTypeOp::Mult => self.op_mult(rs, rt),
            RTypeOp::Multu => self.op_multu(rs, rt),
            RTypeOp::Div => self.op_div(rs, rt),
            RTypeOp::Divu => self.op_divu(rs, rt),
            // The unsigned variants differ from the signed ones only in
            // intent; both wrap.
            RTypeOp::Add | RTypeOp::Addu => self.op_add(rs, rt, rd),
            RTypeOp::Sub | RTypeOp::Subu => self.op_sub(rs, rt, rd),
            RTypeOp::And => self.op_and(rs, rt, rd),
            RTypeOp::Or => self.op_or(rs, rt, rd),
            RTypeOp::Xor => self.op_xor(rs, rt, rd),
            RTypeOp::Nor => self.op_nor(rs, rt, rd),
            RTypeOp::Slt => self.op_slt(rs, rt, rd),
            RTypeOp::Sltu => self.op_sltu(rs, rt, rd),
        }
    }

    /// Shift left logical
    fn op_sll(&mut self, rt: u8, rd: u8, shamt: u8) {
        let value = self.registers.get(rt) << shamt;
        self.registers.set(rd, value);
    }

    /// Shift right logical
    fn op_srl(&mut self, rt: u8, rd: u8, shamt: u8) {
        let value = self.registers.get(rt) >> shamt;
        self.registers.set(rd, value);
    }

    /// Shift right arithmetic
    fn op_sra(&mut self, rt: u8, rd: u8, shamt: u8) {
        let value = (self.registers.get(rt) as i32) >> shamt;
        self.registers.set(rd, value as u32);
    }

    /// Shift left logical variable
    fn op_sllv(&mut self, rs: u8, rt: u8, rd: u8) {
        let shift_amount = self.registers.get(rs) & 0x1F;
        let value = self.registers.get(rt) << shift_amount;
        self.registers.set(rd, value);
    }

    /// Shift right logical variable
    fn op_srlv(&mut self, rs: u8, rt: u8, rd: u8) {
        let shift_amount = self.registers.get(rs) & 0x1F;
        let value = self.registers.get(rt) >> shift_amount;
        self.registers.set(rd, value);
    }

    /// Shift right arithmetic variable
    fn op_srav(&mut self, rs: u8, rt: u8, rd: u8) {
        let shift_amount = self.registers.get(rs) & 0x1F;
        let value = (self.registers.get(rt) as i32) >> shift_amount;
        self.registers.set(rd, value as u32);
    }

    /// Jump register
    fn op_jr(&mut self, rs: u8) {
        self.program_counter = self.registers.get(rs);
    }

    /// Jump and link register. rs is read before the link is written, so
    /// `jalr $t0, $t0` still jumps to the old value.
    fn op_jalr(&mut self, rs: u8, rd: u8) {
        let target = self.registers.get(rs);
        let return_address = self.program_counter.wrapping_add(4);
        self.registers.set(rd, return_address);
        self.program_counter = target;
    }

    /// Move from HI
    fn op_mfhi(&mut self, rd: u8) {
        self.registers.set(rd, self.registers.hi);
    }

    /// Move to HI
    fn op_mthi(&mut self, rs: u8) {
        self.registers.hi = self.registers.get(rs);
    }

    /// Move from LO
    fn op_mflo(&mut self, rd: u8) {
        self.registers.set(rd, self.registers.lo);
    }

    /// Move to LO
    fn op_mtlo(&mut self, rs: u8) {
        self.registers.lo = self.registers.get(rs);
    }

    /// Signed 32x32 -> 64 multiply into HI:LO
    fn op_mult(&mut self, rs: u8, rt: u8) {
        let a = self.registers.get(rs) as i32 as i64;
        let b = self.registers.get(rt) as i32 as i64;
        let product = a * b;

        self.registers.lo = product as u32;
        self.registers.hi = (product >> 32) as u32;
    }

    /// Unsigned 32x32 -> 64 multiply into HI:LO
    fn op_multu(&mut self, rs: u8, rt: u8) {
        let product = self.registers.get(rs) as u64 * self.registers.get(rt) as u64;

        self.registers.lo = product as u32;
        self.registers.hi = (product >> 32) as u32;
    }

    /// Signed divide: LO = quotient, HI = remainder. A zero divisor
    /// leaves HI and LO untouched.
    fn op_div(&mut self, rs: u8, rt: u8) {
        let divisor = self.registers.get(rt) as i32;
        if divisor == 0 {
            return;
        }
        let dividend = self.registers.get(rs) as i32;

        self.registers.lo = dividend.wrapping_div(divisor) as u32;
        self.registers.hi = dividend.wrapping_rem(divisor) as u32;
    }

    /// Unsigned divide, same zero-divisor rule as `div`.
    fn op_divu(&mut self, rs: u8, rt: u8) {
        let divisor = self.registers.get(rt);
        if divisor == 0 {
            return;
        }
        let dividend = self.registers.get(rs);

        self.registers.lo = dividend / divisor;
        self.registers.hi = dividend % divisor;
    }

    /// Add; overflow wraps
    fn op_add(&mut self, rs: u8, rt: u8, rd: u8) {
        let value = self.registers.get(rs).wrapping_add(self.registers.get(rt));
        self.registers.set(rd, value);
    }

    /// Subtract; overflow wraps
    fn op_sub(&mut self, rs: u8, rt: u8, rd: u8) {
        let value = self.registers.get(rs).wrapping_sub(self.registers.get(rt));
        self.registers.set(rd, value);
    }

    /// Bitwise and
    fn op_and(&mut self, rs: u8, rt: u8, rd: u8) {
        let value = self.registers.get(rs) & self.registers.get(rt);
        self.registers.set(rd, value);
    }

    /// Bitwise or
    fn op_or(&mut self, rs: u8, rt: u8, rd: u8) {
        let value = self.registers.get(rs) | self.registers.get(rt);
        self.registers.set(rd, value);
    }

    /// Bitwise exclusive or
    fn op_xor(&mut self, rs: u8, rt: u8, rd: u8) {
        let value = self.registers.get(rs) ^ self.registers.get(rt);
        self.registers.set(rd, value);
    }

    /// Bitwise nor
    fn op_nor(&mut self, rs: u8, rt: u8, rd: u8) {
        let value = !(self.registers.get(rs) | self.registers.get(rt));
        self.registers.set(rd, value);
    }

    /// Set if less than (signed)
    fn op_slt(&mut self, rs: u8, rt: u8, rd: u8) {
        let result = (self.registers.get(rs) as i32) < (self.registers.get(rt) as i32);
        self.registers.set(rd, result as u32);
    }

    /// Set if less than (unsigned)
    fn op_sltu(&mut self, rs: u8, rt: u8, rd: u8) {
        let result = self.registers.get(rs) < self.registers.get(rt);
        self.registers.set(rd, result as u32);
    }
}
