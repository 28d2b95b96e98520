pub mod errors;
pub mod vm;

pub use errors::{VmError, VmFault};
pub use vm::{ConsoleSink, KeyboardSource, NoKeyboard, NullConsole, StepOutcome, Vm};

#[cfg(test)]
mod tests {
    use super::*;

    fn run_halt(image: &[u8]) -> Vm {
        let mut vm = Vm::new(image);
        vm.run(&mut NullConsole, &mut NoKeyboard).unwrap();
        vm
    }

    #[test]
    fn s1_arith_scenario() {
        // LDI A,10; LDI B,5; SUB A,B; HALT
        let image = [0x01, 0, 10, 0x01, 1, 5, 0x0A, 0, 1, 0xFF];
        let vm = run_halt(&image);
        assert_eq!(vm.regs[0], 5);
        assert!(!vm.z);
        assert!(!vm.c);
    }

    #[test]
    fn s2_loop_scenario() {
        // LDI A,3; L: DEC A; JNZ L; HALT
        let image = [0x01, 0, 3, 0x0D, 0, 0x17, 3, 0, 0xFF];
        let vm = run_halt(&image);
        assert_eq!(vm.regs[0], 0);
        assert!(vm.z);
    }

    #[test]
    fn s3_stack_round_trip() {
        // LDI A,7; PUSH A; LDI A,0; POP A; HALT
        let image = [0x01, 0, 7, 0x1A, 0, 0x01, 0, 0, 0x1B, 0, 0xFF];
        let vm = run_halt(&image);
        assert_eq!(vm.regs[0], 7);
        assert_eq!(vm.sp, isa::STACK_END);
    }

    #[test]
    fn s6_memory_to_text_buffer() {
        // LDI A,65; STM 0xFFF0,A; HALT
        let addr = isa::TEXT_BUFFER_START;
        let lo = (addr & 0xFF) as u8;
        let hi = (addr >> 8) as u8;
        let image = [0x01, 0, 65, 0x05, lo, hi, 0, 0xFF];
        let vm = run_halt(&image);
        assert_eq!(vm.memory[addr as usize], 65);
    }

    #[test]
    fn add_flag_law_holds_for_every_pair() {
        for a in 0u16..256 {
            for b in 0u16..256 {
                let image = [0x01, 0, a as u8, 0x01, 1, b as u8, 0x08, 0, 1, 0xFF];
                let vm = run_halt(&image);
                let sum = a + b;
                assert_eq!(vm.c, sum >= 256, "a={a} b={b}");
                assert_eq!(vm.z, sum % 256 == 0, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn sub_flag_law_holds_for_every_pair() {
        for a in 0u16..256 {
            for b in 0u16..256 {
                let image = [0x01, 0, a as u8, 0x01, 1, b as u8, 0x0A, 0, 1, 0xFF];
                let vm = run_halt(&image);
                assert_eq!(vm.c, a < b, "a={a} b={b}");
                assert_eq!(vm.z, a == b, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn push16_pop16_round_trip_preserves_sp_and_order() {
        // LDI A,0x12; LDI B,0x34; PUSH16 A,B; POP16 C,D; HALT
        let image = [0x01, 0, 0x12, 0x01, 1, 0x34, 0x1C, 0, 1, 0x1D, 2, 3, 0xFF];
        let vm = run_halt(&image);
        assert_eq!(vm.sp, isa::STACK_END);
        assert_eq!(vm.regs[2], 0x12); // HI preserved
        assert_eq!(vm.regs[3], 0x34); // LO preserved
    }

    #[test]
    fn call_then_immediate_ret_restores_pc_and_sp() {
        // 0: CALL 5; 3: HALT; 5: RET
        let image = [0x1E, 5, 0, 0xFF, 0, 0x1F];
        let mut vm = Vm::new(&image);
        let sp_before = vm.sp;
        vm.step(&mut NullConsole, &mut NoKeyboard).unwrap(); // CALL
        assert_eq!(vm.pc, 5);
        vm.step(&mut NullConsole, &mut NoKeyboard).unwrap(); // RET
        assert_eq!(vm.pc, 3, "RET should land on the byte after CALL");
        assert_eq!(vm.sp, sp_before);
    }

    #[test]
    fn unknown_opcode_is_non_fatal_and_advances_pc_by_one() {
        let image = [0x00, 0xFF]; // 0x00 is unassigned, then HALT
        let mut vm = Vm::new(&image);
        let outcome = vm.step(&mut NullConsole, &mut NoKeyboard).unwrap();
        assert_eq!(outcome, StepOutcome::Continued);
        assert_eq!(vm.pc, 1);
    }

    #[test]
    fn invalid_port_is_fatal() {
        // IN A, 9 -- port 9 is out of range
        let image = [0x20, 0, 9];
        let mut vm = Vm::new(&image);
        let err = vm.run(&mut NullConsole, &mut NoKeyboard).unwrap_err();
        assert_eq!(err.source, VmError::InvalidPort(9));
        assert_eq!(err.pc, 0);
    }

    #[test]
    fn stack_underflow_is_fatal() {
        let image = [0x1B, 0]; // POP A with nothing pushed
        let mut vm = Vm::new(&image);
        let err = vm.run(&mut NullConsole, &mut NoKeyboard).unwrap_err();
        assert_eq!(err.source, VmError::StackUnderflow { stack_end: isa::STACK_END });
    }
}
