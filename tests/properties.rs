use chip8_vm::emulator::emulator::MAX_PROGRAM_SIZE;
use chip8_vm::emulator::output::Framebuffer;
use chip8_vm::emulator::{Emulator, Error};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Load `program` and run it for `cycles` cycles.
fn run(program: &[u8], cycles: usize) -> Emulator {
    let mut emulator = Emulator::with_seed(0);
    emulator.load(program).unwrap();
    for _ in 0..cycles {
        emulator.cycle().unwrap();
    }
    emulator
}

/// Set V0 = a and V1 = b, then run `op` (an 8XY_ instruction on V0 and V1).
fn arithmetic(a: u8, b: u8, op: [u8; 2]) -> Emulator {
    run(&[0x60, a, 0x61, b, op[0], op[1]], 3)
}

type Snapshot = (Vec<u8>, [u8; 16], u16, u16, Vec<u16>, u8, u8, Framebuffer);

fn snapshot(emulator: &Emulator) -> Snapshot {
    (
        emulator.memory().to_vec(),
        *emulator.registers(),
        emulator.index(),
        emulator.program_counter(),
        emulator.stack().to_vec(),
        emulator.delay_timer(),
        emulator.sound_timer(),
        emulator.framebuffer().clone(),
    )
}

#[test]
fn load_then_add() {
    let emulator = run(&[0x6A, 0x05, 0x7A, 0x03], 2);
    assert_eq!(emulator.registers()[0xA], 8);
    assert_eq!(emulator.program_counter(), 0x204);
}

#[test]
fn clear_then_draw_single_byte_sprite() {
    let emulator = run(
        &[
            0x00, 0xE0, // CLS
            0xA2, 0x06, // LD I, 0x206
            0xD0, 0x11, // DRW V0, V1, 1
            0xF0, 0x00, // sprite
        ],
        3,
    );

    let frame = emulator.framebuffer();
    assert!((0..4).all(|x| frame.get(x, 0)));
    assert!((4..8).all(|x| !frame.get(x, 0)));
    assert_eq!(frame.cells().iter().filter(|&&set| set).count(), 4);
    assert_eq!(emulator.registers()[0xF], 0);
}

#[test]
fn largest_program_loads() {
    let mut emulator = Emulator::new();
    let program = vec![0xAB; MAX_PROGRAM_SIZE];
    assert_eq!(emulator.load(&program), Ok(()));
    assert_eq!(emulator.memory()[0xFFF], 0xAB);
}

#[test]
fn too_large_program_is_rejected_without_writing() {
    let mut emulator = Emulator::new();
    let before = emulator.memory().to_vec();
    let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];
    assert_eq!(
        emulator.load(&program),
        Err(Error::LoadTooLarge {
            size: 3585,
            max: 3584
        })
    );
    assert_eq!(emulator.memory().to_vec(), before);
}

#[test]
fn clear_screen_is_idempotent() {
    // Draw the "8" glyph, then clear once or twice
    let draw = [0x60, 0x08, 0xF0, 0x29, 0xD1, 0x25];
    let once: Vec<u8> = draw.iter().chain(&[0x00, 0xE0]).copied().collect();
    let twice: Vec<u8> = once.iter().chain(&[0x00, 0xE0]).copied().collect();

    let once = run(&once, 4);
    let twice = run(&twice, 5);
    assert_eq!(once.framebuffer(), twice.framebuffer());
    assert_eq!(once.framebuffer(), &Framebuffer::new());
}

proptest! {
    #[test]
    fn add_flag_comes_from_operands(a in any::<u8>(), b in any::<u8>()) {
        let emulator = arithmetic(a, b, [0x80, 0x14]);
        prop_assert_eq!(emulator.registers()[0], a.wrapping_add(b));
        prop_assert_eq!(emulator.registers()[0xF], (a as u16 + b as u16 > 0xFF) as u8);
    }

    #[test]
    fn sub_flag_comes_from_operands(a in any::<u8>(), b in any::<u8>()) {
        let emulator = arithmetic(a, b, [0x80, 0x15]);
        prop_assert_eq!(emulator.registers()[0], a.wrapping_sub(b));
        prop_assert_eq!(emulator.registers()[0xF], (a >= b) as u8);
    }

    #[test]
    fn reverse_sub_flag_comes_from_operands(a in any::<u8>(), b in any::<u8>()) {
        let emulator = arithmetic(a, b, [0x80, 0x17]);
        prop_assert_eq!(emulator.registers()[0], b.wrapping_sub(a));
        prop_assert_eq!(emulator.registers()[0xF], (b >= a) as u8);
    }

    #[test]
    fn shift_flags_come_from_operand(a in any::<u8>()) {
        let right = arithmetic(a, 0, [0x80, 0x06]);
        prop_assert_eq!(right.registers()[0], a >> 1);
        prop_assert_eq!(right.registers()[0xF], a & 1);

        let left = arithmetic(a, 0, [0x80, 0x0E]);
        prop_assert_eq!(left.registers()[0], a << 1);
        prop_assert_eq!(left.registers()[0xF], a >> 7);
    }

    #[test]
    fn flag_is_written_last_when_vf_is_the_operand(a in any::<u8>(), b in any::<u8>()) {
        // VF = a, V1 = b, VF += V1
        let emulator = run(&[0x6F, a, 0x61, b, 0x8F, 0x14], 3);
        prop_assert_eq!(emulator.registers()[0xF], (a as u16 + b as u16 > 0xFF) as u8);
    }

    #[test]
    fn add_const_leaves_flag_alone(a in any::<u8>(), n in any::<u8>(), flag in any::<u8>()) {
        let emulator = run(&[0x60, a, 0x6F, flag, 0x70, n], 3);
        prop_assert_eq!(emulator.registers()[0], a.wrapping_add(n));
        prop_assert_eq!(emulator.registers()[0xF], flag);
    }

    #[test]
    fn dump_then_load_restores_registers(
        values in proptest::collection::vec(any::<u8>(), 16),
        x in 0usize..16,
    ) {
        let mut program = Vec::new();
        for (reg, &value) in values.iter().enumerate() {
            program.extend_from_slice(&[0x60 | reg as u8, value]);
        }
        // LD I, 0x400; LD [I], Vx
        program.extend_from_slice(&[0xA4, 0x00, 0xF0 | x as u8, 0x55]);
        for reg in 0..=x {
            program.extend_from_slice(&[0x60 | reg as u8, 0x00]);
        }
        // LD Vx, [I]
        program.extend_from_slice(&[0xF0 | x as u8, 0x65]);

        let emulator = run(&program, 16 + 2 + (x + 1) + 1);
        prop_assert_eq!(&emulator.registers()[..=x], &values[..=x]);
        prop_assert_eq!(&emulator.memory()[0x400..=0x400 + x], &values[..=x]);
    }

    #[test]
    fn const_skips_advance_by_four_when_taken(v in any::<u8>(), n in any::<u8>()) {
        let equal = run(&[0x60, v, 0x30, n], 2);
        prop_assert_eq!(equal.program_counter(), if v == n { 0x206 } else { 0x204 });

        let not_equal = run(&[0x60, v, 0x40, n], 2);
        prop_assert_eq!(not_equal.program_counter(), if v != n { 0x206 } else { 0x204 });
    }

    #[test]
    fn register_skips_advance_by_four_when_taken(a in 0u8..4, b in 0u8..4) {
        let equal = run(&[0x60, a, 0x61, b, 0x50, 0x10], 3);
        prop_assert_eq!(equal.program_counter(), if a == b { 0x208 } else { 0x206 });

        let not_equal = run(&[0x60, a, 0x61, b, 0x90, 0x10], 3);
        prop_assert_eq!(not_equal.program_counter(), if a != b { 0x208 } else { 0x206 });
    }

    #[test]
    fn key_skips_advance_by_four_when_taken(key in 0u8..16, pressed in any::<bool>()) {
        for &(op, taken) in &[(0x9E, pressed), (0xA1, !pressed)] {
            let mut emulator = Emulator::new();
            emulator.load(&[0x60, key, 0xE0, op]).unwrap();
            emulator.set_key(key, pressed).unwrap();
            emulator.cycle().unwrap();
            emulator.cycle().unwrap();
            prop_assert_eq!(emulator.program_counter(), if taken { 0x206 } else { 0x204 });
        }
    }

    #[test]
    fn nested_calls_return_to_first_call_site(depth in 1usize..=16) {
        // 0x200 calls 0x300. The subroutine at 0x300 + 4k calls the next one
        // and then returns, the last one only returns.
        let mut program = vec![0u8; 0x200];
        program[0..2].copy_from_slice(&[0x23, 0x00]);
        for k in 0..depth {
            let offset = 0x100 + 4 * k;
            if k + 1 < depth {
                let next = 0x300 + 4 * (k as u16 + 1);
                program[offset..offset + 4]
                    .copy_from_slice(&[0x20 | (next >> 8) as u8, next as u8, 0x00, 0xEE]);
            } else {
                program[offset..offset + 2].copy_from_slice(&[0x00, 0xEE]);
            }
        }

        let mut emulator = run(&program, depth);
        prop_assert_eq!(emulator.stack().len(), depth);
        for _ in 0..depth {
            emulator.cycle().unwrap();
        }
        prop_assert_eq!(emulator.program_counter(), 0x202);
        prop_assert_eq!(emulator.stack_pointer(), 0);
    }

    #[test]
    fn drawing_twice_collides_and_restores(x in any::<u8>(), y in any::<u8>(), sprite in 1u8..) {
        let program = [
            0x60, x,    // LD V0, x
            0x61, y,    // LD V1, y
            0xA2, 0x0A, // LD I, 0x20A
            0xD0, 0x11, // DRW V0, V1, 1
            0xD0, 0x11, // DRW V0, V1, 1
            sprite, 0x00,
        ];
        let mut emulator = run(&program, 4);
        prop_assert_eq!(emulator.registers()[0xF], 0);
        prop_assert_ne!(emulator.framebuffer(), &Framebuffer::new());

        emulator.cycle().unwrap();
        prop_assert_eq!(emulator.registers()[0xF], 1);
        prop_assert_eq!(emulator.framebuffer(), &Framebuffer::new());
    }

    #[test]
    fn failed_cycles_change_nothing(
        values in proptest::collection::vec(any::<u8>(), 15),
        index in 0u16..0x1000,
        word in any::<u16>(),
    ) {
        let mut program = Vec::new();
        for (reg, &value) in values.iter().enumerate() {
            program.extend_from_slice(&[0x60 | reg as u8, value]);
        }
        program.extend_from_slice(&[0xA0 | (index >> 8) as u8, index as u8]);
        program.extend_from_slice(&word.to_be_bytes());

        let mut emulator = run(&program, 16);
        let before = snapshot(&emulator);
        if emulator.cycle().is_err() {
            prop_assert_eq!(snapshot(&emulator), before);
        }
    }
}
