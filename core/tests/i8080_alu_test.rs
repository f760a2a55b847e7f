mod common;
use common::Fixture;

#[test]
fn add_sets_carry_and_aux_carry() {
    let mut f = Fixture::new();
    f.cpu.a = 0xFF;
    f.cpu.b = 0x01;
    f.load(0, &[0x80]); // ADD B

    let ticks = f.step();
    assert_eq!(ticks, 4);
    assert_eq!(f.cpu.a, 0x00);
    assert_eq!(f.cpu.status & 0x01, 0x01, "CY set");
    assert_eq!(f.cpu.status & 0x10, 0x10, "AC set");
    assert_eq!(f.cpu.status & 0x40, 0x40, "Z set");
}

#[test]
fn sub_sets_borrow() {
    let mut f = Fixture::new();
    f.cpu.a = 0x00;
    f.cpu.b = 0x01;
    f.load(0, &[0x90]); // SUB B

    f.step();
    assert_eq!(f.cpu.a, 0xFF);
    assert_eq!(f.cpu.status & 0x01, 0x01, "CY set on borrow");
}

#[test]
fn ana_clears_carry_and_sets_ac_from_or_of_bit3() {
    let mut f = Fixture::new();
    f.cpu.a = 0x0F;
    f.cpu.b = 0xFF;
    f.cpu.status |= 0x01; // pre-set carry, ANA must clear it
    f.load(0, &[0xA0]); // ANA B

    f.step();
    assert_eq!(f.cpu.a, 0x0F);
    assert_eq!(f.cpu.status & 0x01, 0, "CY cleared");
    assert_eq!(f.cpu.status & 0x10, 0x10, "AC set by bit-3 OR quirk");
}

#[test]
fn cmp_leaves_accumulator_unchanged() {
    let mut f = Fixture::new();
    f.cpu.a = 0x05;
    f.cpu.b = 0x05;
    f.load(0, &[0xB8]); // CMP B

    f.step();
    assert_eq!(f.cpu.a, 0x05);
    assert_eq!(f.cpu.status & 0x40, 0x40, "Z set on equality");
}

#[test]
fn inr_does_not_affect_carry() {
    let mut f = Fixture::new();
    f.cpu.b = 0xFF;
    f.cpu.status |= 0x01;
    f.load(0, &[0x04]); // INR B

    let ticks = f.step();
    assert_eq!(ticks, 5);
    assert_eq!(f.cpu.b, 0x00);
    assert_eq!(f.cpu.status & 0x40, 0x40, "Z set");
    assert_eq!(f.cpu.status & 0x01, 0x01, "CY untouched by INR");
}

#[test]
fn dcr_memory_operand_costs_ten_ticks() {
    let mut f = Fixture::new();
    f.cpu.set_hl(0x2000);
    f.bus.write(0x2000, 0x01);
    f.load(0, &[0x35]); // DCR M

    let ticks = f.step();
    assert_eq!(ticks, 10);
    assert_eq!(f.bus.read(0x2000), 0x00);
}

#[test]
fn dad_sets_carry_on_16_bit_overflow() {
    let mut f = Fixture::new();
    f.cpu.set_hl(0xFFFF);
    f.cpu.set_bc(0x0001);
    f.load(0, &[0x09]); // DAD B

    let ticks = f.step();
    assert_eq!(ticks, 10);
    assert_eq!(f.cpu.get_hl(), 0x0000);
    assert_eq!(f.cpu.status & 0x01, 0x01);
}

#[test]
fn daa_adjusts_both_nibbles() {
    let mut f = Fixture::new();
    f.cpu.a = 0x9B;
    f.load(0, &[0x27]); // DAA

    f.step();
    assert_eq!(f.cpu.a, 0x01);
    assert_eq!(f.cpu.status & 0x01, 0x01, "CY set by high-nibble adjust");
    assert_eq!(f.cpu.status & 0x10, 0x10, "AC set by low-nibble adjust");
}

#[test]
fn rlc_rotates_through_carry_not_into_it() {
    let mut f = Fixture::new();
    f.cpu.a = 0x80;
    f.load(0, &[0x07]); // RLC

    f.step();
    assert_eq!(f.cpu.a, 0x01);
    assert_eq!(f.cpu.status & 0x01, 0x01, "bit 7 captured into CY");
}

#[test]
fn ral_shifts_carry_in() {
    let mut f = Fixture::new();
    f.cpu.a = 0x01;
    f.cpu.status |= 0x01;
    f.load(0, &[0x17]); // RAL

    f.step();
    assert_eq!(f.cpu.a, 0x03, "old CY shifted into bit 0");
    assert_eq!(f.cpu.status & 0x01, 0, "old bit 7 (0) becomes new CY");
}

#[test]
fn cma_complements_without_touching_flags() {
    let mut f = Fixture::new();
    f.cpu.a = 0x0F;
    f.cpu.status = 0x46;
    f.load(0, &[0x2F]); // CMA

    f.step();
    assert_eq!(f.cpu.a, 0xF0);
    assert_eq!(f.cpu.status, 0x46, "CMA does not touch flags");
}

#[test]
fn cmc_inverts_carry() {
    let mut f = Fixture::new();
    f.cpu.status &= !0x01;
    f.load(0, &[0x3F]); // CMC

    f.step();
    assert_eq!(f.cpu.status & 0x01, 0x01);
    f.cpu.pc = 0;
    f.load(0, &[0x3F]);
    f.step();
    assert_eq!(f.cpu.status & 0x01, 0);
}
