/*!
ppu_bus: the PPU's own 14-bit address space, as a trait.

The PPU never sees the CPU bus. Pattern, nametable, attribute and palette fetches
plus PPUDATA ($2007) accesses go through this trait, so the renderer can be tested
against a flat mock and the console can back it with cartridge CHR + internal VRAM.

Address Space (mirroring semantics left to implementor):
- 0x0000-0x1FFF : Pattern tables (CHR ROM/RAM via mapper)
- 0x2000-0x2FFF : Nametables (with mirroring rules)
- 0x3000-0x3EFF : Mirrors of 0x2000-0x2EFF
- 0x3F00-0x3F1F : Palette RAM ($3F10/$14/$18/$1C alias $3F00/$04/$08/$0C)
- 0x3F20-0x3FFF : Mirrors of 0x3F00-0x3F1F

Callers may pass any 16-bit value; implementors mask with 0x3FFF.
*/

/// Interface the PPU depends on for memory fetches and PPUDATA.
pub trait PpuBus {
    /// Read a byte from the PPU-visible address space (mirroring and mapper applied).
    fn ppu_read(&self, addr: u16) -> u8;

    /// Write a byte into the PPU-visible address space.
    fn ppu_write(&mut self, addr: u16, value: u8);
}
