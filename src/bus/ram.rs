/*!
RAM module: the 2 KiB CPU work RAM.

CPU address map for internal RAM:
- $0000-$07FF: 2 KiB internal RAM
- $0800-$1FFF: Mirrors of $0000-$07FF (mask with & 0x07FF)
*/

/// Size of CPU internal RAM (in bytes).
pub const CPU_RAM_SIZE: usize = 0x0800;

/// CPU internal RAM; callers pass CPU addresses and mirroring is applied here.
pub struct Ram {
    data: [u8; CPU_RAM_SIZE],
}

impl Default for Ram {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; CPU_RAM_SIZE],
        }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[Self::mirror_index(addr)]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.data[Self::mirror_index(addr)] = value;
    }

    /// Physical RAM index for a CPU address.
    #[inline]
    pub fn mirror_index(addr: u16) -> usize {
        (addr as usize) & (CPU_RAM_SIZE - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::Ram;

    #[test]
    fn mirrored_reads_and_writes() {
        let mut r = Ram::new();
        r.write(0x0001, 0xAA);
        for mirror in [0x0001, 0x0801, 0x1001, 0x1801] {
            assert_eq!(r.read(mirror), 0xAA, "mirror ${mirror:04X}");
        }
        r.write(0x1FFF, 0x55);
        assert_eq!(r.read(0x07FF), 0x55, "$1FFF aliases $07FF");
    }
}
